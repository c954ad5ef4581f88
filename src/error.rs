use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while decoding a JVM class
/// file: stream-level failures, constant-pool inconsistencies, descriptor and signature grammar
/// violations, and resolver state problems. Each variant provides specific context about the
/// failure mode to enable appropriate error handling.
///
/// Every variant is fatal for the decode that produced it; the library never recovers in-band
/// and never returns partial results.
///
/// # Error Categories
///
/// ## Stream Errors
/// - [`Error::Malformed`] - Corrupted or structurally invalid class-file data
/// - [`Error::OutOfBounds`] - Attempted to read beyond the buffer limit
/// - [`Error::InvalidMagic`] - Input does not begin with `0xCAFEBABE`
/// - [`Error::Empty`] - Empty input provided
///
/// ## Constant Pool Errors
/// - [`Error::InvalidConstantPoolIndex`] - Index 0, out of range, or the dead slot after a
///   `Long`/`Double`
/// - [`Error::UnexpectedConstantPoolTag`] - Entry tag does not match the typed lookup
///
/// ## Descriptor and Signature Errors
/// - [`Error::MalformedSignature`] - Grammar violation, with the byte offset of the failure
/// - [`Error::UnresolvedTypeVariable`] - A `T<name>;` reference with no declaring scope
///
/// ## Attribute Errors
/// - [`Error::MalformedAttribute`] - Typed attribute body inconsistent with its declared layout
///
/// ## Resolver and State Errors
/// - [`Error::InvalidState`] - Frame imbalance or an operation in the wrong lifecycle state
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use jvmscope::{ClassFile, Error};
///
/// match ClassFile::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]) {
///     Ok(class) => println!("decoded {}", class.definition().full_name()),
///     Err(Error::InvalidMagic(magic)) => eprintln!("not a class file: 0x{:08X}", magic),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("malformed input: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("decode failed: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// This error indicates that the byte stream does not conform to the class-file format
    /// beyond what the more specific variants below describe. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when a read would cross the buffer limit, i.e. the stream is
    /// truncated relative to the structure being decoded.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input does not begin with the class-file magic number.
    ///
    /// Class files start with the four bytes `0xCAFEBABE`; anything else is rejected during
    /// reader construction. The associated value is the magic that was actually read.
    #[error("Wrong magic number - 0x{0:08X}")]
    InvalidMagic(u32),

    /// Provided input was empty.
    ///
    /// This error occurs when an empty buffer is provided where actual class-file data was
    /// expected.
    #[error("Provided input was empty")]
    Empty,

    /// A constant-pool index is unusable.
    ///
    /// Index 0 is reserved, indices at or past the pool count are out of range, and the slot
    /// immediately following a `Long` or `Double` entry is dead by specification. The
    /// associated value is the offending index.
    #[error("Invalid constant pool index - {0}")]
    InvalidConstantPoolIndex(u16),

    /// A typed constant-pool lookup found an entry of the wrong kind.
    ///
    /// This error occurs when an index chain is intact but the entry it designates carries a
    /// different tag than the caller required (e.g. a `ConstantValue` attribute pointing at a
    /// `NameAndType` entry).
    #[error("Unexpected constant pool tag at index {index} - expected {expected}, found {found}")]
    UnexpectedConstantPoolTag {
        /// The pool index that was looked up
        index: u16,
        /// The tag the caller required
        expected: &'static str,
        /// The tag actually stored at that index
        found: &'static str,
    },

    /// A descriptor or generic signature violates its grammar.
    ///
    /// Carries the byte offset into the signature string at which parsing failed, so callers
    /// can point at the exact character.
    #[error("Malformed signature at offset {offset}: {message}")]
    MalformedSignature {
        /// Description of the grammar violation
        message: String,
        /// Byte offset into the signature string
        offset: usize,
    },

    /// A signature references a type variable with no declaring scope.
    ///
    /// `T<name>;` references resolve against the innermost enclosing formal-type-parameter
    /// scope, then against the resolver's frame stack. If neither declares the name, the
    /// signature cannot be interpreted.
    #[error("Unresolved type variable - {0}")]
    UnresolvedTypeVariable(String),

    /// A typed attribute body is inconsistent with its declared layout.
    ///
    /// The `u4` attribute length is authoritative; a `SourceFile`, `ConstantValue`,
    /// `LineNumberTable` or `Signature` attribute whose body disagrees with that length is
    /// rejected. Unknown attributes never produce this error - they are preserved as blobs.
    #[error("Malformed attribute '{name}' - {message}")]
    MalformedAttribute {
        /// The attribute name as found in the constant pool
        name: String,
        /// Description of the structural mismatch
        message: String,
    },

    /// An operation was attempted in the wrong lifecycle state.
    ///
    /// This error occurs on resolver frame imbalance (a pop with no matching push) and
    /// similar misuse of the decode lifecycle.
    #[error("Invalid state - {0}")]
    InvalidState(&'static str),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when a lock was
    /// poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur when loading class-file bytes from disk,
    /// such as permission issues or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
