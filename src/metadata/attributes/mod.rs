//! Attribute decoding - typed variants for the attributes the decoder understands, lossless
//! blobs for everything else.
//!
//! Attributes arrive on the wire as `{u2 name_index, u4 length, length bytes}`. The decoder
//! dispatches on the resolved name: `SourceFile`, `ConstantValue`, `LineNumberTable` and
//! `Signature` decode into typed variants, while `Code` and every unrecognized name are
//! preserved byte-for-byte as [`SourceAttribute::Blob`]. The declared length is authoritative
//! in both directions - a typed body that is shorter or longer than its layout is
//! [`crate::Error::MalformedAttribute`], and a blob copies exactly `length` bytes.
//!
//! # Example
//!
//! ```rust
//! use jvmscope::{Buffer, metadata::{attributes::SourceAttribute, pool::ConstantPool}};
//!
//! // Pool: [1] Utf8 "SourceFile", [2] Utf8 "Foo.java"
//! let mut pool_bytes = vec![0x00, 0x03];
//! pool_bytes.extend_from_slice(&[0x01, 0x00, 0x0A]);
//! pool_bytes.extend_from_slice(b"SourceFile");
//! pool_bytes.extend_from_slice(&[0x01, 0x00, 0x08]);
//! pool_bytes.extend_from_slice(b"Foo.java");
//! let pool = ConstantPool::read(&mut Buffer::from_vec(pool_bytes))?;
//!
//! // Attribute: name #1, length 2, body -> Utf8 #2
//! let mut buffer = Buffer::from_vec(vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02]);
//! let attribute = SourceAttribute::read(&mut buffer, &pool)?;
//! assert!(matches!(attribute, SourceAttribute::SourceFile(name) if &*name == "Foo.java"));
//! # Ok::<(), jvmscope::Error>(())
//! ```

/// The attribute names the class-file format predefines.
///
/// Only a handful decode structurally (see [`SourceAttribute`]); the rest are listed so
/// callers can probe blob attributes by well-known name.
pub mod names {
    /// The source file the class was compiled from
    pub const SOURCE_FILE: &str = "SourceFile";
    /// The compile-time constant of a `static final` field
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    /// Bytecode offset to source line mapping inside a `Code` attribute
    pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
    /// The generic signature of a class, field or method
    pub const SIGNATURE: &str = "Signature";
    /// Method bytecode and its exception table
    pub const CODE: &str = "Code";
    /// The checked exceptions a method declares
    pub const EXCEPTIONS: &str = "Exceptions";
    /// Nested-class relationships
    pub const INNER_CLASSES: &str = "InnerClasses";
    /// The immediately enclosing method of a local or anonymous class
    pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
    /// Marks a member absent from the source code
    pub const SYNTHETIC: &str = "Synthetic";
    /// Marks a member as deprecated
    pub const DEPRECATED: &str = "Deprecated";
    /// Bootstrap method table for `invokedynamic`
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
    /// Local variable name table inside a `Code` attribute
    pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
}

use std::sync::Arc;

use crate::{
    file::Buffer,
    metadata::pool::{ConstantPool, PoolValue},
    Error, Result,
};

/// Reference to a `SourceAttribute`
pub type SourceAttributeRc = Arc<SourceAttribute>;

/// One entry of a `LineNumberTable` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberEntry {
    /// Bytecode offset the entry starts at
    pub start_pc: u16,
    /// The source line number
    pub line_number: u16,
}

/// A decoded attribute.
///
/// Unknown attribute names MUST survive the decode losslessly; they become
/// [`SourceAttribute::Blob`] carrying the name and the exact `length` body bytes. `Code` is
/// deliberately kept opaque as well - bytecode decoding is a separate concern layered on top
/// of this crate, and the blob keeps the raw material available for it.
#[derive(Debug, PartialEq)]
pub enum SourceAttribute {
    /// `SourceFile` - the compilation unit name
    SourceFile(Arc<str>),
    /// `ConstantValue` - the constant of a `static final` field
    ConstantValue(PoolValue),
    /// `LineNumberTable` - bytecode offset to source line mapping
    LineNumberTable(Vec<LineNumberEntry>),
    /// `Signature` - the raw generic signature string
    Signature(Arc<str>),
    /// Any attribute the decoder does not interpret, preserved byte-for-byte
    Blob {
        /// The attribute name as found in the constant pool
        name: Arc<str>,
        /// Exactly `length` body bytes
        data: Vec<u8>,
    },
}

impl SourceAttribute {
    /// The attribute name this variant was decoded from
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SourceAttribute::SourceFile(_) => names::SOURCE_FILE,
            SourceAttribute::ConstantValue(_) => names::CONSTANT_VALUE,
            SourceAttribute::LineNumberTable(_) => names::LINE_NUMBER_TABLE,
            SourceAttribute::Signature(_) => names::SIGNATURE,
            SourceAttribute::Blob { name, .. } => name,
        }
    }

    /// Find an attribute by name in a decoded attribute list
    ///
    /// ## Arguments
    /// * 'name' - The attribute name to look for
    /// * 'attributes' - The list to search
    #[must_use]
    pub fn find<'a>(
        name: &str,
        attributes: &'a [SourceAttributeRc],
    ) -> Option<&'a SourceAttributeRc> {
        attributes.iter().find(|attribute| attribute.name() == name)
    }

    /// Decode one attribute from the stream.
    ///
    /// Consumes `{u2 name_index, u4 length, length bytes}`. The body is sliced off up front,
    /// so the outer cursor lands exactly past the attribute no matter which variant decodes -
    /// the declared length is authoritative.
    ///
    /// ## Arguments
    /// * 'buffer' - The class-file stream, positioned at the name index
    /// * 'pool' - The constant pool, for the name and any body indices
    ///
    /// # Errors
    /// Returns [`Error::MalformedAttribute`] if a typed body disagrees with its declared
    /// length, constant-pool errors for broken indices, and [`Error::OutOfBounds`] if the
    /// declared length overruns the stream itself.
    pub fn read(buffer: &mut Buffer, pool: &ConstantPool) -> Result<SourceAttribute> {
        let name = pool.lookup_utf8(buffer.read_u16()?)?;
        let length = buffer.read_u32()? as usize;
        let mut body = buffer.slice(length)?;

        let attribute = match &*name {
            names::SOURCE_FILE => {
                let index = Self::typed(&name, body.read_u16())?;
                SourceAttribute::SourceFile(pool.lookup_utf8(index)?)
            }
            names::CONSTANT_VALUE => {
                let index = Self::typed(&name, body.read_u16())?;
                SourceAttribute::ConstantValue(pool.lookup_constant(index)?)
            }
            names::LINE_NUMBER_TABLE => {
                let count = Self::typed(&name, body.read_u16())?;
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    entries.push(LineNumberEntry {
                        start_pc: Self::typed(&name, body.read_u16())?,
                        line_number: Self::typed(&name, body.read_u16())?,
                    });
                }
                SourceAttribute::LineNumberTable(entries)
            }
            names::SIGNATURE => {
                let index = Self::typed(&name, body.read_u16())?;
                SourceAttribute::Signature(pool.lookup_utf8(index)?)
            }
            _ => {
                // Code and every unknown name: preserve the body verbatim
                let mut data = vec![0u8; length];
                body.read(&mut data)?;
                return Ok(SourceAttribute::Blob { name, data });
            }
        };

        if body.has_more_data() {
            return Err(Error::MalformedAttribute {
                name: name.to_string(),
                message: format!(
                    "{} trailing bytes beyond the declared layout",
                    body.limit() - body.pos()
                ),
            });
        }

        Ok(attribute)
    }

    /// Decode `count` attributes back to back
    ///
    /// ## Arguments
    /// * 'count' - The attribute count as read from the enclosing structure
    /// * 'buffer' - The class-file stream
    /// * 'pool' - The constant pool
    ///
    /// # Errors
    /// Propagates the errors of [`SourceAttribute::read`].
    pub fn read_list(
        count: u16,
        buffer: &mut Buffer,
        pool: &ConstantPool,
    ) -> Result<Vec<SourceAttributeRc>> {
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(Arc::new(SourceAttribute::read(buffer, pool)?));
        }
        Ok(attributes)
    }

    // A typed body running out of bytes is a layout mismatch, not a truncated stream: the
    // enclosing slice is bounded by the declared length.
    fn typed<T>(name: &str, result: Result<T>) -> Result<T> {
        result.map_err(|error| match error {
            Error::OutOfBounds => Error::MalformedAttribute {
                name: name.to_string(),
                message: "body shorter than the declared layout".to_string(),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool() -> ConstantPool {
        // [1] "SourceFile" [2] "Foo.java" [3] "ConstantValue" [4] Integer 42
        // [5] "LineNumberTable" [6] "Signature" [7] "()V" [8] "Synthetic"
        let mut bytes = vec![0x00, 0x09];
        for value in ["SourceFile", "Foo.java", "ConstantValue"] {
            bytes.push(0x01);
            bytes.extend_from_slice(&u16::try_from(value.len()).unwrap().to_be_bytes());
            bytes.extend_from_slice(value.as_bytes());
        }
        bytes.extend_from_slice(&[0x03, 0x00, 0x00, 0x00, 0x2A]);
        for value in ["LineNumberTable", "Signature", "()V", "Synthetic"] {
            bytes.push(0x01);
            bytes.extend_from_slice(&u16::try_from(value.len()).unwrap().to_be_bytes());
            bytes.extend_from_slice(value.as_bytes());
        }
        ConstantPool::read(&mut Buffer::from_vec(bytes)).unwrap()
    }

    fn attribute_bytes(name_index: u16, body: &[u8]) -> Buffer {
        let mut bytes = name_index.to_be_bytes().to_vec();
        bytes.extend_from_slice(&u32::try_from(body.len()).unwrap().to_be_bytes());
        bytes.extend_from_slice(body);
        Buffer::from_vec(bytes)
    }

    #[test]
    fn test_source_file() {
        let pool = test_pool();
        let mut buffer = attribute_bytes(1, &[0x00, 0x02]);
        let attribute = SourceAttribute::read(&mut buffer, &pool).unwrap();
        assert_eq!(attribute, SourceAttribute::SourceFile(Arc::from("Foo.java")));
        assert_eq!(attribute.name(), "SourceFile");
    }

    #[test]
    fn test_constant_value() {
        let pool = test_pool();
        let mut buffer = attribute_bytes(3, &[0x00, 0x04]);
        let attribute = SourceAttribute::read(&mut buffer, &pool).unwrap();
        assert_eq!(attribute, SourceAttribute::ConstantValue(PoolValue::Integer(42)));
    }

    #[test]
    fn test_line_number_table() {
        let pool = test_pool();
        let mut buffer = attribute_bytes(5, &[0x00, 0x02, 0x00, 0x00, 0x00, 0x07, 0x00, 0x05, 0x00, 0x08]);
        let attribute = SourceAttribute::read(&mut buffer, &pool).unwrap();
        assert_eq!(
            attribute,
            SourceAttribute::LineNumberTable(vec![
                LineNumberEntry { start_pc: 0, line_number: 7 },
                LineNumberEntry { start_pc: 5, line_number: 8 },
            ])
        );
    }

    #[test]
    fn test_signature_attribute() {
        let pool = test_pool();
        let mut buffer = attribute_bytes(6, &[0x00, 0x07]);
        let attribute = SourceAttribute::read(&mut buffer, &pool).unwrap();
        assert_eq!(attribute, SourceAttribute::Signature(Arc::from("()V")));
    }

    #[test]
    fn test_unknown_attribute_preserved_as_blob() {
        let pool = test_pool();
        let body = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut buffer = attribute_bytes(8, &body);
        let attribute = SourceAttribute::read(&mut buffer, &pool).unwrap();
        assert_eq!(
            attribute,
            SourceAttribute::Blob {
                name: Arc::from("Synthetic"),
                data: body.to_vec(),
            }
        );
        assert!(!buffer.has_more_data());
    }

    #[test]
    fn test_typed_body_too_short() {
        let pool = test_pool();
        // SourceFile declares length 1, but its layout needs a u2
        let mut buffer = attribute_bytes(1, &[0x00]);
        assert!(matches!(
            SourceAttribute::read(&mut buffer, &pool),
            Err(Error::MalformedAttribute { name, .. }) if name == "SourceFile"
        ));
    }

    #[test]
    fn test_typed_body_too_long() {
        let pool = test_pool();
        // SourceFile with a trailing byte beyond its layout
        let mut buffer = attribute_bytes(1, &[0x00, 0x02, 0xFF]);
        assert!(matches!(
            SourceAttribute::read(&mut buffer, &pool),
            Err(Error::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn test_length_is_authoritative_for_cursor() {
        let pool = test_pool();
        // Two attributes back to back; the first is a blob whose length must be honored
        // exactly for the second to decode.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&8u16.to_be_bytes());
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x02]);

        let mut buffer = Buffer::from_vec(bytes);
        let attributes = SourceAttribute::read_list(2, &mut buffer, &pool).unwrap();
        assert_eq!(attributes[0].name(), "Synthetic");
        assert_eq!(attributes[1].name(), "SourceFile");
        assert!(!buffer.has_more_data());

        let found = SourceAttribute::find("SourceFile", &attributes).unwrap();
        assert!(Arc::ptr_eq(found, &attributes[1]));
        assert!(SourceAttribute::find("Code", &attributes).is_none());
    }

    #[test]
    fn test_declared_length_overruns_stream() {
        let pool = test_pool();
        let mut bytes = 8u16.to_be_bytes().to_vec();
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&[0x01, 0x02]);
        let mut buffer = Buffer::from_vec(bytes);
        assert!(matches!(
            SourceAttribute::read(&mut buffer, &pool),
            Err(Error::OutOfBounds)
        ));
    }
}
