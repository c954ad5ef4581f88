//! Descriptor and generic-signature parsing.
//!
//! Two grammars share one recursive-descent parser. The **descriptor** grammar is the erased
//! type language the runtime itself consumes: `B C D F I J S Z` primitives, `V` as a method
//! return, `L<internal-name>;` class references and `[` arrays. The **signature** grammar is
//! its generic-aware superset carried in `Signature` attributes: formal type parameters,
//! parameterized types with wildcards (`*`, `+`, `-`), type variables (`T<name>;`) and
//! `^`-declared throws.
//!
//! # Scoping
//!
//! Type variables resolve against the innermost enclosing formal-parameter scope. The parser
//! maintains a generic context stack ([`SignatureParser::push_generic_context`] /
//! [`SignatureParser::pop_generic_context`]); the class reader pushes the enclosing class's
//! parameters around each method-signature parse, and lookups that miss every scope fall back
//! to the resolver's frames before failing with
//! [`crate::Error::UnresolvedTypeVariable`].
//!
//! # Round-Trips
//!
//! Parsing and printing are inverse: the `Display` of every parsed type, method signature and
//! class signature is byte-identical to the accepted input.
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::metadata::signatures::parse_method_descriptor;
//!
//! let signature = parse_method_descriptor("(ILjava/lang/String;[I)V")?;
//! assert_eq!(signature.parameters.len(), 3);
//! assert_eq!(signature.return_type.to_string(), "V");
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! ```rust
//! use jvmscope::metadata::signatures::parse_type_signature;
//!
//! let parsed = parse_type_signature("Ljava/util/Map<Ljava/lang/String;+Ljava/lang/Number;>;")?;
//! assert_eq!(
//!     parsed.to_string(),
//!     "Ljava/util/Map<Ljava/lang/String;+Ljava/lang/Number;>;"
//! );
//! # Ok::<(), jvmscope::Error>(())
//! ```

mod parser;
mod types;

pub use parser::SignatureParser;
pub use types::{ClassSignature, MethodSignature};

use crate::{metadata::typesystem::TypeRefRc, Result};

/// Parse a field descriptor from a string
///
/// ## Arguments
/// * 'descriptor' - The descriptor string
///
/// # Errors
/// Returns an error if the descriptor violates the grammar
pub fn parse_field_descriptor(descriptor: &str) -> Result<TypeRefRc> {
    let mut parser = SignatureParser::new(descriptor);
    parser.parse_field_descriptor()
}

/// Parse a method descriptor from a string
///
/// ## Arguments
/// * 'descriptor' - The descriptor string
///
/// # Errors
/// Returns an error if the descriptor violates the grammar
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(descriptor);
    parser.parse_method_descriptor()
}

/// Parse a single generic type signature from a string
///
/// ## Arguments
/// * 'signature' - The signature string
///
/// # Errors
/// Returns an error if the signature violates the grammar or references an unknown type
/// variable
pub fn parse_type_signature(signature: &str) -> Result<TypeRefRc> {
    let mut parser = SignatureParser::new(signature);
    parser.parse_type_signature()
}

/// Parse a class signature from a string
///
/// ## Arguments
/// * 'signature' - The signature string
///
/// # Errors
/// Returns an error if the signature violates the grammar or references an unknown type
/// variable
pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    let mut parser = SignatureParser::new(signature);
    parser.parse_class_signature()
}

/// Parse a method signature from a string
///
/// ## Arguments
/// * 'signature' - The signature string
///
/// # Errors
/// Returns an error if the signature violates the grammar or references an unknown type
/// variable
pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(signature);
    parser.parse_method_signature()
}
