//! The decoded type graph: type references, type variables and class definitions.
//!
//! This module is the output side of the decoder. The parsers in
//! [`crate::metadata::signatures`] produce [`TypeReference`] nodes; the class reader produces
//! a [`TypeDefinition`] per class file. Everything is `Arc`-shared, so the cyclic graphs the
//! JVM type system routinely builds (a class whose own signature mentions it, mutually
//! recursive bounds) are represented by aliasing - no interning table, no deep copies.
//!
//! # Key Components
//!
//! - [`TypeReference`] - The polymorphic type descriptor (primitives, classes, arrays,
//!   parameterized types, wildcards, type variables, captures, definitions)
//! - [`GenericParameter`] - A scoped type variable with two-phase bound binding
//! - [`TypeDefinition`] - The populated, shareable view of one decoded class file
//! - [`FieldReference`] / [`MethodReference`] - Pool member references in resolved form
//!
//! # Identity vs. Equality
//!
//! Equality is structural (internal names plus type arguments). Object identity
//! (`Arc::ptr_eq`) is meaningful on top of it: the self-reference contract guarantees that
//! during a class's own decode, every reference to its name is the *same* definition object.

mod definition;
mod reference;

pub use definition::{
    FieldInfo, FieldInfoRc, FieldReference, MethodInfo, MethodInfoRc, MethodReference,
    TypeDefinition, TypeDefinitionRc,
};
pub use reference::{
    CapturedType, ClassType, GenericBounds, GenericParameter, GenericParameterRc,
    ParameterizedType, PrimitiveKind, TypeRefRc, TypeReference, WildcardBound,
};
