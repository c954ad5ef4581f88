//! Class-file metadata decoding and type-system representation.
//!
//! This module contains the decoder proper: the constant pool, the descriptor and generic
//! signature grammars, the attribute decoder, the resolver framework and the class reader
//! that orchestrates them. It bridges the gap between raw class-file bytes and a resolved,
//! navigable type-metadata graph.
//!
//! # Key Components
//!
//! - [`pool::ConstantPool`] - The tagged constant table every other structure indexes into
//! - [`signatures`] - Recursive-descent parsing of descriptors and generic signatures
//! - [`attributes::SourceAttribute`] - Typed attribute variants with a lossless blob fallback
//! - [`resolver::MetadataResolver`] - The frame stack answering type and type-variable lookups
//! - [`typesystem`] - [`typesystem::TypeReference`] and [`typesystem::TypeDefinition`], the
//!   output graph
//! - [`reader::ClassReader`] - The top-level, deferred-completion class-file decoder
//!
//! # Decode Pipeline
//!
//! ```text
//! bytes -> Buffer -> ClassReader (header) -> ConstantPool
//!       -> ClassReader (members) -> attributes -> signatures -> type graph
//! ```
//!
//! Header decoding happens eagerly at reader construction; fields, methods and class
//! attributes are decoded lazily by [`reader::ClassReader::accept`], exactly once, behind a
//! one-shot latch.

pub mod access;
pub mod attributes;
pub mod pool;
pub mod reader;
pub mod resolver;
pub mod signatures;
pub mod typesystem;
