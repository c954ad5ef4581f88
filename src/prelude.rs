//! # jvmscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the jvmscope library. Import this module to get quick access to the essential
//! types for class-file decoding.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jvmscope operations
pub use crate::Error;

/// The result type used throughout jvmscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// One-call class-file decoding
pub use crate::ClassFile;

/// Deferred-completion class-file decoding with a visitor
pub use crate::{ClassReader, ClassVisitor};

/// Low-level byte parsing
pub use crate::Buffer;

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Access-flag bitmasks for classes, fields and methods
pub use crate::metadata::access::AccessFlags;

/// The constant pool and its entries
pub use crate::metadata::pool::{ConstantPool, PoolEntry, PoolValue, ReferenceKind, Tag};

/// Typed attributes and the blob fallback
pub use crate::metadata::attributes::{LineNumberEntry, SourceAttribute, SourceAttributeRc};

// ================================================================================================
// Type System
// ================================================================================================

/// Core type system components
pub use crate::metadata::typesystem::{
    ClassType, FieldInfo, FieldInfoRc, FieldReference, GenericBounds, GenericParameter,
    GenericParameterRc, MethodInfo, MethodInfoRc, MethodReference, ParameterizedType,
    PrimitiveKind, TypeDefinition, TypeDefinitionRc, TypeRefRc, TypeReference, WildcardBound,
};

// ================================================================================================
// Signatures and Resolution
// ================================================================================================

/// Descriptor and signature parsing
pub use crate::metadata::signatures::{
    parse_class_signature, parse_field_descriptor, parse_method_descriptor,
    parse_method_signature, parse_type_signature, ClassSignature, MethodSignature,
    SignatureParser,
};

/// The resolver framework
pub use crate::metadata::resolver::{
    FrameGuard, MetadataResolver, ResolverFrame, ResolverFrameRc, TypeLoader,
};
