// Copyright 2025-2026 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # jvmscope
//!
//! A framework for decoding JVM class files into a resolved, navigable type-metadata graph.
//! Built in pure Rust, `jvmscope` parses the constant pool, field and method structures,
//! descriptors, generic signatures and attributes without requiring a JDK or a running
//! virtual machine.
//!
//! # Architecture
//!
//! The library is organized into layers that mirror the three-phase shape of the format
//! itself - a tagged constant table, a descriptor/signature grammar, and a lazy resolver
//! that tolerates forward references:
//!
//! - **File Layer**: cursored big-endian byte access ([`Buffer`])
//! - **Constant Pool**: the tagged table every other structure indexes into
//! - **Signatures**: recursive-descent parsing of the descriptor and generic grammars
//! - **Attributes**: typed variants plus lossless blob preservation
//! - **Resolver**: a frame stack answering type and type-variable lookups during a decode
//! - **Class Reader**: the deferred-completion orchestrator producing a
//!   [`metadata::typesystem::TypeDefinition`]
//!
//! ## Key Components
//!
//! - [`crate::ClassFile`] - One-call entry point for decoding a class file
//! - [`crate::ClassReader`] - Header-now, members-later decoding with a visitor
//! - [`crate::metadata`] - Constant pool, signatures, attributes, resolver, type system
//! - [`crate::prelude`] - Convenient re-exports of commonly used types
//! - [`crate::Error`] and [`crate::Result`] - Comprehensive error handling
//!
//! # Features
//!
//! - **Complete header and member decoding** - constant pool (all 14 tags), fields, methods,
//!   attributes
//! - **Both type grammars** - erased descriptors and generic signatures, with byte-exact
//!   round-trip printing
//! - **Forward-reference tolerance** - decode classes in any order; unresolved names stay
//!   navigable references
//! - **Cycle-safe type graphs** - a class whose signature mentions itself resolves to the
//!   definition being built, not a recursive load
//! - **Memory safe** - no `unsafe`, comprehensive error handling, no panics on malformed
//!   input
//!
//! # Usage Examples
//!
//! ## Quick Start
//!
//! Add `jvmscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! jvmscope = "0.1.0"
//! ```
//!
//! ### Decoding a Class File
//!
//! ```rust,no_run
//! use jvmscope::prelude::*;
//!
//! let class = ClassFile::from_file("Example.class".as_ref())?;
//! let definition = class.definition();
//!
//! println!("class {} (v{}.{})", definition.full_name(),
//!     definition.version().0, definition.version().1);
//! for (_, field) in definition.fields().iter() {
//!     println!("  field {} : {}", field.name, field.descriptor);
//! }
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! ### Driving a Visitor
//!
//! ```rust,no_run
//! use jvmscope::prelude::*;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ClassVisitor for Printer {
//!     fn visit(&mut self, _type_def: &TypeDefinitionRc, major: u16, _minor: u16,
//!         _access: AccessFlags, internal_name: &str, _signature: Option<&str>,
//!         super_name: Option<&str>, _interfaces: &[Arc<str>]) {
//!         println!("{internal_name} (major {major}) extends {super_name:?}");
//!     }
//! }
//!
//! let resolver = Arc::new(MetadataResolver::new());
//! let bytes = std::fs::read("Example.class")?;
//! let reader = ClassReader::read(resolver, Buffer::from_vec(bytes))?;
//!
//! let definition = TypeDefinition::new();
//! reader.accept(&definition, &mut Printer)?;
//! # Ok::<(), jvmscope::Error>(())
//! ```
//!
//! ### Parsing Signatures Directly
//!
//! ```rust
//! use jvmscope::metadata::signatures::parse_method_signature;
//!
//! let signature = parse_method_signature("<T:Ljava/lang/Object;>(TT;)TT;")?;
//! assert_eq!(signature.type_parameters.len(), 1);
//! assert_eq!(signature.to_string(), "<T:Ljava/lang/Object;>(TT;)TT;");
//! # Ok::<(), jvmscope::Error>(())
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

pub mod metadata;
pub mod prelude;

/// The generic Error type, covering every failure this library can return.
///
/// # Usage Examples
///
/// ```rust
/// use jvmscope::{ClassFile, Error};
///
/// match ClassFile::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]) {
///     Ok(_) => println!("decoded"),
///     Err(Error::InvalidMagic(magic)) => println!("bad magic 0x{magic:08X}"),
///     Err(e) => println!("error: {e}"),
/// }
/// ```
pub use error::Error;

/// The main entry point for decoding class files.
///
/// See [`crate::metadata::reader::ClassFile`] for decoding from bytes or disk.
///
/// # Usage Examples
///
/// ```rust,no_run
/// use jvmscope::ClassFile;
/// let class = ClassFile::from_file("Example.class".as_ref())?;
/// println!("decoded {}", class.definition().full_name());
/// # Ok::<(), jvmscope::Error>(())
/// ```
pub use metadata::reader::{ClassFile, ClassReader, ClassVisitor};

/// Provides access to low-level byte parsing utilities.
///
/// The [`crate::Buffer`] type is used for decoding class-file structures and attribute
/// blobs.
///
/// # Usage Examples
///
/// ```rust
/// use jvmscope::Buffer;
/// let mut buffer = Buffer::from_vec(vec![0xCA, 0xFE, 0xBA, 0xBE]);
/// assert_eq!(buffer.read_u32()?, 0xCAFE_BABE);
/// # Ok::<(), jvmscope::Error>(())
/// ```
pub use file::Buffer;

/// `Result<T, Error>` alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
