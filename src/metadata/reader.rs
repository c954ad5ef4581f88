//! The top-level class-file decoder.
//!
//! [`ClassReader::read`] consumes the header eagerly - magic, versions, constant pool, access
//! flags, this/super/interfaces - and stops. The remainder of the stream (fields, methods,
//! class attributes) is decoded by [`ClassReader::accept`], exactly once, behind a one-shot
//! latch; every further `accept` or [`ClassReader::complete`] re-uses the decoded members and
//! still runs the visitor.
//!
//! During `accept` the reader pushes its resolver frame and inserts the in-progress
//! [`TypeDefinition`] under its own internal name, so descriptors and signatures parsed later
//! in the same class file that mention the enclosing type resolve to that same object - this
//! is how cyclic type graphs are broken.
//!
//! # Example
//!
//! ```rust,no_run
//! use jvmscope::ClassFile;
//!
//! let class = ClassFile::from_file("Foo.class".as_ref())?;
//! let definition = class.definition();
//! println!("{} extends {:?}", definition.full_name(), definition.super_name());
//! for (_, method) in definition.methods().iter() {
//!     println!("  {}{}", method.name, method.descriptor);
//! }
//! # Ok::<(), jvmscope::Error>(())
//! ```

use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, OnceLock,
};

use crate::{
    file::Buffer,
    metadata::{
        access::AccessFlags,
        attributes::{names, SourceAttribute, SourceAttributeRc},
        pool::{ConstantPool, PoolValue, Tag},
        resolver::{MetadataResolver, ResolverFrame, ResolverFrameRc},
        signatures::SignatureParser,
        typesystem::{
            FieldInfo, FieldInfoRc, FieldReference, MethodInfo, MethodInfoRc, MethodReference,
            TypeDefinition, TypeDefinitionRc, TypeRefRc, TypeReference,
        },
    },
    Error, Result,
};

/// The class-file magic number
pub const MAGIC: u32 = 0xCAFE_BABE;

/// The callback `accept` drives - invoked exactly once per `accept` call, after the members
/// are decoded and the self-reference is live in the resolver frame.
pub trait ClassVisitor {
    /// Visit the class header.
    ///
    /// ## Arguments
    /// * 'type_def' - The definition being populated (already named at this point)
    /// * 'major' / 'minor' - The class-file version pair
    /// * 'access_flags' - The class access-flag word
    /// * 'internal_name' - The internal name of this class
    /// * 'signature' - The raw class `Signature` attribute string, if present
    /// * 'super_name' - The superclass internal name, `None` for the root class
    /// * 'interfaces' - The internal names of the direct superinterfaces
    #[allow(clippy::too_many_arguments)]
    fn visit(
        &mut self,
        type_def: &TypeDefinitionRc,
        major: u16,
        minor: u16,
        access_flags: AccessFlags,
        internal_name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[Arc<str>],
    );
}

struct NoOpVisitor;

impl ClassVisitor for NoOpVisitor {
    fn visit(
        &mut self,
        _type_def: &TypeDefinitionRc,
        _major: u16,
        _minor: u16,
        _access_flags: AccessFlags,
        _internal_name: &str,
        _signature: Option<&str>,
        _super_name: Option<&str>,
        _interfaces: &[Arc<str>],
    ) {
    }
}

// The lazily-decoded remainder of the stream.
struct Members {
    fields: Vec<FieldInfoRc>,
    methods: Vec<MethodInfoRc>,
    attributes: Vec<SourceAttributeRc>,
}

// Removes the self-reference from the frame on every exit path out of the visit phase.
struct SelfReference<'a> {
    frame: &'a ResolverFrame,
    internal_name: &'a str,
}

impl Drop for SelfReference<'_> {
    fn drop(&mut self) {
        self.frame.remove_type(self.internal_name);
    }
}

/// The deferred-completion class-file decoder.
///
/// Construction ([`ClassReader::read`]) decodes the header; [`ClassReader::accept`] decodes
/// the members once and drives a visitor every time. A reader is single-threaded per
/// instance by design, but races on `accept` are benign: the one-shot latch and the buffer
/// mutex serialize the member decode, and every caller then observes the same decoded state.
pub struct ClassReader {
    resolver: Arc<MetadataResolver>,
    buffer: Mutex<Buffer>,
    pool: ConstantPool,
    major_version: u16,
    minor_version: u16,
    access_flags: AccessFlags,
    internal_name: Arc<str>,
    package_name: Arc<str>,
    name: Arc<str>,
    super_name: Option<Arc<str>>,
    interface_names: Vec<Arc<str>>,
    frame: ResolverFrameRc,
    completed: AtomicBool,
    members: OnceLock<Members>,
}

impl ClassReader {
    /// Decode the class-file header and return a reader positioned for deferred completion.
    ///
    /// Reads magic, versions, the constant pool, access flags, `this_class`, `super_class`
    /// and the interface table. `this_class` index 0 falls back to the empty internal name;
    /// `super_class` 0 means "no superclass" and is only meaningful for the root class.
    ///
    /// ## Arguments
    /// * 'resolver' - The shared resolver; must be safe for concurrent lookups
    /// * 'buffer' - The class-file bytes, positioned at offset 0
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for empty input, [`Error::InvalidMagic`] when the stream
    /// does not start with `0xCAFEBABE`, and the usual stream/pool errors for a damaged
    /// header.
    pub fn read(resolver: Arc<MetadataResolver>, mut buffer: Buffer) -> Result<ClassReader> {
        if buffer.is_empty() {
            return Err(Error::Empty);
        }

        let magic = buffer.read_u32()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = buffer.read_u16()?;
        let major_version = buffer.read_u16()?;

        let pool = ConstantPool::read(&mut buffer)?;

        let access_flags = AccessFlags::from_u16(buffer.read_u16()?);

        let this_index = buffer.read_u16()?;
        let internal_name: Arc<str> = if this_index == 0 {
            Arc::from("")
        } else {
            pool.class_name(this_index)?
        };

        let super_index = buffer.read_u16()?;
        let super_name = if super_index == 0 {
            None
        } else {
            Some(pool.class_name(super_index)?)
        };

        let interface_count = buffer.read_u16()?;
        let mut interface_names = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interface_names.push(pool.class_name(buffer.read_u16()?)?);
        }

        // Split the internal name at the last '/' into the dotted package and simple name
        let (package_name, name): (Arc<str>, Arc<str>) = match internal_name.rfind('/') {
            Some(delimiter) => (
                Arc::from(internal_name[..delimiter].replace('/', ".")),
                Arc::from(&internal_name[delimiter + 1..]),
            ),
            None => (Arc::from(""), internal_name.clone()),
        };

        Ok(ClassReader {
            resolver,
            buffer: Mutex::new(buffer),
            pool,
            major_version,
            minor_version,
            access_flags,
            internal_name,
            package_name,
            name,
            super_name,
            interface_names,
            frame: ResolverFrame::new(),
            completed: AtomicBool::new(false),
            members: OnceLock::new(),
        })
    }

    /// Decode the members (first call only) and drive the visitor.
    ///
    /// The first caller wins the one-shot latch and reads fields, methods and class
    /// attributes from the stream, then resets the buffer to 0. Every caller - first or
    /// repeat - populates the passed definition from the decoded members, inserts it into
    /// the resolver frame under its internal name, invokes the visitor, parses method
    /// signatures under the class's generic context, and removes the self-reference again.
    /// Frame push/pop balances on every path, errors included.
    ///
    /// ## Arguments
    /// * 'type_def' - The definition to populate
    /// * 'visitor' - The visitor to drive
    ///
    /// # Errors
    /// Returns stream, pool, attribute and signature errors from the member decode;
    /// [`Error::InvalidState`] when the members failed to decode in an earlier call; and
    /// [`Error::LockError`] if the buffer lock was poisoned.
    pub fn accept(&self, type_def: &TypeDefinitionRc, visitor: &mut dyn ClassVisitor) -> Result<()> {
        let _frame = self.resolver.push_scoped(self.frame.clone());

        {
            let mut buffer = self.buffer.lock().map_err(|_| Error::LockError)?;
            if self
                .completed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let members = self.read_members(&mut buffer)?;
                buffer.reset(0)?;
                let _ = self.members.set(members);
            }
        }

        let Some(members) = self.members.get() else {
            // A previous caller won the latch but failed mid-decode
            return Err(Error::InvalidState("class members failed to decode"));
        };

        let first_populate = type_def.begin_populate();
        if first_populate {
            type_def.set_names(
                self.package_name.clone(),
                self.name.clone(),
                self.internal_name.clone(),
            );
            type_def.set_header(
                (self.major_version, self.minor_version),
                self.access_flags,
                self.super_name.clone(),
                self.interface_names.clone(),
            );
            for field in &members.fields {
                type_def.push_field(field.clone());
            }
            for method in &members.methods {
                type_def.push_method(method.clone());
            }
            for attribute in &members.attributes {
                type_def.push_attribute(attribute.clone());
            }
        }

        // Self-reference: from here until the end of the call, this class's own name
        // resolves to the definition being built.
        self.frame
            .add_type(Arc::new(TypeReference::Definition(type_def.clone())));
        let _self_reference = SelfReference {
            frame: &self.frame,
            internal_name: &self.internal_name,
        };

        let signature = match SourceAttribute::find(names::SIGNATURE, &members.attributes) {
            Some(attribute) => match &**attribute {
                SourceAttribute::Signature(signature) => Some(signature.clone()),
                _ => None,
            },
            None => None,
        };

        if first_populate {
            if let Some(signature) = &signature {
                let mut parser = SignatureParser::with_resolver(signature, &self.resolver)
                    .with_scope(self.internal_name.clone());
                type_def.set_signature(Arc::new(parser.parse_class_signature()?));
            }
        }

        visitor.visit(
            type_def,
            self.major_version,
            self.minor_version,
            self.access_flags,
            &self.internal_name,
            signature.as_deref(),
            self.super_name.as_deref(),
            &self.interface_names,
        );

        for method in &members.methods {
            let Some(attribute) = SourceAttribute::find(names::SIGNATURE, &method.attributes)
            else {
                continue;
            };
            let SourceAttribute::Signature(signature) = &**attribute else {
                continue;
            };

            let mut parser = SignatureParser::with_resolver(signature, &self.resolver)
                .with_scope(self.internal_name.clone());
            parser.push_generic_context(type_def.generic_parameters());
            let parsed = parser.parse_method_signature();
            parser.pop_generic_context();

            let _ = method.bind_signature(Arc::new(parsed?));
        }

        Ok(())
    }

    /// Decode the members into a fresh definition with no visitor.
    ///
    /// Convenience over [`ClassReader::accept`]; follows the same once-only member decode,
    /// so calling `complete` after `accept` (or vice versa, any number of times) never
    /// re-reads bytes.
    ///
    /// # Errors
    /// Propagates the errors of [`ClassReader::accept`].
    pub fn complete(&self) -> Result<TypeDefinitionRc> {
        let type_def = TypeDefinition::new();
        self.accept(&type_def, &mut NoOpVisitor)?;
        Ok(type_def)
    }

    fn read_members(&self, buffer: &mut Buffer) -> Result<Members> {
        let field_count = buffer.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let access_flags = AccessFlags::from_u16(buffer.read_u16()?);
            let name = self.pool.lookup_utf8(buffer.read_u16()?)?;
            let descriptor = self.pool.lookup_utf8(buffer.read_u16()?)?;
            let attribute_count = buffer.read_u16()?;
            let attributes = SourceAttribute::read_list(attribute_count, buffer, &self.pool)?;

            fields.push(Arc::new(FieldInfo {
                access_flags,
                name,
                descriptor,
                attributes,
            }));
        }

        let method_count = buffer.read_u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            let access_flags = AccessFlags::from_u16(buffer.read_u16()?);
            let name = self.pool.lookup_utf8(buffer.read_u16()?)?;
            let descriptor = self.pool.lookup_utf8(buffer.read_u16()?)?;
            let attribute_count = buffer.read_u16()?;
            let attributes = SourceAttribute::read_list(attribute_count, buffer, &self.pool)?;

            methods.push(Arc::new(MethodInfo::new(
                access_flags,
                name,
                descriptor,
                attributes,
            )));
        }

        let attribute_count = buffer.read_u16()?;
        let attributes = SourceAttribute::read_list(attribute_count, buffer, &self.pool)?;

        Ok(Members {
            fields,
            methods,
            attributes,
        })
    }

    // ============================================================================
    // Metadata scope: pool lookups in resolved form
    // ============================================================================

    /// Resolve a `Class` pool entry to a type reference.
    ///
    /// Array classes (`[Ljava/lang/String;`) parse as descriptors; plain internal names
    /// resolve through the frame stack, so during `accept` the enclosing class answers with
    /// the in-progress definition.
    ///
    /// ## Arguments
    /// * 'index' - The pool index of the `Class` entry
    ///
    /// # Errors
    /// Returns pool errors for a broken index and descriptor errors for malformed array
    /// class names.
    pub fn lookup_type(&self, index: u16) -> Result<TypeRefRc> {
        let name = self.pool.class_name(index)?;
        self.parse_internal_type(&name)
    }

    /// Resolve a `FieldRef` pool entry to a [`FieldReference`].
    ///
    /// ## Arguments
    /// * 'index' - The pool index of the `FieldRef` entry
    ///
    /// # Errors
    /// Returns pool errors for broken index chains and descriptor errors for a malformed
    /// field descriptor.
    pub fn lookup_field(&self, index: u16) -> Result<FieldReference> {
        let (class_index, name_and_type_index) = match self.pool.get_expect(index, Tag::FieldRef)?
        {
            crate::metadata::pool::PoolEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => unreachable!("get_expect enforces the FieldRef tag"),
        };

        let declaring_type = self.lookup_type(class_index)?;
        let (name, descriptor) = self.pool.name_and_type(name_and_type_index)?;
        let field_type =
            SignatureParser::with_resolver(&descriptor, &self.resolver).parse_field_descriptor()?;

        Ok(FieldReference {
            declaring_type,
            name,
            field_type,
        })
    }

    /// Resolve a `MethodRef` or `InterfaceMethodRef` pool entry to a [`MethodReference`].
    ///
    /// ## Arguments
    /// * 'index' - The pool index of the method reference entry
    ///
    /// # Errors
    /// Returns pool errors for broken index chains and descriptor errors for a malformed
    /// method descriptor.
    pub fn lookup_method(&self, index: u16) -> Result<MethodReference> {
        use crate::metadata::pool::PoolEntry;

        let (class_index, name_and_type_index) = match self.pool.get(index)? {
            PoolEntry::MethodRef {
                class_index,
                name_and_type_index,
            }
            | PoolEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            other => {
                return Err(Error::UnexpectedConstantPoolTag {
                    index,
                    expected: "MethodRef or InterfaceMethodRef",
                    found: other.tag_name(),
                })
            }
        };

        let declaring_type = self.lookup_type(class_index)?;
        let (name, descriptor) = self.pool.name_and_type(name_and_type_index)?;
        let signature = SignatureParser::with_resolver(&descriptor, &self.resolver)
            .parse_method_descriptor()?;

        Ok(MethodReference {
            declaring_type,
            name,
            signature: Arc::new(signature),
        })
    }

    /// Look up the typed constant carried by a pool entry
    ///
    /// ## Arguments
    /// * 'index' - The pool index
    ///
    /// # Errors
    /// Returns pool errors for indices that carry no loadable constant.
    pub fn lookup_constant(&self, index: u16) -> Result<PoolValue> {
        self.pool.lookup_constant(index)
    }

    fn parse_internal_type(&self, name: &str) -> Result<TypeRefRc> {
        if name.starts_with('[') {
            SignatureParser::with_resolver(name, &self.resolver).parse_field_descriptor()
        } else {
            Ok(self.resolver.resolve_type(name))
        }
    }

    /// The class-file major version
    #[must_use]
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// The class-file minor version
    #[must_use]
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// The class access-flag word
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// The internal name of this class (empty for a `this_class` index of 0)
    #[must_use]
    pub fn internal_name(&self) -> &Arc<str> {
        &self.internal_name
    }

    /// The dotted package name, empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &Arc<str> {
        &self.package_name
    }

    /// The simple class name
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The superclass internal name, `None` for the root class
    #[must_use]
    pub fn super_name(&self) -> Option<&Arc<str>> {
        self.super_name.as_ref()
    }

    /// The internal names of the direct superinterfaces
    #[must_use]
    pub fn interface_names(&self) -> &[Arc<str>] {
        &self.interface_names
    }

    /// The decoded constant pool
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// The resolver this reader decodes against
    #[must_use]
    pub fn resolver(&self) -> &Arc<MetadataResolver> {
        &self.resolver
    }
}

impl std::fmt::Debug for ClassReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassReader")
            .field("internal_name", &self.internal_name)
            .field("major_version", &self.major_version)
            .field("minor_version", &self.minor_version)
            .field("completed", &self.completed.load(Ordering::Acquire))
            .finish()
    }
}

/// A decoded class file: the reader plus its populated definition.
///
/// This is the one-call entry point for the common case - decode everything now, keep the
/// reader around for pool lookups.
#[derive(Debug)]
pub struct ClassFile {
    reader: ClassReader,
    definition: TypeDefinitionRc,
}

impl ClassFile {
    /// Decode a class file from bytes with a private resolver
    ///
    /// ## Arguments
    /// * 'bytes' - The class-file bytes
    ///
    /// # Errors
    /// Returns any decode error of [`ClassReader::read`] and [`ClassReader::complete`].
    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile> {
        Self::with_resolver(bytes, Arc::new(MetadataResolver::new()))
    }

    /// Decode a class file from bytes against a shared resolver
    ///
    /// ## Arguments
    /// * 'bytes' - The class-file bytes
    /// * 'resolver' - The resolver to decode against
    ///
    /// # Errors
    /// Returns any decode error of [`ClassReader::read`] and [`ClassReader::complete`].
    pub fn with_resolver(bytes: &[u8], resolver: Arc<MetadataResolver>) -> Result<ClassFile> {
        let reader = ClassReader::read(resolver, Buffer::from_vec(bytes.to_vec()))?;
        let definition = reader.complete()?;
        Ok(ClassFile { reader, definition })
    }

    /// Decode a class file from disk
    ///
    /// ## Arguments
    /// * 'path' - Path to the `.class` file
    ///
    /// # Errors
    /// Returns [`Error::FileError`] for I/O failures and any decode error of
    /// [`ClassFile::from_bytes`].
    pub fn from_file(path: &Path) -> Result<ClassFile> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// The populated definition
    #[must_use]
    pub fn definition(&self) -> &TypeDefinitionRc {
        &self.definition
    }

    /// The underlying reader, for pool lookups and re-acceptance
    #[must_use]
    pub fn reader(&self) -> &ClassReader {
        &self.reader
    }
}
