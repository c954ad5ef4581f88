use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use crate::metadata::{
    access::AccessFlags,
    attributes::{SourceAttribute, SourceAttributeRc},
    signatures::{ClassSignature, MethodSignature},
    typesystem::{GenericParameterRc, TypeRefRc},
};

/// Reference to a `TypeDefinition`
pub type TypeDefinitionRc = Arc<TypeDefinition>;
/// Reference to a `FieldInfo`
pub type FieldInfoRc = Arc<FieldInfo>;
/// Reference to a `MethodInfo`
pub type MethodInfoRc = Arc<MethodInfo>;

/// A decoded field: raw access flags, name, descriptor and attributes.
#[derive(Debug)]
pub struct FieldInfo {
    /// The field's access-flag word
    pub access_flags: AccessFlags,
    /// The field name
    pub name: Arc<str>,
    /// The field descriptor, unparsed
    pub descriptor: Arc<str>,
    /// All attributes attached to the field
    pub attributes: Vec<SourceAttributeRc>,
}

/// A decoded method: raw access flags, name, descriptor, attributes, and - once the class
/// has been accepted - its parsed generic signature.
#[derive(Debug)]
pub struct MethodInfo {
    /// The method's access-flag word
    pub access_flags: AccessFlags,
    /// The method name (`<init>` and `<clinit>` included)
    pub name: Arc<str>,
    /// The method descriptor, unparsed
    pub descriptor: Arc<str>,
    /// All attributes attached to the method
    pub attributes: Vec<SourceAttributeRc>,
    /// The `Code` attribute, if the method has one (shared out of `attributes`)
    pub code: Option<SourceAttributeRc>,
    signature: OnceLock<Arc<MethodSignature>>,
}

impl MethodInfo {
    /// Create a method record, caching its `Code` attribute if present
    ///
    /// ## Arguments
    /// * 'access_flags' - The access-flag word
    /// * 'name' - The method name
    /// * 'descriptor' - The method descriptor
    /// * 'attributes' - The decoded attributes
    #[must_use]
    pub fn new(
        access_flags: AccessFlags,
        name: Arc<str>,
        descriptor: Arc<str>,
        attributes: Vec<SourceAttributeRc>,
    ) -> Self {
        let code = SourceAttribute::find("Code", &attributes).cloned();
        MethodInfo {
            access_flags,
            name,
            descriptor,
            attributes,
            code,
            signature: OnceLock::new(),
        }
    }

    /// The parsed generic signature, if the method carried a `Signature` attribute and the
    /// enclosing class has been accepted
    #[must_use]
    pub fn signature(&self) -> Option<&Arc<MethodSignature>> {
        self.signature.get()
    }

    /// Attach the parsed signature. Returns false if one was already attached.
    ///
    /// ## Arguments
    /// * 'signature' - The parsed method signature
    pub fn bind_signature(&self, signature: Arc<MethodSignature>) -> bool {
        self.signature.set(signature).is_ok()
    }
}

/// A field reference resolved out of the constant pool: declaring type, name, and the parsed
/// field type.
#[derive(Debug)]
pub struct FieldReference {
    /// The type declaring the field
    pub declaring_type: TypeRefRc,
    /// The field name
    pub name: Arc<str>,
    /// The parsed field type
    pub field_type: TypeRefRc,
}

/// A method reference resolved out of the constant pool: declaring type, name, and the parsed
/// descriptor as a signature.
#[derive(Debug)]
pub struct MethodReference {
    /// The type declaring the method
    pub declaring_type: TypeRefRc,
    /// The method name
    pub name: Arc<str>,
    /// The parsed method type (no formal parameters or throws - descriptors carry neither)
    pub signature: Arc<MethodSignature>,
}

/// The decoded view of one class file.
///
/// A definition is created empty and populated exactly once, during
/// [`crate::metadata::reader::ClassReader::accept`]: the scalars go into one-shot cells, the
/// member lists into append-only vectors. A populated definition is immutable in practice and
/// freely shareable across threads; it outlives the reader that produced it.
#[derive(Default)]
pub struct TypeDefinition {
    package_name: OnceLock<Arc<str>>,
    name: OnceLock<Arc<str>>,
    internal_name: OnceLock<Arc<str>>,
    version: OnceLock<(u16, u16)>,
    access_flags: OnceLock<AccessFlags>,
    super_name: OnceLock<Option<Arc<str>>>,
    interface_names: OnceLock<Vec<Arc<str>>>,
    signature: OnceLock<Arc<ClassSignature>>,
    fields: boxcar::Vec<FieldInfoRc>,
    methods: boxcar::Vec<MethodInfoRc>,
    attributes: boxcar::Vec<SourceAttributeRc>,
    populated: AtomicBool,
}

impl TypeDefinition {
    /// Create an empty definition, ready to be passed to `accept`
    #[must_use]
    pub fn new() -> TypeDefinitionRc {
        Arc::new(TypeDefinition::default())
    }

    /// The package name with `.` separators, empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.package_name.get().map_or("", |name| name)
    }

    /// The simple (unqualified) class name
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.get().map_or("", |name| name)
    }

    /// The internal name as stored in the constant pool (`/`-separated)
    #[must_use]
    pub fn internal_name(&self) -> &str {
        self.internal_name.get().map_or("", |name| name)
    }

    /// The dotted fully-qualified name
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.package_name().is_empty() {
            self.name().to_string()
        } else {
            format!("{}.{}", self.package_name(), self.name())
        }
    }

    /// The class-file (major, minor) version pair
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        self.version.get().copied().unwrap_or((0, 0))
    }

    /// The class access-flag word
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
            .get()
            .copied()
            .unwrap_or(AccessFlags::empty())
    }

    /// The superclass internal name, `None` for the root class
    #[must_use]
    pub fn super_name(&self) -> Option<&Arc<str>> {
        self.super_name.get().and_then(Option::as_ref)
    }

    /// The internal names of the directly implemented interfaces
    #[must_use]
    pub fn interface_names(&self) -> &[Arc<str>] {
        self.interface_names.get().map_or(&[], Vec::as_slice)
    }

    /// The parsed class signature, if the class carried a `Signature` attribute
    #[must_use]
    pub fn signature(&self) -> Option<&Arc<ClassSignature>> {
        self.signature.get()
    }

    /// The formal type parameters declared by the class signature
    #[must_use]
    pub fn generic_parameters(&self) -> &[GenericParameterRc] {
        self.signature
            .get()
            .map_or(&[], |signature| signature.type_parameters.as_slice())
    }

    /// The decoded fields, in declaration order
    #[must_use]
    pub fn fields(&self) -> &boxcar::Vec<FieldInfoRc> {
        &self.fields
    }

    /// The decoded methods, in declaration order
    #[must_use]
    pub fn methods(&self) -> &boxcar::Vec<MethodInfoRc> {
        &self.methods
    }

    /// The class-level attributes
    #[must_use]
    pub fn attributes(&self) -> &boxcar::Vec<SourceAttributeRc> {
        &self.attributes
    }

    // Claims the one-shot right to populate this definition. A repeat accept loses the
    // claim and re-uses the already-populated state, which is what makes it idempotent.
    pub(crate) fn begin_populate(&self) -> bool {
        self.populated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set_names(
        &self,
        package_name: Arc<str>,
        name: Arc<str>,
        internal_name: Arc<str>,
    ) {
        let _ = self.package_name.set(package_name);
        let _ = self.name.set(name);
        let _ = self.internal_name.set(internal_name);
    }

    pub(crate) fn set_header(
        &self,
        version: (u16, u16),
        access_flags: AccessFlags,
        super_name: Option<Arc<str>>,
        interface_names: Vec<Arc<str>>,
    ) {
        let _ = self.version.set(version);
        let _ = self.access_flags.set(access_flags);
        let _ = self.super_name.set(super_name);
        let _ = self.interface_names.set(interface_names);
    }

    pub(crate) fn set_signature(&self, signature: Arc<ClassSignature>) {
        let _ = self.signature.set(signature);
    }

    pub(crate) fn push_field(&self, field: FieldInfoRc) {
        self.fields.push(field);
    }

    pub(crate) fn push_method(&self, method: MethodInfoRc) {
        self.methods.push(method);
    }

    pub(crate) fn push_attribute(&self, attribute: SourceAttributeRc) {
        self.attributes.push(attribute);
    }
}

// A populated definition can participate in cyclic graphs (its own methods alias it through
// their signatures), so Debug prints a shallow summary instead of recursing.
impl std::fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("internal_name", &self.internal_name())
            .field("version", &self.version())
            .field("access_flags", &self.access_flags())
            .field("fields", &self.fields.count())
            .field("methods", &self.methods.count())
            .field("attributes", &self.attributes.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_definition_defaults() {
        let definition = TypeDefinition::new();
        assert_eq!(definition.name(), "");
        assert_eq!(definition.package_name(), "");
        assert_eq!(definition.full_name(), "");
        assert_eq!(definition.version(), (0, 0));
        assert!(definition.super_name().is_none());
        assert_eq!(definition.fields().count(), 0);
    }

    #[test]
    fn test_names_set_once() {
        let definition = TypeDefinition::new();
        definition.set_names(
            Arc::from("java.lang"),
            Arc::from("String"),
            Arc::from("java/lang/String"),
        );
        assert_eq!(definition.full_name(), "java.lang.String");
        assert_eq!(definition.internal_name(), "java/lang/String");

        // Re-population is a no-op, which is what makes a second accept idempotent
        definition.set_names(Arc::from("x"), Arc::from("Y"), Arc::from("x/Y"));
        assert_eq!(definition.full_name(), "java.lang.String");
    }

    #[test]
    fn test_method_code_attribute_is_cached() {
        let code: SourceAttributeRc = Arc::new(SourceAttribute::Blob {
            name: Arc::from("Code"),
            data: vec![0x00],
        });
        let method = MethodInfo::new(
            AccessFlags::PUBLIC,
            Arc::from("run"),
            Arc::from("()V"),
            vec![code.clone()],
        );
        assert!(method.code.is_some());
        assert!(Arc::ptr_eq(method.code.as_ref().unwrap(), &code));

        let plain = MethodInfo::new(
            AccessFlags::PUBLIC,
            Arc::from("run"),
            Arc::from("()V"),
            Vec::new(),
        );
        assert!(plain.code.is_none());
    }
}
