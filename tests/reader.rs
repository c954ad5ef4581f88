//! End-to-end decoding tests driving [`jvmscope::ClassReader`] over hand-assembled class
//! files: header rejection, deferred completion, self-references, idempotence and resolver
//! balance.

use std::sync::{Arc, Mutex};

use jvmscope::prelude::*;

/// Minimal constant-pool assembler for crafting test class files.
struct MiniPool {
    bytes: Vec<u8>,
    next: u16,
}

impl MiniPool {
    fn new() -> Self {
        MiniPool {
            bytes: Vec::new(),
            next: 1,
        }
    }

    fn utf8(&mut self, value: &str) -> u16 {
        self.bytes.push(0x01);
        self.bytes
            .extend_from_slice(&u16::try_from(value.len()).unwrap().to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        self.bump(1)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.bytes.push(0x07);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bump(1)
    }

    fn integer(&mut self, value: i32) -> u16 {
        self.bytes.push(0x03);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.bump(1)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.bytes.push(0x0C);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.extend_from_slice(&descriptor_index.to_be_bytes());
        self.bump(1)
    }

    fn field_ref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        self.bytes.push(0x09);
        self.bytes.extend_from_slice(&class_index.to_be_bytes());
        self.bytes
            .extend_from_slice(&name_and_type_index.to_be_bytes());
        self.bump(1)
    }

    fn method_ref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        self.bytes.push(0x0A);
        self.bytes.extend_from_slice(&class_index.to_be_bytes());
        self.bytes
            .extend_from_slice(&name_and_type_index.to_be_bytes());
        self.bump(1)
    }

    fn bump(&mut self, slots: u16) -> u16 {
        let index = self.next;
        self.next += slots;
        index
    }
}

struct RawAttribute {
    name_index: u16,
    body: Vec<u8>,
}

struct RawMember {
    access: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<RawAttribute>,
}

/// Assembles a complete class file from a [`MiniPool`] and raw member records.
struct ClassAssembler {
    pool: MiniPool,
    access: u16,
    this_index: u16,
    super_index: u16,
    interfaces: Vec<u16>,
    fields: Vec<RawMember>,
    methods: Vec<RawMember>,
    attributes: Vec<RawAttribute>,
}

impl ClassAssembler {
    fn new(pool: MiniPool, access: u16, this_index: u16, super_index: u16) -> Self {
        ClassAssembler {
            pool,
            access,
            this_index,
            super_index,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn build(self) -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
        bytes.extend_from_slice(&self.pool.next.to_be_bytes());
        bytes.extend_from_slice(&self.pool.bytes);
        bytes.extend_from_slice(&self.access.to_be_bytes());
        bytes.extend_from_slice(&self.this_index.to_be_bytes());
        bytes.extend_from_slice(&self.super_index.to_be_bytes());

        bytes.extend_from_slice(&u16::try_from(self.interfaces.len()).unwrap().to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }

        for members in [&self.fields, &self.methods] {
            bytes.extend_from_slice(&u16::try_from(members.len()).unwrap().to_be_bytes());
            for member in members {
                bytes.extend_from_slice(&member.access.to_be_bytes());
                bytes.extend_from_slice(&member.name_index.to_be_bytes());
                bytes.extend_from_slice(&member.descriptor_index.to_be_bytes());
                Self::write_attributes(&mut bytes, &member.attributes);
            }
        }

        Self::write_attributes(&mut bytes, &self.attributes);
        bytes
    }

    fn write_attributes(bytes: &mut Vec<u8>, attributes: &[RawAttribute]) {
        bytes.extend_from_slice(&u16::try_from(attributes.len()).unwrap().to_be_bytes());
        for attribute in attributes {
            bytes.extend_from_slice(&attribute.name_index.to_be_bytes());
            bytes.extend_from_slice(&u32::try_from(attribute.body.len()).unwrap().to_be_bytes());
            bytes.extend_from_slice(&attribute.body);
        }
    }
}

/// Records every `visit` invocation for assertions.
#[derive(Default)]
struct RecordingVisitor {
    visits: Vec<(u16, u16, u16, String, Option<String>, Option<String>, usize)>,
}

impl ClassVisitor for RecordingVisitor {
    fn visit(
        &mut self,
        _type_def: &TypeDefinitionRc,
        major: u16,
        minor: u16,
        access_flags: AccessFlags,
        internal_name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[Arc<str>],
    ) {
        self.visits.push((
            major,
            minor,
            access_flags.bits(),
            internal_name.to_string(),
            signature.map(str::to_string),
            super_name.map(str::to_string),
            interfaces.len(),
        ));
    }
}

fn decode(bytes: &[u8]) -> (Arc<MetadataResolver>, ClassReader) {
    let resolver = Arc::new(MetadataResolver::new());
    let reader = ClassReader::read(resolver.clone(), Buffer::from_vec(bytes.to_vec())).unwrap();
    (resolver, reader)
}

#[test]
fn magic_rejection() {
    let resolver = Arc::new(MetadataResolver::new());
    let bytes = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x34];
    let err = ClassReader::read(resolver, Buffer::from_vec(bytes)).unwrap_err();
    assert!(matches!(err, Error::InvalidMagic(0xDEAD_BEEF)));
}

#[test]
fn empty_input_rejected() {
    let resolver = Arc::new(MetadataResolver::new());
    let err = ClassReader::read(resolver, Buffer::from_vec(Vec::new())).unwrap_err();
    assert!(matches!(err, Error::Empty));
}

#[test]
fn minimal_empty_class() {
    // The smallest well-formed stream: empty pool, index-0 this/super, no members
    let bytes = vec![
        0xCA, 0xFE, 0xBA, 0xBE, // magic
        0x00, 0x00, 0x00, 0x34, // minor 0, major 52
        0x00, 0x01, // empty constant pool
        0x00, 0x21, // public | super
        0x00, 0x00, // this_class: index-0 fallback
        0x00, 0x00, // super_class: none
        0x00, 0x00, // interfaces
        0x00, 0x00, // fields
        0x00, 0x00, // methods
        0x00, 0x00, // attributes
    ];
    let (_, reader) = decode(&bytes);

    let definition = TypeDefinition::new();
    let mut visitor = RecordingVisitor::default();
    reader.accept(&definition, &mut visitor).unwrap();

    assert_eq!(definition.name(), "");
    assert_eq!(definition.package_name(), "");
    assert_eq!(definition.version(), (0x34, 0));
    assert!(definition.super_name().is_none());
    assert_eq!(definition.fields().count(), 0);
    assert_eq!(definition.methods().count(), 0);

    assert_eq!(visitor.visits.len(), 1);
    let (major, minor, access, internal_name, signature, super_name, interfaces) =
        visitor.visits[0].clone();
    assert_eq!((major, minor), (0x34, 0));
    assert_eq!(access, 0x0021);
    assert_eq!(internal_name, "");
    assert!(signature.is_none());
    assert!(super_name.is_none());
    assert_eq!(interfaces, 0);
}

fn simple_class_bytes() -> Vec<u8> {
    let mut pool = MiniPool::new();
    let this_index = pool.class("com/example/Foo");
    let super_index = pool.class("java/lang/Object");
    let runnable_index = pool.class("java/lang/Runnable");
    let field_name = pool.utf8("count");
    let field_descriptor = pool.utf8("I");
    let constant_value_name = pool.utf8("ConstantValue");
    let forty_two = pool.integer(42);
    let method_name = pool.utf8("run");
    let method_descriptor = pool.utf8("()V");
    let code_name = pool.utf8("Code");
    let source_file_name = pool.utf8("SourceFile");
    let source_file_value = pool.utf8("Foo.java");

    let mut assembler = ClassAssembler::new(pool, 0x0021, this_index, super_index);
    assembler.interfaces.push(runnable_index);
    assembler.fields.push(RawMember {
        access: 0x001A, // private static final
        name_index: field_name,
        descriptor_index: field_descriptor,
        attributes: vec![RawAttribute {
            name_index: constant_value_name,
            body: forty_two.to_be_bytes().to_vec(),
        }],
    });
    assembler.methods.push(RawMember {
        access: 0x0001,
        name_index: method_name,
        descriptor_index: method_descriptor,
        attributes: vec![RawAttribute {
            name_index: code_name,
            body: vec![0xB1, 0x00, 0x00], // opaque to the decoder
        }],
    });
    assembler.attributes.push(RawAttribute {
        name_index: source_file_name,
        body: source_file_value.to_be_bytes().to_vec(),
    });
    assembler.build()
}

#[test]
fn decode_simple_class() {
    let (_, reader) = decode(&simple_class_bytes());
    assert_eq!(&**reader.internal_name(), "com/example/Foo");
    assert_eq!(&**reader.package_name(), "com.example");
    assert_eq!(&**reader.name(), "Foo");

    let definition = reader.complete().unwrap();
    assert_eq!(definition.full_name(), "com.example.Foo");
    assert_eq!(definition.super_name().map(|name| &**name), Some("java/lang/Object"));
    assert_eq!(definition.interface_names().len(), 1);
    assert_eq!(&*definition.interface_names()[0], "java/lang/Runnable");

    assert_eq!(definition.fields().count(), 1);
    let field = &definition.fields()[0];
    assert_eq!(&*field.name, "count");
    assert_eq!(&*field.descriptor, "I");
    assert_eq!(
        **SourceAttribute::find("ConstantValue", &field.attributes).unwrap(),
        SourceAttribute::ConstantValue(PoolValue::Integer(42))
    );

    assert_eq!(definition.methods().count(), 1);
    let method = &definition.methods()[0];
    assert_eq!(&*method.name, "run");
    assert_eq!(&*method.descriptor, "()V");
    // The Code attribute is cached on the method record and preserved as an opaque blob
    let code = method.code.as_ref().unwrap();
    assert!(matches!(
        &**code,
        SourceAttribute::Blob { name, data } if &**name == "Code" && data == &[0xB1, 0x00, 0x00]
    ));

    assert_eq!(definition.attributes().count(), 1);
    assert_eq!(
        *definition.attributes()[0],
        SourceAttribute::SourceFile(Arc::from("Foo.java"))
    );
}

#[test]
fn unknown_attribute_round_trips_losslessly() {
    let mut pool = MiniPool::new();
    let this_index = pool.class("Blobby");
    let super_index = pool.class("java/lang/Object");
    let synthetic_name = pool.utf8("Synthetic");

    let mut assembler = ClassAssembler::new(pool, 0x0020, this_index, super_index);
    assembler.attributes.push(RawAttribute {
        name_index: synthetic_name,
        body: vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07],
    });

    let (_, reader) = decode(&assembler.build());
    let definition = reader.complete().unwrap();

    assert_eq!(definition.attributes().count(), 1);
    assert!(matches!(
        &*definition.attributes()[0],
        SourceAttribute::Blob { name, data }
            if &**name == "Synthetic" && data == &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]
    ));
}

fn self_referential_class_bytes() -> Vec<u8> {
    let mut pool = MiniPool::new();
    let this_index = pool.class("Foo");
    let super_index = pool.class("java/lang/Object");
    let method_name = pool.utf8("self");
    let method_descriptor = pool.utf8("(LFoo;)LFoo;");
    let signature_name = pool.utf8("Signature");
    let signature_value = pool.utf8("(LFoo;)LFoo;");

    let mut assembler = ClassAssembler::new(pool, 0x0021, this_index, super_index);
    assembler.methods.push(RawMember {
        access: 0x0001,
        name_index: method_name,
        descriptor_index: method_descriptor,
        attributes: vec![RawAttribute {
            name_index: signature_name,
            body: signature_value.to_be_bytes().to_vec(),
        }],
    });
    assembler.build()
}

/// During `visit`, the resolver must answer the class's own name with the very definition
/// being accepted.
struct SelfLookupVisitor {
    resolver: Arc<MetadataResolver>,
    observed_identity: bool,
}

impl ClassVisitor for SelfLookupVisitor {
    fn visit(
        &mut self,
        type_def: &TypeDefinitionRc,
        _major: u16,
        _minor: u16,
        _access_flags: AccessFlags,
        internal_name: &str,
        _signature: Option<&str>,
        _super_name: Option<&str>,
        _interfaces: &[Arc<str>],
    ) {
        if let Some(found) = self.resolver.find_type(internal_name) {
            if let TypeReference::Definition(definition) = &*found {
                self.observed_identity = Arc::ptr_eq(definition, type_def);
            }
        }
    }
}

#[test]
fn self_reference_resolves_to_in_progress_definition() {
    let (resolver, reader) = decode(&self_referential_class_bytes());

    let definition = TypeDefinition::new();
    let mut visitor = SelfLookupVisitor {
        resolver: resolver.clone(),
        observed_identity: false,
    };
    reader.accept(&definition, &mut visitor).unwrap();
    assert!(visitor.observed_identity);

    // The parsed method signature aliases the same definition object
    let method = &definition.methods()[0];
    let signature = method.signature().unwrap();
    assert!(matches!(
        &*signature.parameters[0],
        TypeReference::Definition(parameter) if Arc::ptr_eq(parameter, &definition)
    ));
    assert!(matches!(
        &*signature.return_type,
        TypeReference::Definition(return_type) if Arc::ptr_eq(return_type, &definition)
    ));

    // Outside the accept call the frame is popped again
    assert!(resolver.find_type("Foo").is_none());
}

#[test]
fn accept_is_idempotent_and_always_visits() {
    let (resolver, reader) = decode(&simple_class_bytes());

    let definition = TypeDefinition::new();
    let mut visitor = RecordingVisitor::default();
    reader.accept(&definition, &mut visitor).unwrap();
    reader.accept(&definition, &mut visitor).unwrap();

    // The visitor ran each time, the members were decoded once
    assert_eq!(visitor.visits.len(), 2);
    assert_eq!(visitor.visits[0], visitor.visits[1]);
    assert_eq!(definition.fields().count(), 1);
    assert_eq!(definition.methods().count(), 1);
    assert_eq!(definition.attributes().count(), 1);
    assert_eq!(resolver.frame_depth(), 0);

    // complete() after accept re-uses the decoded members for a fresh definition
    let second = reader.complete().unwrap();
    assert_eq!(second.fields().count(), 1);
    assert_eq!(second.full_name(), "com.example.Foo");
    assert!(!Arc::ptr_eq(&second, &definition));
}

#[test]
fn frame_stack_balances_on_decode_errors() {
    // A field whose name index points nowhere: member decode fails after the frame push
    let mut pool = MiniPool::new();
    let this_index = pool.class("Broken");
    let super_index = pool.class("java/lang/Object");

    let mut assembler = ClassAssembler::new(pool, 0x0021, this_index, super_index);
    assembler.fields.push(RawMember {
        access: 0x0001,
        name_index: 0x0063,
        descriptor_index: 0x0064,
        attributes: Vec::new(),
    });

    let (resolver, reader) = decode(&assembler.build());
    let definition = TypeDefinition::new();
    let err = reader
        .accept(&definition, &mut RecordingVisitor::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConstantPoolIndex(0x0063)));
    assert_eq!(resolver.frame_depth(), 0);

    // The latch is spent; later callers see the failed decode as invalid state
    assert!(matches!(
        reader.complete(),
        Err(Error::InvalidState(_))
    ));
    assert_eq!(resolver.frame_depth(), 0);
}

#[test]
fn concurrent_accepts_share_one_member_decode() {
    let (resolver, reader) = decode(&simple_class_bytes());
    let reader = Arc::new(reader);

    let visits = Arc::new(Mutex::new(0usize));
    let mut handles = Vec::new();
    for _ in 0..4 {
        let reader = reader.clone();
        let visits = visits.clone();
        handles.push(std::thread::spawn(move || {
            struct Counting(Arc<Mutex<usize>>);
            impl ClassVisitor for Counting {
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
                    *self.0.lock().unwrap() += 1;
                }
            }

            let definition = TypeDefinition::new();
            reader
                .accept(&definition, &mut Counting(visits))
                .unwrap();
            assert_eq!(definition.fields().count(), 1);
            definition
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(*visits.lock().unwrap(), 4);
    assert_eq!(resolver.frame_depth(), 0);
}

#[test]
fn class_signature_binds_formal_parameters() {
    let mut pool = MiniPool::new();
    let this_index = pool.class("Box");
    let super_index = pool.class("java/lang/Object");
    let signature_name = pool.utf8("Signature");
    let class_signature = pool.utf8("<T:Ljava/lang/Object;>Ljava/lang/Object;");
    let method_name = pool.utf8("get");
    let method_descriptor = pool.utf8("()Ljava/lang/Object;");
    let method_signature = pool.utf8("()TT;");

    let mut assembler = ClassAssembler::new(pool, 0x0021, this_index, super_index);
    assembler.attributes.push(RawAttribute {
        name_index: signature_name,
        body: class_signature.to_be_bytes().to_vec(),
    });
    assembler.methods.push(RawMember {
        access: 0x0001,
        name_index: method_name,
        descriptor_index: method_descriptor,
        attributes: vec![RawAttribute {
            name_index: signature_name,
            body: method_signature.to_be_bytes().to_vec(),
        }],
    });

    let (_, reader) = decode(&assembler.build());
    let definition = reader.complete().unwrap();

    // The class's formal parameter...
    assert_eq!(definition.generic_parameters().len(), 1);
    let class_parameter = &definition.generic_parameters()[0];
    assert_eq!(&**class_parameter.name(), "T");

    // ...scopes over the method signature parsed under the class's generic context
    let method = &definition.methods()[0];
    let signature = method.signature().unwrap();
    assert!(matches!(
        &*signature.return_type,
        TypeReference::GenericParameter(parameter) if Arc::ptr_eq(parameter, class_parameter)
    ));
}

#[test]
fn pool_member_lookups_resolve_through_the_reader() {
    let mut pool = MiniPool::new();
    let this_index = pool.class("Caller");
    let super_index = pool.class("java/lang/Object");
    let other_index = pool.class("com/example/Other");
    let field_nat = pool.name_and_type("limit", "J");
    let field_ref = pool.field_ref(other_index, field_nat);
    let method_nat = pool.name_and_type("compute", "(I)Ljava/lang/String;");
    let method_ref = pool.method_ref(other_index, method_nat);

    let assembler = ClassAssembler::new(pool, 0x0021, this_index, super_index);
    let (_, reader) = decode(&assembler.build());

    let field = reader.lookup_field(field_ref).unwrap();
    assert_eq!(field.declaring_type.class_name(), Some("com/example/Other"));
    assert_eq!(&*field.name, "limit");
    assert_eq!(field.field_type.to_string(), "J");

    let method = reader.lookup_method(method_ref).unwrap();
    assert_eq!(&*method.name, "compute");
    assert_eq!(method.signature.parameters.len(), 1);
    assert_eq!(method.signature.return_type.to_string(), "Ljava/lang/String;");

    let class = reader.lookup_type(other_index).unwrap();
    assert_eq!(class.class_name(), Some("com/example/Other"));

    assert!(matches!(
        reader.lookup_field(method_ref),
        Err(Error::UnexpectedConstantPoolTag { .. })
    ));
}

#[test]
fn from_file_round_trips_through_disk() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("Foo.class");
    std::fs::write(&path, simple_class_bytes()).unwrap();

    let class = ClassFile::from_file(&path).unwrap();
    assert_eq!(class.definition().full_name(), "com.example.Foo");
    assert_eq!(class.reader().major_version(), 0x34);
}
