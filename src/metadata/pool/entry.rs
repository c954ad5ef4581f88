use std::sync::Arc;

use strum::{EnumCount, EnumIter};

/// The constant-pool entry tags, as stored in the `u1` that leads every pool entry.
///
/// The numeric values are fixed by the class-file format. Tags 2, 13, 14 and 17 are not
/// assigned; an unassigned tag in the stream is malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
#[repr(u8)]
pub enum Tag {
    /// A modified-UTF-8 string
    Utf8 = 1,
    /// A 32-bit integer constant
    Integer = 3,
    /// A 32-bit IEEE-754 constant
    Float = 4,
    /// A 64-bit integer constant, occupying two pool slots
    Long = 5,
    /// A 64-bit IEEE-754 constant, occupying two pool slots
    Double = 6,
    /// A class or interface, pointing at its internal name
    Class = 7,
    /// A `java.lang.String` literal, pointing at its Utf8 payload
    String = 8,
    /// A field reference (class + name-and-type)
    FieldRef = 9,
    /// A method reference (class + name-and-type)
    MethodRef = 10,
    /// An interface-method reference (class + name-and-type)
    InterfaceMethodRef = 11,
    /// A name/descriptor pair
    NameAndType = 12,
    /// A method handle (reference kind + referenced member)
    MethodHandle = 15,
    /// A method type, pointing at a descriptor string
    MethodType = 16,
    /// An `invokedynamic` call site (bootstrap index + name-and-type)
    InvokeDynamic = 18,
}

impl Tag {
    /// Map a raw tag byte to its enum value, `None` for unassigned tags
    ///
    /// ## Arguments
    /// * 'value' - The tag byte read from the stream
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Tag> {
        match value {
            1 => Some(Tag::Utf8),
            3 => Some(Tag::Integer),
            4 => Some(Tag::Float),
            5 => Some(Tag::Long),
            6 => Some(Tag::Double),
            7 => Some(Tag::Class),
            8 => Some(Tag::String),
            9 => Some(Tag::FieldRef),
            10 => Some(Tag::MethodRef),
            11 => Some(Tag::InterfaceMethodRef),
            12 => Some(Tag::NameAndType),
            15 => Some(Tag::MethodHandle),
            16 => Some(Tag::MethodType),
            18 => Some(Tag::InvokeDynamic),
            _ => None,
        }
    }

    /// The tag name used in error messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tag::Utf8 => "Utf8",
            Tag::Integer => "Integer",
            Tag::Float => "Float",
            Tag::Long => "Long",
            Tag::Double => "Double",
            Tag::Class => "Class",
            Tag::String => "String",
            Tag::FieldRef => "FieldRef",
            Tag::MethodRef => "MethodRef",
            Tag::InterfaceMethodRef => "InterfaceMethodRef",
            Tag::NameAndType => "NameAndType",
            Tag::MethodHandle => "MethodHandle",
            Tag::MethodType => "MethodType",
            Tag::InvokeDynamic => "InvokeDynamic",
        }
    }
}

/// The nine method-handle reference kinds of the class-file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReferenceKind {
    /// `getfield C.f:T`
    GetField = 1,
    /// `getstatic C.f:T`
    GetStatic = 2,
    /// `putfield C.f:T`
    PutField = 3,
    /// `putstatic C.f:T`
    PutStatic = 4,
    /// `invokevirtual C.m:(A*)T`
    InvokeVirtual = 5,
    /// `invokestatic C.m:(A*)T`
    InvokeStatic = 6,
    /// `invokespecial C.m:(A*)T`
    InvokeSpecial = 7,
    /// `new C; dup; invokespecial C.<init>:(A*)V`
    NewInvokeSpecial = 8,
    /// `invokeinterface C.m:(A*)T`
    InvokeInterface = 9,
}

impl ReferenceKind {
    /// Map a raw kind byte to its enum value, `None` for out-of-range kinds
    ///
    /// ## Arguments
    /// * 'value' - The kind byte read from the stream
    #[must_use]
    pub fn from_u8(value: u8) -> Option<ReferenceKind> {
        match value {
            1 => Some(ReferenceKind::GetField),
            2 => Some(ReferenceKind::GetStatic),
            3 => Some(ReferenceKind::PutField),
            4 => Some(ReferenceKind::PutStatic),
            5 => Some(ReferenceKind::InvokeVirtual),
            6 => Some(ReferenceKind::InvokeStatic),
            7 => Some(ReferenceKind::InvokeSpecial),
            8 => Some(ReferenceKind::NewInvokeSpecial),
            9 => Some(ReferenceKind::InvokeInterface),
            _ => None,
        }
    }
}

/// A single decoded constant-pool entry.
///
/// Entries that reference other entries (e.g. [`PoolEntry::Class`]) store the raw `u2` index
/// and resolve it on demand through [`crate::metadata::pool::ConstantPool`] - never eagerly -
/// so forward references within the pool table are tolerated.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// A decoded modified-UTF-8 string
    Utf8(Arc<str>),
    /// A 32-bit integer constant
    Integer(i32),
    /// A 32-bit float constant
    Float(f32),
    /// A 64-bit integer constant
    Long(i64),
    /// A 64-bit float constant
    Double(f64),
    /// A class reference by name index
    Class {
        /// Index of the Utf8 entry holding the internal name
        name_index: u16,
    },
    /// A string literal by payload index
    String {
        /// Index of the Utf8 entry holding the value
        string_index: u16,
    },
    /// A field reference
    FieldRef {
        /// Index of the declaring Class entry
        class_index: u16,
        /// Index of the NameAndType entry
        name_and_type_index: u16,
    },
    /// A method reference
    MethodRef {
        /// Index of the declaring Class entry
        class_index: u16,
        /// Index of the NameAndType entry
        name_and_type_index: u16,
    },
    /// An interface-method reference
    InterfaceMethodRef {
        /// Index of the declaring Class entry
        class_index: u16,
        /// Index of the NameAndType entry
        name_and_type_index: u16,
    },
    /// A name/descriptor pair
    NameAndType {
        /// Index of the Utf8 entry holding the member name
        name_index: u16,
        /// Index of the Utf8 entry holding the descriptor
        descriptor_index: u16,
    },
    /// A method handle
    MethodHandle {
        /// What kind of member access the handle performs
        kind: ReferenceKind,
        /// Index of the referenced FieldRef/MethodRef/InterfaceMethodRef entry
        reference_index: u16,
    },
    /// A method type
    MethodType {
        /// Index of the Utf8 entry holding the method descriptor
        descriptor_index: u16,
    },
    /// An `invokedynamic` call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_index: u16,
        /// Index of the NameAndType entry
        name_and_type_index: u16,
    },
    /// The dead slot that follows every `Long` and `Double` entry
    Unusable,
}

impl PoolEntry {
    /// The tag this entry was decoded from, `None` for the unusable slot
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        match self {
            PoolEntry::Utf8(_) => Some(Tag::Utf8),
            PoolEntry::Integer(_) => Some(Tag::Integer),
            PoolEntry::Float(_) => Some(Tag::Float),
            PoolEntry::Long(_) => Some(Tag::Long),
            PoolEntry::Double(_) => Some(Tag::Double),
            PoolEntry::Class { .. } => Some(Tag::Class),
            PoolEntry::String { .. } => Some(Tag::String),
            PoolEntry::FieldRef { .. } => Some(Tag::FieldRef),
            PoolEntry::MethodRef { .. } => Some(Tag::MethodRef),
            PoolEntry::InterfaceMethodRef { .. } => Some(Tag::InterfaceMethodRef),
            PoolEntry::NameAndType { .. } => Some(Tag::NameAndType),
            PoolEntry::MethodHandle { .. } => Some(Tag::MethodHandle),
            PoolEntry::MethodType { .. } => Some(Tag::MethodType),
            PoolEntry::InvokeDynamic { .. } => Some(Tag::InvokeDynamic),
            PoolEntry::Unusable => None,
        }
    }

    /// The tag name used in error messages ("Unusable" for the dead slot)
    #[must_use]
    pub fn tag_name(&self) -> &'static str {
        self.tag().map_or("Unusable", Tag::name)
    }

    /// How many pool slots this entry occupies (2 for `Long`/`Double`, otherwise 1)
    #[must_use]
    pub fn slot_count(&self) -> u16 {
        match self {
            PoolEntry::Long(_) | PoolEntry::Double(_) => 2,
            _ => 1,
        }
    }
}
