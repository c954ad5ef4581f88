//! Access-flag bitmasks for classes, fields and methods.

use bitflags::bitflags;

bitflags! {
    /// The `u2` access-flag bitmask attached to classes, fields and methods.
    ///
    /// The class-file format reuses bit values across the three contexts (`0x0020` is
    /// `ACC_SUPER` on a class but `ACC_SYNCHRONIZED` on a method, `0x0080` is `ACC_TRANSIENT`
    /// on a field but `ACC_VARARGS` on a method), so the aliases below overlap by design.
    /// Unknown bits are retained verbatim - the decoder reports flags exactly as stored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Class: treat superclass methods specially on `invokespecial`
        const SUPER = 0x0020;
        /// Method: declared `synchronized`
        const SYNCHRONIZED = 0x0020;
        /// Field: declared `volatile`
        const VOLATILE = 0x0040;
        /// Method: a compiler-generated bridge
        const BRIDGE = 0x0040;
        /// Field: declared `transient`
        const TRANSIENT = 0x0080;
        /// Method: declared with a variable arity
        const VARARGS = 0x0080;
        /// Method: declared `native`
        const NATIVE = 0x0100;
        /// Class: an interface
        const INTERFACE = 0x0200;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Method: `strictfp` floating-point mode
        const STRICT = 0x0800;
        /// Not present in the source code
        const SYNTHETIC = 0x1000;
        /// Class: an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an `enum` (class or enum constant field)
        const ENUM = 0x4000;
        /// Class: a module declaration
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Wrap a raw `u2` from the stream, keeping unknown bits
    ///
    /// ## Arguments
    /// * 'value' - The flag word as stored in the class file
    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        AccessFlags::from_bits_retain(value)
    }
}
