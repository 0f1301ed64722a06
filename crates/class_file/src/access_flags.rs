bitflags::bitflags! {
    /// Access and property flags shared by classes, fields and methods (JVMS tables 4.1-B,
    /// 4.5-A and 4.6-A). Several bits are reused with a different meaning depending on the
    /// entity they are attached to.
    ///
    /// Bits above `0xFFFF` never appear in a class file; the parser derives them.
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;

        // Class has a non-trivial finalize() method.
        const FINALIZER = 0x0001_0000;
        const HIDDEN = 0x0002_0000;
        const LAMBDA_FORM_COMPILED = 0x0004_0000;
        const CALLER_SENSITIVE = 0x0008_0000;
        const FORCE_INLINE = 0x0010_0000;
        const DONT_INLINE = 0x0020_0000;
        const SCOPED = 0x0040_0000;
        const STABLE = 0x0080_0000;
        const VALUE_BASED = 0x0100_0000;
    }
}

impl AccessFlags {
    pub const RECOGNIZED_CLASS_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::SUPER.bits()
            | AccessFlags::INTERFACE.bits()
            | AccessFlags::ABSTRACT.bits()
            | AccessFlags::ANNOTATION.bits()
            | AccessFlags::ENUM.bits()
            | AccessFlags::SYNTHETIC.bits(),
    );

    pub const RECOGNIZED_METHOD_MODIFIERS: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits()
            | AccessFlags::PRIVATE.bits()
            | AccessFlags::PROTECTED.bits()
            | AccessFlags::STATIC.bits()
            | AccessFlags::FINAL.bits()
            | AccessFlags::SYNCHRONIZED.bits()
            | AccessFlags::BRIDGE.bits()
            | AccessFlags::VARARGS.bits()
            | AccessFlags::NATIVE.bits()
            | AccessFlags::ABSTRACT.bits()
            | AccessFlags::STRICT.bits()
            | AccessFlags::SYNTHETIC.bits(),
    );

    pub const VISIBILITY: AccessFlags = AccessFlags::from_bits_truncate(
        AccessFlags::PUBLIC.bits() | AccessFlags::PRIVATE.bits() | AccessFlags::PROTECTED.bits(),
    );

    /// Flags as they appear in a class file `access_flags` item.
    pub fn from_u16(raw: u16) -> AccessFlags {
        AccessFlags::from_bits_truncate(raw as u32)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }

    pub fn is_static(&self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_native(&self) -> bool {
        self.contains(AccessFlags::NATIVE)
    }

    pub fn is_final(&self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    /// At most one bit of `mask` is set.
    pub fn at_most_one_of(&self, mask: AccessFlags) -> bool {
        (*self & mask).bits().count_ones() <= 1
    }
}

#[cfg(test)]
mod access_flags_tests {
    use super::*;

    #[test]
    fn it_should_keep_every_class_file_bit() {
        assert_eq!(0xFFFF, AccessFlags::from_u16(0xFFFF).bits());
    }

    #[test]
    fn it_should_count_visibility_bits() {
        assert!(AccessFlags::empty().at_most_one_of(AccessFlags::VISIBILITY));
        assert!(AccessFlags::PRIVATE.at_most_one_of(AccessFlags::VISIBILITY));
        assert!((AccessFlags::PUBLIC | AccessFlags::STATIC).at_most_one_of(AccessFlags::VISIBILITY));
        assert!(!(AccessFlags::PUBLIC | AccessFlags::PROTECTED).at_most_one_of(AccessFlags::VISIBILITY));
    }

    #[test]
    fn it_should_not_recognize_module_as_a_class_modifier() {
        assert!(!AccessFlags::RECOGNIZED_CLASS_MODIFIERS.contains(AccessFlags::MODULE));
    }
}
