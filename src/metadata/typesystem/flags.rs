use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// `TypeAttributes` (ECMA-335 §II.23.1.15), restricted to the bits the scanner inspects
    pub struct TypeAttributes: u32 {
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
    }
}

impl TypeAttributes {
    /// A C# `static class` compiles to `abstract sealed`.
    #[must_use]
    pub fn is_static_class(self) -> bool {
        self.contains(TypeAttributes::ABSTRACT | TypeAttributes::SEALED)
            && !self.contains(TypeAttributes::INTERFACE)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// `ParamAttributes` (ECMA-335 §II.23.1.13), the direction bits of a by-ref parameter
    pub struct ParamAttributes: u16 {
        /// Param is \[In\]
        const IN = 0x0001;
        /// Param is \[out\]
        const OUT = 0x0002;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_class() {
        // public abstract sealed beforefieldinit
        assert!(TypeAttributes::from_bits_truncate(0x0010_0181).is_static_class());
        assert!(!TypeAttributes::from_bits_truncate(0x0010_0001).is_static_class());
        assert!(!TypeAttributes::from_bits_truncate(0x0000_0081).is_static_class());
        assert!(!TypeAttributes::from_bits_truncate(0x0000_01A1).is_static_class());
    }
}
