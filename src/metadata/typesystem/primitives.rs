use strum::{EnumIter, IntoEnumIterator};

/// The built-in types that have a dedicated C# spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Primitive {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `sbyte`
    SByte,
    /// `byte`
    Byte,
    /// `short`
    Int16,
    /// `ushort`
    UInt16,
    /// `int`
    Int32,
    /// `uint`
    UInt32,
    /// `long`
    Int64,
    /// `ulong`
    UInt64,
    /// `float`
    Single,
    /// `double`
    Double,
    /// `decimal`
    Decimal,
    /// `string`
    String,
    /// `object`
    Object,
    /// `System.IntPtr`
    IntPtr,
    /// `System.UIntPtr`
    UIntPtr,
    /// `System.TypedReference`
    TypedReference,
}

impl Primitive {
    /// The name of the type inside the `System` namespace.
    #[must_use]
    pub fn system_name(self) -> &'static str {
        match self {
            Primitive::Void => "Void",
            Primitive::Boolean => "Boolean",
            Primitive::Char => "Char",
            Primitive::SByte => "SByte",
            Primitive::Byte => "Byte",
            Primitive::Int16 => "Int16",
            Primitive::UInt16 => "UInt16",
            Primitive::Int32 => "Int32",
            Primitive::UInt32 => "UInt32",
            Primitive::Int64 => "Int64",
            Primitive::UInt64 => "UInt64",
            Primitive::Single => "Single",
            Primitive::Double => "Double",
            Primitive::Decimal => "Decimal",
            Primitive::String => "String",
            Primitive::Object => "Object",
            Primitive::IntPtr => "IntPtr",
            Primitive::UIntPtr => "UIntPtr",
            Primitive::TypedReference => "TypedReference",
        }
    }

    /// The text used in generated source.
    ///
    /// Native integers and typed references have no keyword and keep their type name.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Boolean => "bool",
            Primitive::Char => "char",
            Primitive::SByte => "sbyte",
            Primitive::Byte => "byte",
            Primitive::Int16 => "short",
            Primitive::UInt16 => "ushort",
            Primitive::Int32 => "int",
            Primitive::UInt32 => "uint",
            Primitive::Int64 => "long",
            Primitive::UInt64 => "ulong",
            Primitive::Single => "float",
            Primitive::Double => "double",
            Primitive::Decimal => "decimal",
            Primitive::String => "string",
            Primitive::Object => "object",
            Primitive::IntPtr | Primitive::UIntPtr | Primitive::TypedReference => {
                self.system_name()
            }
        }
    }

    /// `true` if [`keyword`](Self::keyword) is a language keyword that needs no `using`.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        !matches!(
            self,
            Primitive::IntPtr | Primitive::UIntPtr | Primitive::TypedReference
        )
    }

    /// Maps `System.<name>` to its primitive, if it is one.
    #[must_use]
    pub fn from_system_name(name: &str) -> Option<Primitive> {
        Primitive::iter().find(|primitive| primitive.system_name() == name)
    }
}
