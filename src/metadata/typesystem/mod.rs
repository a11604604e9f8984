//! Language-level type descriptions.
//!
//! Signature blobs describe types with element codes and table tokens. Once those tokens are
//! resolved, a type is a [`TypeDescriptor`]: a closed tree of primitives, named types, generic
//! instantiations, arrays, pointers, by-reference wrappers and open generic parameters. The
//! descriptor is all the C# renderer needs, so anything able to produce one (the metadata
//! loader, a test fixture, another introspection backend) can feed the generator.

mod flags;
mod primitives;

pub use flags::{ParamAttributes, TypeAttributes};
pub use primitives::Primitive;

/// The full name of a type as recorded in metadata.
///
/// Generic definitions keep their arity suffix (`` List`1 ``). Nested types point at the type
/// that declares them; only the outermost type carries a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Namespace, empty for the global namespace and for nested types
    pub namespace: String,
    /// Metadata name including any arity suffix
    pub name: String,
    /// The enclosing type of a nested type
    pub declaring: Option<Box<TypeName>>,
}

impl TypeName {
    /// A top-level type.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            namespace: namespace.into(),
            name: name.into(),
            declaring: None,
        }
    }

    /// A type nested inside `declaring`.
    #[must_use]
    pub fn nested(declaring: TypeName, name: impl Into<String>) -> Self {
        TypeName {
            namespace: String::new(),
            name: name.into(),
            declaring: Some(Box::new(declaring)),
        }
    }

    /// The name without its arity suffix.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('`') {
            Some(tick) if self.name[tick + 1..].bytes().all(|b| b.is_ascii_digit()) => {
                &self.name[..tick]
            }
            _ => &self.name,
        }
    }

    /// Number of generic parameters this segment declares, from its arity suffix.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self.name.rfind('`') {
            Some(tick) => self.name[tick + 1..].parse().unwrap_or(0),
            None => 0,
        }
    }

    /// The namespace of the outermost declaring type.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        match &self.declaring {
            Some(declaring) => declaring.root_namespace(),
            None => &self.namespace,
        }
    }

    /// The chain of segments from the outermost type down to this one.
    #[must_use]
    pub fn segments(&self) -> Vec<&TypeName> {
        let mut segments = vec![self];
        let mut current = self;
        while let Some(declaring) = &current.declaring {
            segments.push(declaring);
            current = declaring;
        }
        segments.reverse();
        segments
    }

    /// The primitive this name denotes, if it is a top-level `System` type with a keyword.
    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        if self.declaring.is_some() || self.namespace != "System" {
            return None;
        }
        Primitive::from_system_name(&self.name)
    }
}

/// How a by-reference parameter is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// `ref`
    Ref,
    /// `out`
    Out,
    /// `in`
    In,
}

impl RefKind {
    /// The C# modifier keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::Ref => "ref",
            RefKind::Out => "out",
            RefKind::In => "in",
        }
    }

    /// Picks the modifier from the `[In]`/`[Out]` flags of a by-reference parameter.
    #[must_use]
    pub fn from_param_flags(flags: ParamAttributes) -> Self {
        if flags.contains(ParamAttributes::OUT) {
            RefKind::Out
        } else if flags.contains(ParamAttributes::IN) {
            RefKind::In
        } else {
            RefKind::Ref
        }
    }
}

/// A fully resolved type, as used in a member signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A built-in type
    Primitive(Primitive),
    /// A non-generic named type, or an open generic definition
    Named(TypeName),
    /// A closed or partially closed generic instantiation
    Generic {
        /// The generic definition
        definition: TypeName,
        /// Arguments for every generic parameter, outermost declaring type first
        arguments: Vec<TypeDescriptor>,
    },
    /// An array of `rank` dimensions
    Array {
        /// The element type
        element: Box<TypeDescriptor>,
        /// Number of dimensions, `1` for a vector
        rank: u32,
    },
    /// An unmanaged pointer
    Pointer(Box<TypeDescriptor>),
    /// A by-reference parameter or return
    ByRef(Box<TypeDescriptor>, RefKind),
    /// An open generic parameter, by its declared name
    TypeParameter(String),
}

impl TypeDescriptor {
    /// `void`
    #[must_use]
    pub fn void() -> Self {
        TypeDescriptor::Primitive(Primitive::Void)
    }

    /// A named type, collapsed to a primitive when it is one.
    #[must_use]
    pub fn named(name: TypeName) -> Self {
        match name.as_primitive() {
            Some(primitive) => TypeDescriptor::Primitive(primitive),
            None => TypeDescriptor::Named(name),
        }
    }

    /// A one-dimensional array of `element`.
    #[must_use]
    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            rank: 1,
        }
    }
}
