//! Alias discovery and stub generation.
//!
//! The pipeline runs leaves first: the [`scanner`] walks every [`Module`] for static
//! containers and their alias-marked methods, the [`render`] functions turn each
//! [`TypeDescriptor`] into C# text, and the [`emitter`] assembles the final file around the
//! rendered members.

pub mod emitter;
pub mod render;
pub mod scanner;

use crate::{
    metadata::typesystem::{TypeAttributes, TypeDescriptor},
    Result,
};

/// A loaded binary the scanner can introspect.
///
/// Implemented by [`crate::Assembly`]; any other source of type information can implement it
/// to feed [`crate::IntellisenseGenerator::generate_from_modules`].
pub trait Module {
    /// Display name used in logs and reports, usually the file name.
    fn name(&self) -> &str;

    /// The types defined in this module, in metadata order.
    ///
    /// # Errors
    /// Returns an error if the module cannot be introspected; the scanner skips such modules.
    fn defined_types(&self) -> Result<Vec<TypeDefinition>>;
}

/// A type defined in a [`Module`].
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDefinition {
    /// Namespace, empty for the global namespace
    pub namespace: String,
    /// Metadata name including any arity suffix
    pub name: String,
    /// `TypeAttributes` of the definition
    pub flags: TypeAttributes,
    /// Methods in declaration order
    pub methods: Vec<MethodDefinition>,
}

impl TypeDefinition {
    /// `true` for `static class` types.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.is_static_class()
    }
}

/// The type of an attribute applied to a method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeType {
    /// Namespace of the attribute class
    pub namespace: String,
    /// Name of the attribute class
    pub name: String,
}

impl AttributeType {
    /// Builds an attribute type from its namespace and name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        AttributeType {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// A declared method parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Declared name
    pub name: String,
    /// Parameter type, a [`TypeDescriptor::ByRef`] for `ref`, `out` and `in` parameters
    pub ty: TypeDescriptor,
}

impl Parameter {
    /// Builds a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Parameter {
            name: name.into(),
            ty,
        }
    }
}

/// A method of a [`TypeDefinition`].
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Types of the custom attributes applied to the method
    pub attributes: Vec<AttributeType>,
    /// Declared parameters in order
    pub parameters: Vec<Parameter>,
    /// Return type
    pub return_type: TypeDescriptor,
    /// Names of the method's own generic parameters
    pub generic_parameters: Vec<String>,
}

/// The two kinds of Cake alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AliasKind {
    /// A method alias, emitted with a parameter list
    Callable,
    /// A property alias, emitted without one
    Property,
}

/// A static container type that declares aliases.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerType {
    /// Namespace of the container
    pub namespace: String,
    /// Metadata name, used as the region label
    pub name: String,
}

/// One alias member found by the scanner.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasMember {
    /// Member name
    pub name: String,
    /// Alias kind decided from the marker attribute
    pub kind: AliasKind,
    /// All declared parameters, receiver included
    pub parameters: Vec<Parameter>,
    /// Return type
    pub return_type: TypeDescriptor,
    /// Names of the member's own generic parameters
    pub generic_parameters: Vec<String>,
}

impl AliasMember {
    /// The parameters that appear in the generated signature; the first declared parameter
    /// is the script context and is supplied implicitly.
    #[must_use]
    pub fn visible_parameters(&self) -> &[Parameter] {
        self.parameters.get(1..).unwrap_or(&[])
    }
}

/// A container and its aliases, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerAliases {
    /// The declaring static type
    pub container: ContainerType,
    /// Its aliases, never empty
    pub aliases: Vec<AliasMember>,
}
