use std::collections::HashMap;

use crate::{
    assembly::view::MetadataView,
    metadata::{
        signatures::{parse_type_spec_signature, TypeSignature},
        tables::{MetadataTable, NestedClassRaw, TableId, TypeDefRaw, TypeRefRaw, TypeSpecRaw},
        token::Token,
        typesystem::{Primitive, RefKind, TypeDescriptor, TypeName},
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum depth of nested names and type specifications followed while resolving
const MAX_RESOLVE_DEPTH: usize = 50;

/// Names of the generic parameters in scope for a signature.
#[derive(Clone, Copy, Default)]
pub(crate) struct GenericContext<'g> {
    /// Parameters of the declaring type, indexed by `VAR` position
    pub(crate) type_params: &'g [String],
    /// Parameters of the method, indexed by `MVAR` position
    pub(crate) method_params: &'g [String],
}

/// Turns signature types and type tokens into [`TypeDescriptor`]s and [`TypeName`]s.
pub(crate) struct TypeResolver<'v, 'a> {
    view: &'v MetadataView<'a>,
    typedefs: &'v [TypeDefRaw],
    typerefs: Option<MetadataTable<'a, TypeRefRaw>>,
    typespecs: Option<MetadataTable<'a, TypeSpecRaw>>,
    enclosing: HashMap<u32, u32>,
}

impl<'v, 'a> TypeResolver<'v, 'a> {
    pub(crate) fn new(view: &'v MetadataView<'a>, typedefs: &'v [TypeDefRaw]) -> Result<Self> {
        let mut enclosing = HashMap::new();
        if let Some(nested) = view.tables.table::<NestedClassRaw>() {
            for row in &nested {
                let row = row?;
                enclosing.insert(row.nested_class, row.enclosing_class);
            }
        }

        Ok(TypeResolver {
            view,
            typedefs,
            typerefs: view.tables.table::<TypeRefRaw>(),
            typespecs: view.tables.table::<TypeSpecRaw>(),
            enclosing,
        })
    }

    /// Row id of the type enclosing the `TypeDef` `rid`, if it is nested.
    pub(crate) fn enclosing_type(&self, rid: u32) -> Option<u32> {
        self.enclosing.get(&rid).copied()
    }

    /// Full name of the `TypeDef` or `TypeRef` behind `token`.
    pub(crate) fn type_name(&self, token: Token) -> Result<TypeName> {
        self.type_name_at(token, 0)
    }

    fn type_name_at(&self, token: Token, depth: usize) -> Result<TypeName> {
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(RecursionLimit(MAX_RESOLVE_DEPTH));
        }

        match token.table() {
            table if table == TableId::TypeDef as u8 => {
                let Some(typedef) = self.typedefs.get((token.row() as usize).wrapping_sub(1))
                else {
                    return Err(malformed_error!("Invalid TypeDef token - {}", token));
                };

                let name = self.view.string(typedef.type_name)?;
                match self.enclosing_type(typedef.rid) {
                    Some(outer) => Ok(TypeName::nested(
                        self.type_name_at(TableId::TypeDef.token(outer), depth + 1)?,
                        name,
                    )),
                    None => Ok(TypeName::new(
                        self.view.string(typedef.type_namespace)?,
                        name,
                    )),
                }
            }
            table if table == TableId::TypeRef as u8 => {
                let Some(typeref) = self
                    .typerefs
                    .as_ref()
                    .and_then(|typerefs| typerefs.get(token.row()).ok())
                else {
                    return Err(malformed_error!("Invalid TypeRef token - {}", token));
                };

                let name = self.view.string(typeref.type_name)?;
                let scope = typeref.resolution_scope;
                if scope.tag == TableId::TypeRef && !scope.is_null() {
                    Ok(TypeName::nested(
                        self.type_name_at(scope.token(), depth + 1)?,
                        name,
                    ))
                } else {
                    Ok(TypeName::new(
                        self.view.string(typeref.type_namespace)?,
                        name,
                    ))
                }
            }
            _ => Err(malformed_error!("Token does not name a type - {}", token)),
        }
    }

    /// The class an attribute constructor belongs to, given the `MemberRef` parent.
    ///
    /// Generic attribute classes are referenced through a `TypeSpec`; their definition is
    /// returned. Parents that are not types yield `None`.
    pub(crate) fn attribute_class(&self, token: Token) -> Result<Option<TypeName>> {
        match token.table() {
            table if table == TableId::TypeDef as u8 || table == TableId::TypeRef as u8 => {
                self.type_name(token).map(Some)
            }
            table if table == TableId::TypeSpec as u8 => match self.type_spec(token)? {
                TypeSignature::GenericInst(base, _) => match *base {
                    TypeSignature::Class(definition) | TypeSignature::ValueType(definition) => {
                        self.type_name(definition).map(Some)
                    }
                    _ => Ok(None),
                },
                TypeSignature::Class(definition) => self.type_name(definition).map(Some),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn type_spec(&self, token: Token) -> Result<TypeSignature> {
        let Some(spec) = self
            .typespecs
            .as_ref()
            .and_then(|typespecs| typespecs.get(token.row()).ok())
        else {
            return Err(malformed_error!("Invalid TypeSpec token - {}", token));
        };

        Ok(parse_type_spec_signature(self.view.blob(spec.signature)?)?.base)
    }

    /// Converts a signature type into a descriptor.
    pub(crate) fn resolve(
        &self,
        signature: &TypeSignature,
        context: GenericContext<'_>,
    ) -> Result<TypeDescriptor> {
        self.resolve_at(signature, context, 0)
    }

    fn resolve_at(
        &self,
        signature: &TypeSignature,
        context: GenericContext<'_>,
        depth: usize,
    ) -> Result<TypeDescriptor> {
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(RecursionLimit(MAX_RESOLVE_DEPTH));
        }

        let primitive =
            |primitive: Primitive| -> Result<TypeDescriptor> { Ok(TypeDescriptor::Primitive(primitive)) };
        match signature {
            TypeSignature::Void => primitive(Primitive::Void),
            TypeSignature::Boolean => primitive(Primitive::Boolean),
            TypeSignature::Char => primitive(Primitive::Char),
            TypeSignature::I1 => primitive(Primitive::SByte),
            TypeSignature::U1 => primitive(Primitive::Byte),
            TypeSignature::I2 => primitive(Primitive::Int16),
            TypeSignature::U2 => primitive(Primitive::UInt16),
            TypeSignature::I4 => primitive(Primitive::Int32),
            TypeSignature::U4 => primitive(Primitive::UInt32),
            TypeSignature::I8 => primitive(Primitive::Int64),
            TypeSignature::U8 => primitive(Primitive::UInt64),
            TypeSignature::R4 => primitive(Primitive::Single),
            TypeSignature::R8 => primitive(Primitive::Double),
            TypeSignature::String => primitive(Primitive::String),
            TypeSignature::Object => primitive(Primitive::Object),
            TypeSignature::I => primitive(Primitive::IntPtr),
            TypeSignature::U => primitive(Primitive::UIntPtr),
            TypeSignature::TypedByRef => primitive(Primitive::TypedReference),
            // Function pointers surface as native ints, as reflection reports them
            TypeSignature::FnPtr(_) => primitive(Primitive::IntPtr),
            TypeSignature::Ptr(inner) => Ok(TypeDescriptor::Pointer(Box::new(
                self.resolve_at(inner, context, depth + 1)?,
            ))),
            TypeSignature::ByRef(inner) => Ok(TypeDescriptor::ByRef(
                Box::new(self.resolve_at(inner, context, depth + 1)?),
                RefKind::Ref,
            )),
            TypeSignature::SzArray(element) => Ok(TypeDescriptor::array(
                self.resolve_at(element, context, depth + 1)?,
            )),
            TypeSignature::Array(array) => Ok(TypeDescriptor::Array {
                element: Box::new(self.resolve_at(&array.base, context, depth + 1)?),
                rank: array.rank,
            }),
            TypeSignature::GenericParamType(index) => Ok(TypeDescriptor::TypeParameter(
                generic_name(context.type_params, *index, "T"),
            )),
            TypeSignature::GenericParamMethod(index) => Ok(TypeDescriptor::TypeParameter(
                generic_name(context.method_params, *index, "M"),
            )),
            TypeSignature::Class(token) | TypeSignature::ValueType(token) => {
                self.resolve_token(*token, context, depth + 1)
            }
            TypeSignature::GenericInst(base, arguments) => {
                let definition = match base.as_ref() {
                    TypeSignature::Class(token) | TypeSignature::ValueType(token) => {
                        self.type_name_at(*token, depth + 1)?
                    }
                    _ => return Err(malformed_error!("Generic instance over a non-type")),
                };

                let arguments = arguments
                    .iter()
                    .map(|argument| self.resolve_at(argument, context, depth + 1))
                    .collect::<Result<Vec<_>>>()?;

                Ok(TypeDescriptor::Generic {
                    definition,
                    arguments,
                })
            }
            TypeSignature::Unknown => Err(malformed_error!("Unknown type in signature")),
        }
    }

    fn resolve_token(
        &self,
        token: Token,
        context: GenericContext<'_>,
        depth: usize,
    ) -> Result<TypeDescriptor> {
        if token.table() == TableId::TypeSpec as u8 {
            let spec = self.type_spec(token)?;
            return self.resolve_at(&spec, context, depth + 1);
        }

        Ok(TypeDescriptor::named(self.type_name_at(token, depth)?))
    }
}

/// The declared name at `index`, or a positional placeholder if metadata omits it.
fn generic_name(names: &[String], index: u32, prefix: &str) -> String {
    match names.get(index as usize) {
        Some(name) => name.clone(),
        None => format!("{prefix}{index}"),
    }
}
