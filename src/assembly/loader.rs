use std::{collections::HashMap, ops::Range};

use crate::{
    assembly::{
        resolver::{GenericContext, TypeResolver},
        view::MetadataView,
    },
    intellisense::{AttributeType, MethodDefinition, Parameter, TypeDefinition},
    metadata::{
        signatures::parse_method_signature,
        tables::{
            CustomAttributeRaw, GenericParamRaw, MemberRefRaw, MetadataTable, MethodDefRaw,
            ParamRaw, RowReadable, TableId, TypeDefRaw,
        },
        typesystem::{ParamAttributes, RefKind, TypeAttributes, TypeDescriptor},
    },
    Result,
};

/// Reads every row of the table holding `T`, empty if the table is absent.
fn read_all<T: RowReadable>(table: Option<MetadataTable<'_, T>>) -> Result<Vec<T>> {
    match table {
        Some(table) => table.iter().collect(),
        None => Ok(Vec::new()),
    }
}

/// The 0-based range of a run that starts at the 1-based `start` and ends where the next
/// owner's run begins. Out-of-range list columns are clamped to the table.
fn run(start: u32, next_start: Option<u32>, len: usize) -> Range<usize> {
    let start = (start.max(1) as usize - 1).min(len);
    let end = match next_start {
        Some(next) => (next.max(1) as usize - 1).min(len),
        None => len,
    };
    start..end.max(start)
}

/// Builds [`TypeDefinition`]s from a metadata root.
pub(crate) struct TypeLoader<'v, 'a> {
    view: &'v MetadataView<'a>,
    typedefs: Vec<TypeDefRaw>,
    methods: Vec<MethodDefRaw>,
    params: Vec<ParamRaw>,
    method_owner: Vec<u32>,
    generic_params: HashMap<(TableId, u32), Vec<String>>,
    attributes: HashMap<u32, Vec<AttributeType>>,
}

impl<'v, 'a> TypeLoader<'v, 'a> {
    pub(crate) fn new(view: &'v MetadataView<'a>) -> Result<Self> {
        let typedefs = read_all(view.tables.table::<TypeDefRaw>())?;
        let methods = read_all(view.tables.table::<MethodDefRaw>())?;
        let params = read_all(view.tables.table::<ParamRaw>())?;

        let mut method_owner = vec![0_u32; methods.len()];
        for (index, typedef) in typedefs.iter().enumerate() {
            let next = typedefs.get(index + 1).map(|next| next.method_list);
            for owner in &mut method_owner[run(typedef.method_list, next, methods.len())] {
                *owner = typedef.rid;
            }
        }

        let mut loader = TypeLoader {
            view,
            typedefs,
            methods,
            params,
            method_owner,
            generic_params: HashMap::new(),
            attributes: HashMap::new(),
        };
        loader.load_generic_params()?;

        Ok(loader)
    }

    fn load_generic_params(&mut self) -> Result<()> {
        let mut numbered: HashMap<(TableId, u32), Vec<(u16, String)>> = HashMap::new();
        for row in read_all(self.view.tables.table::<GenericParamRaw>())? {
            numbered
                .entry((row.owner.tag, row.owner.row))
                .or_default()
                .push((row.number, self.view.string(row.name)?.to_string()));
        }

        for (owner, mut names) in numbered {
            names.sort_by_key(|(number, _)| *number);
            self.generic_params
                .insert(owner, names.into_iter().map(|(_, name)| name).collect());
        }

        Ok(())
    }

    /// Attribute types applied to each method, keyed by `MethodDef` row.
    fn load_attributes(&mut self, resolver: &TypeResolver<'_, 'a>) -> Result<()> {
        let member_refs = self.view.tables.table::<MemberRefRaw>();

        for row in read_all(self.view.tables.table::<CustomAttributeRaw>())? {
            if row.parent.tag != TableId::MethodDef {
                continue;
            }

            let class = match row.constructor.tag {
                TableId::MethodDef => {
                    match self
                        .method_owner
                        .get((row.constructor.row as usize).wrapping_sub(1))
                    {
                        Some(owner) if *owner != 0 => {
                            Some(resolver.type_name(TableId::TypeDef.token(*owner))?)
                        }
                        _ => None,
                    }
                }
                TableId::MemberRef => {
                    let Some(member_ref) = member_refs
                        .as_ref()
                        .and_then(|table| table.get(row.constructor.row).ok())
                    else {
                        return Err(malformed_error!(
                            "Invalid attribute constructor - {}",
                            row.constructor.token()
                        ));
                    };
                    resolver.attribute_class(member_ref.class.token())?
                }
                _ => None,
            };

            if let Some(class) = class {
                let namespace = class.root_namespace().to_string();
                self.attributes
                    .entry(row.parent.row)
                    .or_default()
                    .push(AttributeType::new(namespace, class.name));
            }
        }

        Ok(())
    }

    /// Builds every type of the module in `TypeDef` order.
    pub(crate) fn load(mut self) -> Result<Vec<TypeDefinition>> {
        let typedefs = std::mem::take(&mut self.typedefs);
        let resolver = TypeResolver::new(self.view, &typedefs)?;
        self.load_attributes(&resolver)?;

        let mut types = Vec::with_capacity(typedefs.len());
        for (index, typedef) in typedefs.iter().enumerate() {
            let name = resolver.type_name(TableId::TypeDef.token(typedef.rid))?;
            let type_params = self
                .generic_params
                .get(&(TableId::TypeDef, typedef.rid))
                .cloned()
                .unwrap_or_default();

            let next = typedefs.get(index + 1).map(|next| next.method_list);
            let mut methods = Vec::new();
            for method_index in run(typedef.method_list, next, self.methods.len()) {
                methods.push(self.load_method(&resolver, method_index, &type_params)?);
            }

            types.push(TypeDefinition {
                namespace: name.root_namespace().to_string(),
                name: name.name,
                flags: TypeAttributes::from_bits_truncate(typedef.flags),
                methods,
            });
        }

        Ok(types)
    }

    fn load_method(
        &self,
        resolver: &TypeResolver<'_, 'a>,
        index: usize,
        type_params: &[String],
    ) -> Result<MethodDefinition> {
        let method = &self.methods[index];
        let signature = parse_method_signature(self.view.blob(method.signature)?)?;

        let method_params = match self.generic_params.get(&(TableId::MethodDef, method.rid)) {
            Some(names) => names.clone(),
            None => placeholder_generic_names(signature.param_count_generic),
        };
        let context = GenericContext {
            type_params,
            method_params: &method_params,
        };

        let next = self.methods.get(index + 1).map(|next| next.param_list);
        let mut declared: HashMap<u16, (&str, ParamAttributes)> = HashMap::new();
        for param in &self.params[run(method.param_list, next, self.params.len())] {
            if param.sequence > 0 {
                declared.insert(
                    param.sequence,
                    (
                        self.view.string(param.name)?,
                        ParamAttributes::from_bits_truncate(param.flags),
                    ),
                );
            }
        }

        let mut parameters = Vec::with_capacity(signature.params.len());
        for (position, param) in signature.params.iter().enumerate() {
            let sequence = u16::try_from(position + 1)
                .map_err(|_| malformed_error!("Too many parameters - {}", position))?;
            let (name, flags) = match declared.get(&sequence) {
                Some((name, flags)) if !name.is_empty() => ((*name).to_string(), *flags),
                Some((_, flags)) => (format!("arg{sequence}"), *flags),
                None => (format!("arg{sequence}"), ParamAttributes::empty()),
            };

            let mut ty = resolver.resolve(&param.base, context)?;
            if param.by_ref {
                ty = TypeDescriptor::ByRef(Box::new(ty), RefKind::from_param_flags(flags));
            }
            parameters.push(Parameter::new(name, ty));
        }

        let mut return_type = resolver.resolve(&signature.return_type.base, context)?;
        if signature.return_type.by_ref {
            return_type = TypeDescriptor::ByRef(Box::new(return_type), RefKind::Ref);
        }

        Ok(MethodDefinition {
            name: self.view.string(method.name)?.to_string(),
            attributes: self.attributes.get(&method.rid).cloned().unwrap_or_default(),
            parameters,
            return_type,
            generic_parameters: method_params,
        })
    }
}

/// Names used when a generic method has no `GenericParam` rows.
fn placeholder_generic_names(count: u32) -> Vec<String> {
    match count {
        0 => Vec::new(),
        1 => vec!["T".to_string()],
        _ => (1..=count).map(|index| format!("T{index}")).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs() {
        assert_eq!(run(1, Some(3), 5), 0..2);
        assert_eq!(run(3, None, 5), 2..5);
        // Empty list: next owner starts at the same row
        assert_eq!(run(3, Some(3), 5), 2..2);
        // Past the end of the table
        assert_eq!(run(6, None, 5), 5..5);
        assert_eq!(run(9, Some(12), 5), 5..5);
        // Null list column
        assert_eq!(run(0, Some(2), 5), 0..1);
        // Decreasing list columns are treated as empty
        assert_eq!(run(4, Some(2), 5), 3..3);
    }

    #[test]
    fn placeholders() {
        assert!(placeholder_generic_names(0).is_empty());
        assert_eq!(placeholder_generic_names(1), vec!["T"]);
        assert_eq!(placeholder_generic_names(2), vec!["T1", "T2"]);
    }
}
