//! Raw rows of the tables the alias scanner reads.
//!
//! Each row keeps its columns undecoded: heap columns are offsets into `#Strings` or `#Blob`,
//! list columns are 1-based row ids, and coded indexes are already split into table and row.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo},
    Result,
};

/// A `TypeRef` row (§II.22.38).
#[derive(Clone, Debug, PartialEq)]
pub struct TypeRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// `Module`, `ModuleRef`, `AssemblyRef` or, for nested types, the enclosing `TypeRef`
    pub resolution_scope: CodedIndex,
    /// `#Strings` offset of the name
    pub type_name: u32,
    /// `#Strings` offset of the namespace
    pub type_namespace: u32,
}

impl RowReadable for TypeRefRaw {
    const TABLE: TableId = TableId::TypeRef;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            resolution_scope: CodedIndex::read(data, offset, sizes, CodedIndexType::ResolutionScope)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

/// A `TypeDef` row (§II.22.37).
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDefRaw {
    /// 1-based row id
    pub rid: u32,
    /// `TypeAttributes`
    pub flags: u32,
    /// `#Strings` offset of the name
    pub type_name: u32,
    /// `#Strings` offset of the namespace
    pub type_namespace: u32,
    /// Base type
    pub extends: CodedIndex,
    /// First row of this type's run in the `Field` table
    pub field_list: u32,
    /// First row of this type's run in the `MethodDef` table
    pub method_list: u32,
}

impl RowReadable for TypeDefRaw {
    const TABLE: TableId = TableId::TypeDef;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

/// A `MethodDef` row (§II.22.26).
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefRaw {
    /// 1-based row id
    pub rid: u32,
    /// RVA of the method body, `0` for abstract or extern methods
    pub rva: u32,
    /// `MethodImplAttributes`
    pub impl_flags: u16,
    /// `MethodAttributes`
    pub flags: u16,
    /// `#Strings` offset of the name
    pub name: u32,
    /// `#Blob` offset of the method signature
    pub signature: u32,
    /// First row of this method's run in the `Param` table
    pub param_list: u32,
}

impl RowReadable for MethodDefRaw {
    const TABLE: TableId = TableId::MethodDef;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}

/// A `Param` row (§II.22.33).
#[derive(Clone, Debug, PartialEq)]
pub struct ParamRaw {
    /// 1-based row id
    pub rid: u32,
    /// `ParamAttributes`
    pub flags: u16,
    /// `0` for the return value, otherwise the 1-based parameter position
    pub sequence: u16,
    /// `#Strings` offset of the name
    pub name: u32,
}

impl RowReadable for ParamRaw {
    const TABLE: TableId = TableId::Param;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(ParamRaw {
            rid,
            flags: read_le_at::<u16>(data, offset)?,
            sequence: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

/// A `MemberRef` row (§II.22.25).
#[derive(Clone, Debug, PartialEq)]
pub struct MemberRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// The type (or module, method) the member belongs to
    pub class: CodedIndex,
    /// `#Strings` offset of the name
    pub name: u32,
    /// `#Blob` offset of the signature
    pub signature: u32,
}

impl RowReadable for MemberRefRaw {
    const TABLE: TableId = TableId::MemberRef;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            class: CodedIndex::read(data, offset, sizes, CodedIndexType::MemberRefParent)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

/// A `CustomAttribute` row (§II.22.10).
#[derive(Clone, Debug, PartialEq)]
pub struct CustomAttributeRaw {
    /// 1-based row id
    pub rid: u32,
    /// The entity the attribute is applied to
    pub parent: CodedIndex,
    /// The attribute constructor, a `MethodDef` or `MemberRef`
    pub constructor: CodedIndex,
    /// `#Blob` offset of the encoded arguments
    pub value: u32,
}

impl RowReadable for CustomAttributeRaw {
    const TABLE: TableId = TableId::CustomAttribute;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasCustomAttribute)?,
            constructor: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexType::CustomAttributeType,
            )?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

/// A `TypeSpec` row (§II.22.39).
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpecRaw {
    /// 1-based row id
    pub rid: u32,
    /// `#Blob` offset of the type signature
    pub signature: u32,
}

impl RowReadable for TypeSpecRaw {
    const TABLE: TableId = TableId::TypeSpec;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(TypeSpecRaw {
            rid,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

/// A `NestedClass` row (§II.22.32).
#[derive(Clone, Debug, PartialEq)]
pub struct NestedClassRaw {
    /// 1-based row id
    pub rid: u32,
    /// `TypeDef` row of the nested type
    pub nested_class: u32,
    /// `TypeDef` row of the enclosing type
    pub enclosing_class: u32,
}

impl RowReadable for NestedClassRaw {
    const TABLE: TableId = TableId::NestedClass;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            nested_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

/// A `GenericParam` row (§II.22.20).
#[derive(Clone, Debug, PartialEq)]
pub struct GenericParamRaw {
    /// 1-based row id
    pub rid: u32,
    /// 0-based position in the owner's generic parameter list
    pub number: u16,
    /// `GenericParamAttributes`
    pub flags: u16,
    /// The declaring `TypeDef` or `MethodDef`
    pub owner: CodedIndex,
    /// `#Strings` offset of the name
    pub name: u32,
}

impl RowReadable for GenericParamRaw {
    const TABLE: TableId = TableId::GenericParam;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            owner: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::MetadataTable;

    fn info(tables: &[(TableId, u32)]) -> Arc<TableInfo> {
        let mut rows = vec![0; TableId::SLOTS];
        for (id, count) in tables {
            rows[*id as usize] = *count;
        }
        Arc::new(TableInfo::new(rows, false, false, false))
    }

    #[test]
    fn typedef_rows() {
        let data = vec![
            0x81, 0x01, 0x10, 0x00, // flags
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
            0x05, 0x00, // extends: TypeRef row 1
            0x01, 0x00, // field_list
            0x02, 0x00, // method_list
            0x00, 0x00, 0x00, 0x00, // second row
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x03, 0x00,
        ];

        let table = MetadataTable::<TypeDefRaw>::new(&data, 2, info(&[(TableId::TypeDef, 2)]));
        assert_eq!(table.row_size(), 14);

        let first = table.get(1).unwrap();
        assert_eq!(first.flags, 0x0010_0181);
        assert_eq!(first.type_name, 0x42);
        assert_eq!(first.type_namespace, 0x43);
        assert_eq!(first.extends.tag, TableId::TypeRef);
        assert_eq!(first.extends.row, 1);
        assert_eq!(first.method_list, 2);

        let rows: Vec<TypeDefRaw> = table.iter().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].rid, 2);
        assert_eq!(rows[1].method_list, 3);

        assert!(table.get(0).is_err());
        assert!(table.get(3).is_err());
    }

    #[test]
    fn custom_attribute_row() {
        let data = vec![
            0x20, 0x00, // parent: MethodDef row 1
            0x0B, 0x00, // constructor: MemberRef row 1
            0x07, 0x00, // value
        ];

        let table = MetadataTable::<CustomAttributeRaw>::new(
            &data,
            1,
            info(&[(TableId::CustomAttribute, 1)]),
        );
        let row = table.get(1).unwrap();
        assert_eq!(row.parent.tag, TableId::MethodDef);
        assert_eq!(row.parent.row, 1);
        assert_eq!(row.constructor.tag, TableId::MemberRef);
        assert_eq!(row.constructor.row, 1);
        assert_eq!(row.value, 7);
    }

    #[test]
    fn large_param_index() {
        let data = vec![
            0x00, 0x00, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x96, 0x00, // flags
            0x10, 0x00, // name
            0x20, 0x00, // signature
            0x01, 0x00, 0x01, 0x00, // param_list, 4 bytes
        ];

        let table = MetadataTable::<MethodDefRaw>::new(
            &data,
            1,
            info(&[(TableId::MethodDef, 1), (TableId::Param, 0x1_0000)]),
        );
        assert_eq!(table.row_size(), 16);
        assert_eq!(table.get(1).unwrap().param_list, 0x0001_0001);
    }

    #[test]
    fn truncated_row_is_an_error() {
        let data = vec![0x00, 0x00, 0x01];
        let table = MetadataTable::<ParamRaw>::new(&data, 1, info(&[(TableId::Param, 1)]));
        assert!(table.get(1).is_err());
        let mut iter = table.iter();
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
