use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::{CodedIndexType, TableId},
    Result,
};

/// Row counts and column widths of one `#~` stream.
///
/// Every index column is either 2 or 4 bytes wide. Heap indexes are widened by the
/// `HeapSizes` flags, table indexes once the target table exceeds 65535 rows, and coded
/// indexes once the largest target table no longer fits next to the tag bits.
#[derive(Clone, Debug, Default)]
pub struct TableInfo {
    rows: Vec<u32>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

impl TableInfo {
    /// Reads the row counts that follow the fixed part of the table stream header.
    ///
    /// `offset` must point at the first row count and is advanced past the last one.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data or
    /// [`crate::Error::NotSupported`] if the stream declares tables this reader does not know.
    pub fn read(data: &[u8], offset: &mut usize, valid_bitvec: u64, heap_sizes: u8) -> Result<Self> {
        if valid_bitvec >> TableId::SLOTS != 0 {
            return Err(crate::Error::NotSupported);
        }

        let mut rows = vec![0_u32; TableId::SLOTS];
        for table_id in TableId::iter() {
            if (valid_bitvec & (1 << table_id as usize)) == 0 {
                continue;
            }

            rows[table_id as usize] = read_le_at::<u32>(data, offset)?;
        }

        Ok(TableInfo::new(
            rows,
            heap_sizes & 1 == 1,
            heap_sizes & 2 == 2,
            heap_sizes & 4 == 4,
        ))
    }

    /// Builds the info from explicit row counts, indexed by [`TableId`].
    #[must_use]
    pub fn new(mut rows: Vec<u32>, large_str: bool, large_guid: bool, large_blob: bool) -> Self {
        rows.resize(TableId::SLOTS, 0);

        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![2; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for coded_index in CodedIndexType::iter() {
            table_info.coded_indexes[coded_index as usize] =
                table_info.calculate_coded_index_bytes(coded_index);
        }

        table_info
    }

    fn calculate_coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_rows = coded_index_type
            .tables()
            .iter()
            .flatten()
            .map(|table| self.rows(*table))
            .max()
            .unwrap_or(0);

        if max_rows >= 1 << (16 - coded_index_type.tag_bits()) {
            4
        } else {
            2
        }
    }

    /// Number of rows in `table`.
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize]
    }

    /// `true` if indexes into `table` are 4 bytes wide.
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.table_index_bytes(table) == 4
    }

    /// `true` if `#Strings` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// `true` if `#Blob` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Width of a `#Strings` index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Width of a `#GUID` index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Width of a `#Blob` index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Width of an index into `table`.
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u8 {
        if self.rows(table) > u32::from(u16::MAX) {
            4
        } else {
            2
        }
    }

    /// Width of a coded index of the given kind.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Size in bytes of one row of `table` (ECMA-335 §II.22).
    #[must_use]
    pub fn row_size(&self, table: TableId) -> u32 {
        let s = self.str_bytes();
        let g = self.guid_bytes();
        let b = self.blob_bytes();
        let t = |id: TableId| self.table_index_bytes(id);
        let c = |kind: CodedIndexType| self.coded_index_bytes(kind);

        let size = match table {
            TableId::Module => 2 + s + g + g + g,
            TableId::TypeRef => c(CodedIndexType::ResolutionScope) + s + s,
            TableId::TypeDef => {
                4 + s + s + c(CodedIndexType::TypeDefOrRef) + t(TableId::Field) + t(TableId::MethodDef)
            }
            TableId::FieldPtr => t(TableId::Field),
            TableId::Field => 2 + s + b,
            TableId::MethodPtr => t(TableId::MethodDef),
            TableId::MethodDef => 4 + 2 + 2 + s + b + t(TableId::Param),
            TableId::ParamPtr => t(TableId::Param),
            TableId::Param => 2 + 2 + s,
            TableId::InterfaceImpl => t(TableId::TypeDef) + c(CodedIndexType::TypeDefOrRef),
            TableId::MemberRef => c(CodedIndexType::MemberRefParent) + s + b,
            TableId::Constant => 2 + c(CodedIndexType::HasConstant) + b,
            TableId::CustomAttribute => {
                c(CodedIndexType::HasCustomAttribute) + c(CodedIndexType::CustomAttributeType) + b
            }
            TableId::FieldMarshal => c(CodedIndexType::HasFieldMarshal) + b,
            TableId::DeclSecurity => 2 + c(CodedIndexType::HasDeclSecurity) + b,
            TableId::ClassLayout => 2 + 4 + t(TableId::TypeDef),
            TableId::FieldLayout => 4 + t(TableId::Field),
            TableId::StandAloneSig => b,
            TableId::EventMap => t(TableId::TypeDef) + t(TableId::Event),
            TableId::EventPtr => t(TableId::Event),
            TableId::Event => 2 + s + c(CodedIndexType::TypeDefOrRef),
            TableId::PropertyMap => t(TableId::TypeDef) + t(TableId::Property),
            TableId::PropertyPtr => t(TableId::Property),
            TableId::Property => 2 + s + b,
            TableId::MethodSemantics => {
                2 + t(TableId::MethodDef) + c(CodedIndexType::HasSemantics)
            }
            TableId::MethodImpl => {
                t(TableId::TypeDef)
                    + c(CodedIndexType::MethodDefOrRef)
                    + c(CodedIndexType::MethodDefOrRef)
            }
            TableId::ModuleRef => s,
            TableId::TypeSpec => b,
            TableId::ImplMap => {
                2 + c(CodedIndexType::MemberForwarded) + s + t(TableId::ModuleRef)
            }
            TableId::FieldRVA => 4 + t(TableId::Field),
            TableId::EncLog => 4 + 4,
            TableId::EncMap => 4,
            TableId::Assembly => 4 + 2 + 2 + 2 + 2 + 4 + b + s + s,
            TableId::AssemblyProcessor => 4,
            TableId::AssemblyOS => 4 + 4 + 4,
            TableId::AssemblyRef => 2 + 2 + 2 + 2 + 4 + b + s + s + b,
            TableId::AssemblyRefProcessor => 4 + t(TableId::AssemblyRef),
            TableId::AssemblyRefOS => 4 + 4 + 4 + t(TableId::AssemblyRef),
            TableId::File => 4 + s + b,
            TableId::ExportedType => 4 + 4 + s + s + c(CodedIndexType::Implementation),
            TableId::ManifestResource => 4 + 4 + s + c(CodedIndexType::Implementation),
            TableId::NestedClass => t(TableId::TypeDef) + t(TableId::TypeDef),
            TableId::GenericParam => 2 + 2 + c(CodedIndexType::TypeOrMethodDef) + s,
            TableId::MethodSpec => c(CodedIndexType::MethodDefOrRef) + b,
            TableId::GenericParamConstraint => {
                t(TableId::GenericParam) + c(CodedIndexType::TypeDefOrRef)
            }
        };

        u32::from(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(tables: &[(TableId, u32)]) -> Vec<u32> {
        let mut rows = vec![0; TableId::SLOTS];
        for (id, count) in tables {
            rows[*id as usize] = *count;
        }
        rows
    }

    #[test]
    fn small_indexes() {
        let info = TableInfo::new(
            rows(&[(TableId::TypeDef, 10), (TableId::MethodDef, 40)]),
            false,
            false,
            false,
        );

        assert_eq!(info.row_size(TableId::TypeDef), 14);
        assert_eq!(info.row_size(TableId::MethodDef), 14);
        assert_eq!(info.row_size(TableId::Param), 6);
        assert_eq!(info.row_size(TableId::CustomAttribute), 6);
        assert_eq!(info.row_size(TableId::Module), 10);
        assert_eq!(info.row_size(TableId::Assembly), 22);
    }

    #[test]
    fn large_heaps_and_tables() {
        let info = TableInfo::new(
            rows(&[(TableId::MethodDef, 0x1_0000), (TableId::TypeRef, 0x4000)]),
            true,
            true,
            true,
        );

        assert_eq!(info.table_index_bytes(TableId::MethodDef), 4);
        assert_eq!(info.table_index_bytes(TableId::TypeRef), 2);
        // 0x4000 rows no longer fit beside the 2 tag bits
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        // MethodDef is part of HasCustomAttribute
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 2);
        assert_eq!(info.row_size(TableId::Param), 8);
        assert_eq!(info.row_size(TableId::Module), 2 + 4 * 4);
    }

    #[test]
    fn coded_index_threshold() {
        // HasCustomAttribute uses 5 tag bits, leaving room for 2^11 - 1 rows
        let info = TableInfo::new(rows(&[(TableId::MethodDef, 0x7FF)]), false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 2);

        let info = TableInfo::new(rows(&[(TableId::MethodDef, 0x800)]), false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
    }

    #[test]
    fn read_row_counts() {
        let valid = (1_u64 << TableId::Module as usize) | (1 << TableId::TypeDef as usize);
        let data = [0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00];
        let mut offset = 0;

        let info = TableInfo::read(&data, &mut offset, valid, 0).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(info.rows(TableId::Module), 1);
        assert_eq!(info.rows(TableId::TypeDef), 5);
        assert_eq!(info.rows(TableId::TypeRef), 0);

        let unknown = 1_u64 << 0x30;
        assert!(TableInfo::read(&data, &mut 0, unknown, 0).is_err());
    }
}
