use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{MetadataTable, RowReadable, TableId, TableInfo, TableInfoRef},
    Result,
};

/// The header of the `#~` stream and the location of every table inside it.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6
pub struct TablesHeader<'a> {
    /// Major version of table schemata, shall be 2
    pub major_version: u8,
    /// Minor version of table schemata, shall be 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and column widths
    pub info: TableInfoRef,
    tables: Vec<Option<&'a [u8]>>,
}

impl<'a> TablesHeader<'a> {
    /// Parses the header and slices out every present table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is shorter than its tables claim,
    /// [`crate::Error::Malformed`] if no table is present, or [`crate::Error::NotSupported`]
    /// for tables this reader does not know.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(out_of_bounds_error!());
        }

        let heap_sizes = read_le::<u8>(&data[6..])?;
        let valid_bitvec = read_le::<u64>(&data[8..])?;
        if valid_bitvec == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        let mut offset = 24;
        let info = TableInfo::read(data, &mut offset, valid_bitvec, heap_sizes)?;

        // Some compilers append an extra 4 bytes after the row counts
        if heap_sizes & 0x40 != 0 {
            offset += 4;
        }

        let mut tables = vec![None; TableId::SLOTS];
        for table_id in TableId::iter() {
            let rows = info.rows(table_id);
            if rows == 0 {
                continue;
            }

            let size = u64::from(rows) * u64::from(info.row_size(table_id));
            let Some(end) = usize::try_from(size)
                .ok()
                .and_then(|size| offset.checked_add(size))
            else {
                return Err(out_of_bounds_error!());
            };

            let Some(table_data) = data.get(offset..end) else {
                return Err(out_of_bounds_error!());
            };

            tables[table_id as usize] = Some(table_data);
            offset = end;
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid: valid_bitvec,
            sorted: read_le::<u64>(&data[16..])?,
            info: Arc::new(info),
            tables,
        })
    }

    /// Number of tables present.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// `true` if `table_id` has at least one row.
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        self.tables[table_id as usize].is_some()
    }

    /// Row count of `table_id`, `0` if absent.
    #[must_use]
    pub fn table_row_count(&self, table_id: TableId) -> u32 {
        self.info.rows(table_id)
    }

    /// Typed access to the table holding `T` rows, `None` if it is absent.
    #[must_use]
    pub fn table<T: RowReadable>(&self) -> Option<MetadataTable<'a, T>> {
        self.tables[T::TABLE as usize].map(|data| {
            MetadataTable::new(data, self.info.rows(T::TABLE), self.info.clone())
        })
    }
}
