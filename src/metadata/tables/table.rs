use std::{marker::PhantomData, sync::Arc};

use crate::{
    metadata::tables::{TableId, TableInfo},
    Result,
};

/// Shared handle to the column layout of one table stream.
pub type TableInfoRef = Arc<TableInfo>;

/// A row type that can be decoded from its table.
///
/// Row ids are 1-based, as everywhere in the metadata format; `0` denotes a null reference.
pub trait RowReadable: Sized {
    /// The table this row type belongs to.
    const TABLE: TableId;

    /// Reads one row at `offset` and advances `offset` past it.
    ///
    /// # Errors
    /// Returns an error if `data` is too short or a coded index carries an invalid tag.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self>;
}

/// Typed, lazily decoded view of one metadata table.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: TableInfoRef,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Wraps the bytes of a table holding `row_count` rows.
    #[must_use]
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Self {
        MetadataTable {
            data,
            row_count,
            row_size: sizes.row_size(T::TABLE),
            sizes,
            _phantom: PhantomData,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Size of a single row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Decodes row `rid` (1-based).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `rid` is `0` or past the end of the table.
    pub fn get(&self, rid: u32) -> Result<T> {
        if rid == 0 || rid > self.row_count {
            return Err(out_of_bounds_error!());
        }

        let mut offset = (rid as usize - 1) * self.row_size as usize;
        T::row_read(self.data, &mut offset, rid, &self.sizes)
    }

    /// Iterates over all rows in table order.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
            current_offset: 0,
        }
    }
}

impl<'t, 'a, T: RowReadable> IntoIterator for &'t MetadataTable<'a, T> {
    type Item = Result<T>;
    type IntoIter = TableIterator<'t, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
///
/// Yields decoding errors instead of ending early, so a damaged row is reported rather than
/// silently hiding the rows after it.
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a, T>,
    current_row: u32,
    current_offset: usize,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        self.current_row += 1;
        let row = T::row_read(
            self.table.data,
            &mut self.current_offset,
            self.current_row,
            &self.table.sizes,
        );

        if row.is_err() {
            self.current_row = self.table.row_count;
        }

        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count - self.current_row) as usize;
        (remaining, Some(remaining))
    }
}
