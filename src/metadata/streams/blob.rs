//! The `#Blob` heap: length-prefixed binary values (ECMA-335 §II.24.2.4).
//!
//! Signatures, custom attribute values and type specifications all live here. Every entry is
//! prefixed with its size as a compressed unsigned integer.

use crate::{file::parser::Parser, Result};

/// A view over the `#Blob` heap.
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Wraps the heap data. The first byte of a valid heap is always `0`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty heap or a non-zero first byte.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Returns the blob stored at byte offset `index`, without its length prefix.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the encoded length points past
    /// the end of the heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }
}
