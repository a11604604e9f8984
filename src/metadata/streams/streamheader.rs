//! Stream headers of the metadata root (ECMA-335 §II.24.2.2).

use crate::{file::io::read_le, Result};

/// Location and name of one metadata stream, relative to the metadata root.
pub struct StreamHeader {
    /// Offset from the start of the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Stream name, e.g. `#~` or `#Strings`
    pub name: String,
}

impl StreamHeader {
    /// Reads a stream header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data or
    /// [`crate::Error::Malformed`] for an unknown stream name.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(out_of_bounds_error!());
        }

        let name_bytes = &data[8..std::cmp::min(8 + 32, data.len())];
        let name_len = name_bytes
            .iter()
            .position(|byte| *byte == 0)
            .ok_or_else(|| malformed_error!("Stream header name is not terminated"))?;
        let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

        if !["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"]
            .iter()
            .any(|valid_name| name == *valid_name)
        {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Number of bytes this header occupies, including the padded name.
    #[must_use]
    pub fn header_len(&self) -> usize {
        8 + (((self.name.len() + 1) + 3) & !3)
    }
}
