//! CLI header (`IMAGE_COR20_HEADER`, ECMA-335 §II.25.3.3).
//!
//! Only the fields needed to locate the metadata root are kept; everything after the flags
//! (resources, strong name, vtable fixups, ...) is irrelevant for reading type definitions.

use crate::{file::parser::Parser, Result};

/// The leading part of the CLI header.
pub struct Cor20Header {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// Minimum major runtime version required
    pub major_runtime_version: u16,
    /// Minor runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// `COMIMAGE_FLAGS_*`
    pub flags: u32,
}

impl Cor20Header {
    /// Reads the header from `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data or
    /// [`crate::Error::Malformed`] if the size or metadata location is invalid.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < 72 {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb != 72 {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;

        let meta_data_rva = parser.read_le::<u32>()?;
        if meta_data_rva == 0 {
            return Err(malformed_error!("Metadata RVA cannot be zero"));
        }

        let meta_data_size = parser.read_le::<u32>()?;
        if meta_data_size == 0 {
            return Err(malformed_error!("Metadata size cannot be zero"));
        } else if meta_data_size > 0x1000_0000 {
            return Err(malformed_error!(
                "Metadata size {} exceeds reasonable limit (256MB)",
                meta_data_size
            ));
        }

        let flags = parser.read_le::<u32>()?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        let mut header_bytes = vec![0_u8; 72];
        header_bytes[0] = 0x48; // cb = 72
        header_bytes[4] = 0x02; // major_runtime_version = 2
        header_bytes[6] = 0x05; // minor_runtime_version = 5
        header_bytes[8..12].copy_from_slice(&0x2050_u32.to_le_bytes());
        header_bytes[12..16].copy_from_slice(&0x1000_u32.to_le_bytes());
        header_bytes[16] = 0x01; // ILONLY

        let parsed_header = Cor20Header::read(&header_bytes).unwrap();

        assert_eq!(parsed_header.cb, 72);
        assert_eq!(parsed_header.major_runtime_version, 2);
        assert_eq!(parsed_header.minor_runtime_version, 5);
        assert_eq!(parsed_header.meta_data_rva, 0x2050);
        assert_eq!(parsed_header.meta_data_size, 0x1000);
        assert_eq!(parsed_header.flags, 1);
    }

    #[test]
    fn invalid() {
        assert!(Cor20Header::read(&[0_u8; 16]).is_err());

        let mut header_bytes = vec![0_u8; 72];
        header_bytes[0] = 0x48;
        // metadata rva of zero
        assert!(Cor20Header::read(&header_bytes).is_err());

        header_bytes[0] = 0x40;
        assert!(Cor20Header::read(&header_bytes).is_err());
    }
}
