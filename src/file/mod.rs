//! PE file abstraction for .NET binaries.
//!
//! A [`File`] owns the raw bytes of an image (memory-mapped from disk or held in memory) together
//! with the PE headers goblin parsed from them. It only exposes what the metadata reader needs:
//! the location of the CLI header and translation from relative virtual addresses to file
//! offsets.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cake_intellisense::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("Cake.Common.dll"))?;
//! let (clr_rva, clr_size) = file.clr()?;
//! let offset = file.rva_to_offset(clr_rva)?;
//! let header = file.data_slice(offset, clr_size)?;
//! # Ok::<(), cake_intellisense::Error>(())
//! ```

pub(crate) mod io;
pub(crate) mod memory;
pub(crate) mod parser;
pub(crate) mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::PE;
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Source of the raw image bytes.
pub trait Backend: Send + Sync {
    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the complete image.
    fn data(&self) -> &[u8];

    /// Size of the image in bytes.
    fn len(&self) -> usize;
}

/// A parsed PE image that carries a CLR runtime header.
#[self_referencing]
pub struct File {
    data: Box<dyn Backend>,
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Maps and parses the image at `file`.
    ///
    /// # Errors
    /// Fails if the file cannot be read, is not a PE image, or has no CLR runtime header.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Parses an image that is already in memory.
    ///
    /// # Errors
    /// Fails if `data` is not a PE image or has no CLR runtime header.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data: Box<dyn Backend> = Box::new(data);

        File::try_new(data, |data| match PE::parse(data.data()) {
            Ok(pe) => match pe.header.optional_header.as_ref() {
                Some(optional_header) => {
                    if optional_header
                        .data_directories
                        .get_clr_runtime_header()
                        .is_none()
                    {
                        Err(malformed_error!(
                            "File does not have a CLR runtime header directory"
                        ))
                    } else {
                        Ok(pe)
                    }
                }
                None => Err(malformed_error!("File does not have an OptionalHeader")),
            },
            Err(error) => Err(GoblinErr(error)),
        })
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow_data().len()
    }

    /// Returns `true` for an empty image (never the case for a loaded file).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complete image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.borrow_data().data()
    }

    /// Returns `len` bytes starting at file offset `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.borrow_data().data_slice(offset, len)
    }

    /// RVA and size of the CLR runtime header.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the directory is absent or empty.
    pub fn clr(&self) -> Result<(usize, usize)> {
        self.with_pe(|pe| {
            let Some(optional_header) = pe.header.optional_header.as_ref() else {
                return Err(malformed_error!("File does not have an OptionalHeader"));
            };

            match optional_header
                .data_directories
                .get_clr_runtime_header()
                .as_ref()
            {
                Some(clr_dir) if clr_dir.virtual_address != 0 && clr_dir.size != 0 => {
                    Ok((clr_dir.virtual_address as usize, clr_dir.size as usize))
                }
                _ => Err(malformed_error!("CLR runtime header directory is empty")),
            }
        })
    }

    /// Translates a relative virtual address into a file offset using the section table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no section contains `rva`.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva_u32 =
            u32::try_from(rva).map_err(|_| malformed_error!("RVA too large to fit in u32: {}", rva))?;

        self.with_pe(|pe| {
            for section in &pe.sections {
                let section_size = section.virtual_size.max(section.size_of_raw_data);
                let Some(section_max) = section.virtual_address.checked_add(section_size) else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        section_size
                    ));
                };

                if section.virtual_address <= rva_u32 && section_max > rva_u32 {
                    return Ok((rva - section.virtual_address as usize)
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(malformed_error!(
                "RVA could not be converted to offset - {}",
                rva
            ))
        })
    }
}
