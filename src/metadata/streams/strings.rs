//! The `#Strings` heap: null-terminated UTF-8 identifiers (ECMA-335 §II.24.2.3).

use std::ffi::CStr;

use crate::Result;

/// A view over the `#Strings` heap.
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Wraps the heap data. The first byte of a valid heap is always `0`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty heap or a non-zero first byte.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #String heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Returns the string starting at byte offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap, or
    /// [`crate::Error::Malformed`] for an unterminated or non-UTF-8 string.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => result
                .to_str()
                .map_err(|_| malformed_error!("Invalid string at index - {}", index)),
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        let data = b"\0<Module>\0CakeAliases\0Cake.Core.Annotations\0";

        let str_view = Strings::from(data).unwrap();

        assert_eq!(str_view.get(0).unwrap(), "");
        assert_eq!(str_view.get(1).unwrap(), "<Module>");
        assert_eq!(str_view.get(10).unwrap(), "CakeAliases");
        assert_eq!(str_view.get(22).unwrap(), "Cake.Core.Annotations");
        // Index into the middle of a string yields its tail
        assert_eq!(str_view.get(14).unwrap(), "Aliases");
        assert!(str_view.get(data.len()).is_err());
    }

    #[test]
    fn invalid() {
        assert!(Strings::from(b"").is_err());
        assert!(Strings::from(b"abc\0").is_err());

        let str_view = Strings::from(b"\0abc").unwrap();
        assert!(str_view.get(1).is_err());
    }
}
