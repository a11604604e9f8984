//! Metadata streams (ECMA-335 §II.24.2.2).
//!
//! - **`#Strings`** - UTF-8 identifier heap holding type, member and parameter names.
//! - **`#Blob`** - length-prefixed binary heap holding signatures and attribute values.
//! - **`#~`** - the compressed metadata tables.
//!
//! `#US` and `#GUID` are recognised in stream headers but never read; nothing the alias
//! scanner needs lives there.

mod blob;
mod streamheader;
mod strings;
mod tablesheader;

pub use blob::Blob;
pub use streamheader::StreamHeader;
pub use strings::Strings;
pub use tablesheader::TablesHeader;
