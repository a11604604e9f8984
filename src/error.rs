use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Metadata decoding
/// - [`Error::Malformed`] - Corrupted or invalid file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::NotSupported`] - Unsupported file format or metadata layout
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::RecursionLimit`] - A signature nests deeper than the parser allows
///
/// ## I/O and external errors
/// - [`Error::FileError`] - Filesystem I/O errors (e.g. listing the input directory)
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
///
/// ## Generation
/// - [`Error::ModuleLoad`] - A single module could not be loaded or introspected
/// - [`Error::UnsupportedAliasShape`] - An alias marker of an unknown kind
/// - [`Error::FileWrite`] - The generated file could not be committed
///
/// Only [`Error::FileWrite`] and [`Error::FileError`] abort a generation run; module and alias
/// failures are collected into the [`crate::GenerationReport`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The data is malformed. `file` and `line` point at the check that rejected it.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// Description of the problem
        message: String,
        /// Source file of the failing check
        file: &'static str,
        /// Source line of the failing check
        line: u32,
    },

    /// A read past the end of the available data was attempted.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// Source file of the failing read
        file: &'static str,
        /// Source line of the failing read
        line: u32,
    },

    /// The file or metadata layout is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// The provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// Filesystem error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// PE parsing error.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// A signature was nested deeper than the parser accepts.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A module could not be loaded or its types could not be read.
    #[error("Failed to load module '{module}' - {source}")]
    ModuleLoad {
        /// Display name of the module (usually the file name)
        module: String,
        /// The underlying decoding or I/O failure
        #[source]
        source: Box<Error>,
    },

    /// A member carries an alias marker that is neither a method nor a property alias.
    #[error("Unsupported alias marker '{marker}' on {container}.{member}")]
    UnsupportedAliasShape {
        /// Declaring container type
        container: String,
        /// Member carrying the marker
        member: String,
        /// Name of the unrecognised marker attribute
        marker: String,
    },

    /// The generated file could not be written.
    #[error("Failed to write '{}' - {source}", path.display())]
    FileWrite {
        /// Destination that was being written
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}
