//! ECMA-335 metadata reading.
//!
//! The reader walks from the CLI header ([`cor20header`]) to the metadata [`root`], slices the
//! [`streams`] it names, and exposes the [`tables`] and [`signatures`] needed to describe the
//! types and methods of an assembly in terms of the [`typesystem`].
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Sections 22-25

/// Implementation of the Header of CIL
pub mod cor20header;
/// Implementation of the root metadata structure
pub mod root;
/// Implementation of method and type signatures
pub mod signatures;
/// Implementation of the metadata streams
pub mod streams;
/// Implementation of the metadata tables
pub mod tables;
/// Implementation of metadata tokens
pub mod token;
/// Language-level description of types, as rendered into C#
pub mod typesystem;
