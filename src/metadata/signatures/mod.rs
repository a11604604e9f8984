//! Signature blobs (ECMA-335 §II.23.2).
//!
//! Method definitions carry a `MethodDefSig` in the `#Blob` heap that lists the return type
//! and every parameter type; generic instantiations referenced from those types live in
//! `TypeSpec` signatures. Both are decoded into [`TypeSignature`] trees whose leaves are
//! primitives, generic parameter positions, or tokens that still need resolving against the
//! `TypeDef`, `TypeRef` and `TypeSpec` tables.

mod parser;
mod types;

pub use parser::SignatureParser;
pub use types::*;

use crate::Result;

/// Parse a `MethodDefSig` or `MethodRefSig` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_signature(data: &[u8]) -> Result<SignatureMethod> {
    let mut parser = SignatureParser::new(data);
    parser.parse_method_signature()
}

/// Parse a `TypeSpec` signature from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_type_spec_signature(data: &[u8]) -> Result<SignatureTypeSpec> {
    let mut parser = SignatureParser::new(data);
    parser.parse_type_spec_signature()
}
