//! # cake-intellisense Prelude
//!
//! The types needed to run a generation, load assemblies by hand, or feed the scanner from a
//! custom [`Module`] implementation.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// One generation run and its settings
pub use crate::{GenerationReport, GeneratorConfig, IntellisenseGenerator};

/// Assembly loading
pub use crate::Assembly;

// ================================================================================================
// Scanning and Rendering
// ================================================================================================

/// Introspection model consumed by the scanner
pub use crate::intellisense::{
    AliasKind, AliasMember, AttributeType, ContainerAliases, ContainerType, MethodDefinition,
    Module, Parameter, TypeDefinition,
};

/// Alias discovery
pub use crate::intellisense::scanner::{AliasMarkers, AliasScanner, ScanOutcome};

/// File emission
pub use crate::intellisense::emitter::{EmitterOptions, StubEmitter};

// ================================================================================================
// Type System
// ================================================================================================

/// Language-level type descriptions
pub use crate::metadata::typesystem::{
    Primitive, RefKind, TypeAttributes, TypeDescriptor, TypeName,
};
