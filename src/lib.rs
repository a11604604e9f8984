// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # cake-intellisense
//!
//! Generates a C# companion class that gives editors completion for Cake build-script aliases.
//!
//! Cake exposes its script functions as extension methods on `ICakeContext`, declared in
//! static classes and marked with `CakeMethodAliasAttribute` or `CakePropertyAliasAttribute`.
//! Inside a script the context argument is implicit, so an editor that only sees the raw
//! assemblies cannot offer the right completions. This crate reads the ECMA-335 metadata of
//! every assembly in a directory, finds the alias methods, and writes a partial class whose
//! members mirror the script-facing signatures:
//!
//! ```csharp
//! protected bool Foo(int count, string[] tags) => throw new System.NotSupportedException();
//! protected T Bar<T>(T value) => throw new System.NotSupportedException();
//! protected bool Verbose => throw new System.NotSupportedException();
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cake_intellisense::prelude::*;
//! use std::path::Path;
//!
//! let generator = IntellisenseGenerator::new(GeneratorConfig::default());
//! let report = generator.generate(Path::new("tools/Cake"))?;
//!
//! for skipped in &report.skipped_modules {
//!     eprintln!("skipped: {skipped}");
//! }
//! println!("Wrote {} aliases to {}", report.aliases, report.output_path.display());
//! # Ok::<(), cake_intellisense::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Metadata root, streams, tables and signature decoding
//! - [`Assembly`] - Turns one assembly into [`intellisense::TypeDefinition`]s
//! - [`intellisense`] - Alias scanning, C# rendering and file emission
//! - [`IntellisenseGenerator`] - One run from an input directory to the written file
//!
//! Loading is lazy per module and failures are isolated: an assembly that cannot be decoded is
//! recorded in the [`GenerationReport`] and the run carries on with the rest. Only listing the
//! input directory and writing the output can fail a run.
//!
//! ## Logging
//!
//! Progress is reported through the [`log`] facade: `debug` for per-module progress, `warn` for
//! skipped modules and members, `info` for the final summary. No logger is installed.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

mod assembly;
mod generator;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use cake_intellisense::prelude::*;
///
/// let assembly = Assembly::from_file("tools/Cake/Cake.Common.dll".as_ref())?;
/// println!("{} types", assembly.defined_types()?.len());
/// # Ok::<(), cake_intellisense::Error>(())
/// ```
pub mod prelude;

/// Alias discovery, C# rendering and stub file emission.
///
/// # Examples
///
/// ```rust
/// use cake_intellisense::intellisense::render::render_type;
/// use cake_intellisense::metadata::typesystem::{TypeDescriptor, TypeName};
///
/// let ty = TypeDescriptor::Generic {
///     definition: TypeName::new("System.Collections.Generic", "List`1"),
///     arguments: vec![TypeDescriptor::named(TypeName::new("System", "String"))],
/// };
/// assert_eq!(render_type(&ty), "List<string>");
/// ```
pub mod intellisense;

/// Definitions and parsing of CIL metadata based on ECMA-335.
///
/// Covers the pieces needed to enumerate types and methods: the CLI header, the metadata root
/// and stream directory, the `#Strings` and `#Blob` heaps, the `#~` table stream with the rows
/// the alias scanner reads, method and type specification signatures, and the language-level
/// [`metadata::typesystem::TypeDescriptor`] that signatures resolve to.
pub mod metadata;

/// `cake-intellisense` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cake-intellisense` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use cake_intellisense::{Assembly, Error};
///
/// match Assembly::from_file(std::path::Path::new("tools/Cake/Cake.Common.dll")) {
///     Ok(assembly) => println!("Loaded {}", assembly.name()),
///     Err(Error::NotSupported) => println!("Metadata layout not supported"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// A .NET assembly loaded for alias scanning.
pub use assembly::Assembly;

/// The generation run and its configuration.
pub use generator::{GenerationReport, GeneratorConfig, IntellisenseGenerator};

/// The introspection seam between assemblies and the alias scanner.
pub use intellisense::{scanner::AliasMarkers, Module};

/// Memory-mapped or in-memory PE image.
pub use file::File;
