//! The generation run: list the input directory, load every assembly, scan for aliases, emit
//! the stub file and commit it in one write.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    assembly::Assembly,
    intellisense::{
        emitter::{EmitterOptions, StubEmitter},
        scanner::{AliasMarkers, AliasScanner},
        Module,
    },
    Error, Result,
};

/// Settings of a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Destination of the generated file, `<class_name>.cs` when unset
    pub output: Option<PathBuf>,
    /// Namespace of the companion class
    pub namespace: String,
    /// Name of the companion class
    pub class_name: String,
    /// Base class of the companion class
    pub base_type: String,
    /// Attribute types that mark aliases
    pub markers: AliasMarkers,
    /// Emit `using` directives for the namespaces referenced by the stubs
    pub emit_usings: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output: None,
            namespace: "Cake.IntellisenseGenerator".to_string(),
            class_name: "CakeFileIntellisense".to_string(),
            base_type: "CakeFile".to_string(),
            markers: AliasMarkers::default(),
            emit_usings: true,
        }
    }
}

impl GeneratorConfig {
    /// Sets the destination of the generated file.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the namespace of the companion class.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the name of the companion class.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Sets the base class the companion class derives from.
    #[must_use]
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = base_type.into();
        self
    }

    /// Replaces the alias marker attributes.
    #[must_use]
    pub fn with_markers(mut self, markers: AliasMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Enables or disables `using` directives.
    #[must_use]
    pub fn with_usings(mut self, emit_usings: bool) -> Self {
        self.emit_usings = emit_usings;
        self
    }

    /// Where the generated file is written.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.cs", self.class_name)))
    }

    fn emitter_options(&self) -> EmitterOptions {
        EmitterOptions {
            namespace: self.namespace.clone(),
            class_name: self.class_name.clone(),
            base_type: self.base_type.clone(),
            emit_usings: self.emit_usings,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct GenerationReport {
    /// Where the file was written
    pub output_path: PathBuf,
    /// Number of containers that produced a section
    pub containers: usize,
    /// Number of emitted alias members
    pub aliases: usize,
    /// One [`Error::ModuleLoad`] per module that was skipped
    pub skipped_modules: Vec<Error>,
    /// One [`Error::UnsupportedAliasShape`] per member that was skipped
    pub skipped_members: Vec<Error>,
}

/// Produces the intellisense stub file.
///
/// # Examples
///
/// ```rust,no_run
/// use cake_intellisense::{GeneratorConfig, IntellisenseGenerator};
/// use std::path::Path;
///
/// let generator = IntellisenseGenerator::new(
///     GeneratorConfig::default().with_output("build/CakeFileIntellisense.cs"),
/// );
/// let report = generator.generate(Path::new("tools/Cake"))?;
/// println!("{} aliases in {} containers", report.aliases, report.containers);
/// # Ok::<(), cake_intellisense::Error>(())
/// ```
pub struct IntellisenseGenerator {
    config: GeneratorConfig,
}

impl IntellisenseGenerator {
    /// Creates a generator for `config`.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        IntellisenseGenerator { config }
    }

    /// The configuration of this generator.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates stubs for every `.dll` in `dir`.
    ///
    /// Files that cannot be loaded as assemblies are reported in
    /// [`GenerationReport::skipped_modules`] and do not stop the run.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if `dir` cannot be listed and [`Error::FileWrite`] if the
    /// output cannot be written.
    pub fn generate(&self, dir: &Path) -> Result<GenerationReport> {
        let mut modules: Vec<Box<dyn Module>> = Vec::new();
        let mut load_failures = Vec::new();

        for path in list_assemblies(dir)? {
            match Assembly::from_file(&path) {
                Ok(assembly) => modules.push(Box::new(assembly)),
                Err(error) => {
                    log::warn!("Failed to load '{}' - {}", path.display(), error);
                    load_failures.push(Error::ModuleLoad {
                        module: module_name(&path),
                        source: Box::new(error),
                    });
                }
            }
        }

        let mut report = self.generate_from_modules(&modules)?;
        load_failures.append(&mut report.skipped_modules);
        report.skipped_modules = load_failures;

        Ok(report)
    }

    /// Generates stubs for an already loaded set of modules.
    ///
    /// # Errors
    /// Returns [`Error::FileWrite`] if the output cannot be written.
    pub fn generate_from_modules(&self, modules: &[Box<dyn Module>]) -> Result<GenerationReport> {
        let outcome = AliasScanner::new(self.config.markers.clone()).scan(modules);
        let aliases = outcome.alias_count();

        let options = self.config.emitter_options();
        let text = StubEmitter::new(&options).emit(&outcome.catalog);
        let output_path = self.config.output_path();
        write_atomically(&output_path, text.as_bytes())?;

        log::info!(
            "Wrote {} aliases from {} containers to '{}'",
            aliases,
            outcome.catalog.len(),
            output_path.display()
        );

        Ok(GenerationReport {
            output_path,
            containers: outcome.catalog.len(),
            aliases,
            skipped_modules: outcome.module_failures,
            skipped_members: outcome.skipped_members,
        })
    }
}

fn module_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Regular files in `dir` with a `dll` extension (any case), sorted by file name.
fn list_assemblies(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_dll = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("dll"));
        if is_dll && entry.file_type()?.is_file() {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} assemblies in '{}'", paths.len(), dir.display());

    Ok(paths)
}

/// Writes `data` to a sibling temporary file and renames it over `path`.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let written = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    written.map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        Error::FileWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{pe_image, MetadataBuilder};

    fn argument_aliases() -> Vec<u8> {
        let mut builder = MetadataBuilder::new();
        let context = builder.type_ref("Cake.Core", "ICakeContext");
        let method_alias =
            builder.attribute_ctor("Cake.Core.Annotations", "CakeMethodAliasAttribute");

        builder.type_def("Cake.Common", "ArgumentAliases", 0x0010_0181);
        let foo = builder.method(
            "Foo",
            &[0x00, 0x03, 0x02, 0x12, context.encoded(), 0x08, 0x1D, 0x0E],
            &[("context", 0), ("count", 0), ("tags", 0)],
        );
        builder.custom_attribute(foo, method_alias);

        pe_image(&builder.build())
    }

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output_path(), PathBuf::from("CakeFileIntellisense.cs"));
        assert_eq!(config.namespace, "Cake.IntellisenseGenerator");
        assert_eq!(config.class_name, "CakeFileIntellisense");
        assert_eq!(config.base_type, "CakeFile");
        assert!(config.emit_usings);

        let config = config.with_class_name("BuildScript").with_usings(false);
        assert_eq!(config.class_name, "BuildScript");
        assert_eq!(config.output_path(), PathBuf::from("BuildScript.cs"));
        assert!(!config.emit_usings);

        let config = config.with_output("out/Stubs.cs").with_class_name("Other");
        assert_eq!(config.output_path(), PathBuf::from("out/Stubs.cs"));
    }

    #[test]
    fn broken_assembly_next_to_a_valid_one() {
        let input = tempfile::tempdir().unwrap();
        fs::write(input.path().join("A.Broken.dll"), b"MZ but nothing else").unwrap();
        fs::write(input.path().join("Cake.Common.dll"), argument_aliases()).unwrap();

        let output = tempfile::tempdir().unwrap();
        let generator = IntellisenseGenerator::new(
            GeneratorConfig::default()
                .with_output(output.path().join("CakeFileIntellisense.cs"))
                .with_usings(false),
        );
        let report = generator.generate(input.path()).unwrap();

        assert_eq!(report.containers, 1);
        assert_eq!(report.aliases, 1);
        assert_eq!(report.skipped_modules.len(), 1);
        assert!(matches!(
            &report.skipped_modules[0],
            Error::ModuleLoad { module, .. } if module == "A.Broken.dll"
        ));

        let text = fs::read_to_string(&report.output_path).unwrap();
        assert!(text.contains("#region ArgumentAliases\n"));
        assert!(text.contains(
            "\t\tprotected bool Foo(int count, string[] tags) => throw new System.NotSupportedException();\n"
        ));
    }

    #[test]
    fn lists_dlls_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.dll", "A.DLL", "c.txt", "a.Dll.config"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.dll")).unwrap();

        let names: Vec<String> = list_assemblies(dir.path())
            .unwrap()
            .iter()
            .map(|path| module_name(path))
            .collect();
        assert_eq!(names, vec!["A.DLL", "b.dll"]);
    }

    #[test]
    fn missing_directory() {
        assert!(matches!(
            list_assemblies(Path::new("does/not/exist")),
            Err(Error::FileError(_))
        ));
    }

    #[test]
    fn atomic_write_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cs");
        fs::write(&path, "old").unwrap();

        write_atomically(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("out.cs.tmp").exists());
    }

    #[test]
    fn unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.cs");

        assert!(matches!(
            write_atomically(&path, b"text"),
            Err(Error::FileWrite { .. })
        ));
        assert!(!path.exists());
    }
}
