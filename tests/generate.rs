use std::fs;

use cake_intellisense::prelude::*;

struct FixedModule {
    name: &'static str,
    types: Vec<TypeDefinition>,
}

impl Module for FixedModule {
    fn name(&self) -> &str {
        self.name
    }

    fn defined_types(&self) -> Result<Vec<TypeDefinition>> {
        Ok(self.types.clone())
    }
}

struct BrokenModule;

impl Module for BrokenModule {
    fn name(&self) -> &str {
        "Broken.dll"
    }

    fn defined_types(&self) -> Result<Vec<TypeDefinition>> {
        Err(Error::NotSupported)
    }
}

fn attribute(name: &str) -> AttributeType {
    AttributeType::new("Cake.Core.Annotations", name)
}

fn context() -> Parameter {
    Parameter::new(
        "context",
        TypeDescriptor::Named(TypeName::new("Cake.Core", "ICakeContext")),
    )
}

fn alias(
    name: &str,
    marker: &str,
    extra: Vec<Parameter>,
    return_type: TypeDescriptor,
    generic_parameters: Vec<&str>,
) -> MethodDefinition {
    let mut parameters = vec![context()];
    parameters.extend(extra);

    MethodDefinition {
        name: name.to_string(),
        attributes: vec![attribute(marker)],
        parameters,
        return_type,
        generic_parameters: generic_parameters.into_iter().map(String::from).collect(),
    }
}

fn static_class(name: &str, methods: Vec<MethodDefinition>) -> TypeDefinition {
    TypeDefinition {
        namespace: "Cake.Common".to_string(),
        name: name.to_string(),
        flags: TypeAttributes::ABSTRACT | TypeAttributes::SEALED,
        methods,
    }
}

fn cake_common() -> FixedModule {
    let foo = alias(
        "Foo",
        "CakeMethodAliasAttribute",
        vec![
            Parameter::new("count", TypeDescriptor::Primitive(Primitive::Int32)),
            Parameter::new(
                "tags",
                TypeDescriptor::array(TypeDescriptor::Primitive(Primitive::String)),
            ),
        ],
        TypeDescriptor::Primitive(Primitive::Boolean),
        vec![],
    );
    let bar = alias(
        "Bar",
        "CakeMethodAliasAttribute",
        vec![Parameter::new(
            "value",
            TypeDescriptor::TypeParameter("T".to_string()),
        )],
        TypeDescriptor::TypeParameter("T".to_string()),
        vec!["T"],
    );
    let verbose = alias(
        "Verbose",
        "CakePropertyAliasAttribute",
        vec![],
        TypeDescriptor::Primitive(Primitive::Boolean),
        vec![],
    );

    let mut helper = alias(
        "Helper",
        "CakeMethodAliasAttribute",
        vec![],
        TypeDescriptor::void(),
        vec![],
    );
    helper.attributes.clear();

    FixedModule {
        name: "Cake.Common.dll",
        types: vec![
            static_class("ArgumentAliases", vec![foo, bar, verbose]),
            static_class("InternalHelpers", vec![helper]),
        ],
    }
}

fn config(dir: &tempfile::TempDir) -> GeneratorConfig {
    GeneratorConfig::default()
        .with_output(dir.path().join("CakeFileIntellisense.cs"))
        .with_usings(false)
}

#[test]
fn renders_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(config(&dir));

    let modules: Vec<Box<dyn Module>> = vec![Box::new(cake_common())];
    let report = generator.generate_from_modules(&modules).unwrap();

    assert_eq!(report.containers, 1);
    assert_eq!(report.aliases, 3);
    assert!(report.skipped_modules.is_empty());

    let text = fs::read_to_string(&report.output_path).unwrap();
    assert!(text.contains(
        "\t\tprotected bool Foo(int count, string[] tags) => throw new System.NotSupportedException();\n"
    ));
    assert!(text.contains(
        "\t\tprotected T Bar<T>(T value) => throw new System.NotSupportedException();\n"
    ));
    assert!(text.contains(
        "\t\tprotected bool Verbose => throw new System.NotSupportedException();\n"
    ));
    assert!(text.contains("#region ArgumentAliases\n"));
    // A static class without aliases gets no section
    assert!(!text.contains("InternalHelpers"));
    assert!(text.contains("namespace Cake.IntellisenseGenerator\n{\n"));
    assert!(text.contains("\tpublic abstract partial class CakeFileIntellisense : CakeFile\n"));
}

#[test]
fn identical_inputs_give_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(config(&dir).with_usings(true));

    let modules: Vec<Box<dyn Module>> = vec![Box::new(cake_common())];
    let first = generator.generate_from_modules(&modules).unwrap();
    let first = fs::read(&first.output_path).unwrap();

    let second = generator.generate_from_modules(&modules).unwrap();
    let second = fs::read(&second.output_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn failing_module_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(config(&dir));

    let modules: Vec<Box<dyn Module>> = vec![Box::new(BrokenModule), Box::new(cake_common())];
    let report = generator.generate_from_modules(&modules).unwrap();

    assert_eq!(report.aliases, 3);
    assert_eq!(report.skipped_modules.len(), 1);
    assert!(matches!(
        &report.skipped_modules[0],
        Error::ModuleLoad { module, .. } if module == "Broken.dll"
    ));
}

#[test]
fn unknown_alias_marker_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(config(&dir));

    let module = FixedModule {
        name: "Cake.Custom.dll",
        types: vec![static_class(
            "CustomAliases",
            vec![alias(
                "Fancy",
                "CakeFancyAliasAttribute",
                vec![],
                TypeDescriptor::void(),
                vec![],
            )],
        )],
    };
    let modules: Vec<Box<dyn Module>> = vec![Box::new(module)];
    let report = generator.generate_from_modules(&modules).unwrap();

    assert_eq!(report.containers, 0);
    assert_eq!(report.skipped_members.len(), 1);
    assert!(matches!(
        report.skipped_members[0],
        Error::UnsupportedAliasShape { .. }
    ));
}

#[test]
fn directory_with_unreadable_assembly() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("NotAnAssembly.dll"), b"definitely not a PE image").unwrap();
    fs::write(input.path().join("readme.txt"), b"ignored").unwrap();

    let output = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(config(&output));
    let report = generator.generate(input.path()).unwrap();

    assert_eq!(report.containers, 0);
    assert_eq!(report.skipped_modules.len(), 1);
    assert!(matches!(
        &report.skipped_modules[0],
        Error::ModuleLoad { module, .. } if module == "NotAnAssembly.dll"
    ));

    let text = fs::read_to_string(&report.output_path).unwrap();
    assert!(text.starts_with("//------"));
    assert!(!text.contains("#region"));
}

#[test]
fn unwritable_output_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let generator = IntellisenseGenerator::new(
        GeneratorConfig::default().with_output(dir.path().join("missing").join("out.cs")),
    );

    let modules: Vec<Box<dyn Module>> = vec![Box::new(cake_common())];
    assert!(matches!(
        generator.generate_from_modules(&modules),
        Err(Error::FileWrite { .. })
    ));
}
