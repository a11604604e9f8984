//! Assembly of the generated C# file.

use std::collections::BTreeSet;

use crate::intellisense::{
    render::{collect_namespaces, render_generic_marker, render_parameters},
    AliasKind, AliasMember, ContainerAliases,
};

const AUTO_GENERATED_BANNER: &[&str] = &[
    "//------------------------------------------------------------------------------",
    "// <auto-generated>",
    "//     This code was generated by a tool.",
    "//",
    "//     Changes to this file may cause incorrect behavior and will be lost if",
    "//     the code is regenerated. ",
    "// </auto-generated>",
    "//------------------------------------------------------------------------------",
];

const THROW_NOT_SUPPORTED: &str = " => throw new System.NotSupportedException();";

/// Layout of the companion class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Namespace of the companion class
    pub namespace: String,
    /// Name of the companion class
    pub class_name: String,
    /// Base class the companion class derives from
    pub base_type: String,
    /// Emit `using` directives for every referenced namespace
    pub emit_usings: bool,
}

/// Builds the generated source in memory.
pub struct StubEmitter<'a> {
    options: &'a EmitterOptions,
    buffer: String,
}

impl<'a> StubEmitter<'a> {
    /// Creates an emitter with an empty buffer.
    #[must_use]
    pub fn new(options: &'a EmitterOptions) -> Self {
        StubEmitter {
            options,
            buffer: String::new(),
        }
    }

    /// Renders the complete file for `catalog`.
    #[must_use]
    pub fn emit(mut self, catalog: &[ContainerAliases]) -> String {
        for line in AUTO_GENERATED_BANNER {
            self.line(line);
        }
        self.line("");

        if self.options.emit_usings {
            let namespaces = referenced_namespaces(catalog);
            if !namespaces.is_empty() {
                for namespace in &namespaces {
                    self.line(&format!("using {namespace};"));
                }
                self.line("");
            }
        }

        self.line(&format!("namespace {}", self.options.namespace));
        self.line("{");
        self.line(&format!(
            "\tpublic abstract partial class {} : {}",
            self.options.class_name, self.options.base_type
        ));
        self.line("\t{");

        for entry in catalog {
            self.line(&format!("#region {}", entry.container.name));
            for alias in &entry.aliases {
                let declaration = render_alias(alias);
                self.line(&declaration);
            }
            self.line("#endregion");
        }

        self.line("\t}");
        self.line("}");

        self.buffer
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

/// Renders the declaration line of one alias, indentation included.
#[must_use]
pub fn render_alias(alias: &AliasMember) -> String {
    match alias.kind {
        AliasKind::Callable => format!(
            "\t\tprotected {} {}{}({}){}",
            alias.return_type,
            alias.name,
            render_generic_marker(&alias.generic_parameters),
            render_parameters(alias.visible_parameters()),
            THROW_NOT_SUPPORTED
        ),
        AliasKind::Property => format!(
            "\t\tprotected {} {}{}",
            alias.return_type, alias.name, THROW_NOT_SUPPORTED
        ),
    }
}

/// Sorted namespaces of every type that appears in a rendered declaration.
#[must_use]
pub fn referenced_namespaces(catalog: &[ContainerAliases]) -> BTreeSet<String> {
    let mut namespaces = BTreeSet::new();
    for alias in catalog.iter().flat_map(|entry| &entry.aliases) {
        collect_namespaces(&alias.return_type, &mut namespaces);
        if alias.kind == AliasKind::Callable {
            for parameter in alias.visible_parameters() {
                collect_namespaces(&parameter.ty, &mut namespaces);
            }
        }
    }
    namespaces
}
