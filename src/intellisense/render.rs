//! C# text for type descriptors and parameters.
//!
//! Rendering is a pure function of the descriptor: primitives use their keyword, named types
//! their simple name without the arity suffix, nested types are joined with `.`, and generic
//! arguments are handed out to the segments of a nested name according to how many
//! parameters each segment declares.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt::{self, Write},
};

use crate::{
    intellisense::Parameter,
    metadata::typesystem::{TypeDescriptor, TypeName},
};

/// Reserved C# keywords that need an `@` prefix when used as identifiers.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self)
    }
}

/// Renders `ty` as C# source text.
#[must_use]
pub fn render_type(ty: &TypeDescriptor) -> String {
    ty.to_string()
}

/// Writes the C# spelling of `ty` into `out`.
///
/// # Errors
/// Only fails if `out` does.
pub fn write_type<W: Write>(out: &mut W, ty: &TypeDescriptor) -> fmt::Result {
    match ty {
        TypeDescriptor::Primitive(primitive) => out.write_str(primitive.keyword()),
        TypeDescriptor::Named(name) => match name.as_primitive() {
            Some(primitive) => out.write_str(primitive.keyword()),
            None => write_type_name(out, name, &[]),
        },
        TypeDescriptor::Generic {
            definition,
            arguments,
        } => write_type_name(out, definition, arguments),
        TypeDescriptor::Array { element, rank } => {
            write_type(out, element)?;
            out.write_char('[')?;
            for _ in 1..(*rank).max(1) {
                out.write_char(',')?;
            }
            out.write_char(']')
        }
        TypeDescriptor::Pointer(inner) => {
            write_type(out, inner)?;
            out.write_char('*')
        }
        TypeDescriptor::ByRef(inner, kind) => {
            out.write_str(kind.keyword())?;
            out.write_char(' ')?;
            write_type(out, inner)
        }
        TypeDescriptor::TypeParameter(name) => out.write_str(name),
    }
}

/// Writes `Outer<A>.Inner<B>`, giving each segment as many arguments as its arity suffix
/// declares. Arguments left over (a name without arity suffixes) go to the innermost segment.
fn write_type_name<W: Write>(
    out: &mut W,
    name: &TypeName,
    arguments: &[TypeDescriptor],
) -> fmt::Result {
    let segments = name.segments();
    let mut remaining = arguments;

    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            out.write_char('.')?;
        }
        out.write_str(segment.simple_name())?;

        let take = if index + 1 == segments.len() {
            remaining.len()
        } else {
            segment.arity().min(remaining.len())
        };

        let (own, rest) = remaining.split_at(take);
        remaining = rest;
        if own.is_empty() {
            continue;
        }

        out.write_char('<')?;
        for (position, argument) in own.iter().enumerate() {
            if position > 0 {
                out.write_str(", ")?;
            }
            write_type(out, argument)?;
        }
        out.write_char('>')?;
    }

    Ok(())
}

/// Prefixes reserved words with `@` so they stay valid identifiers.
#[must_use]
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if CSHARP_KEYWORDS.binary_search(&name).is_ok() {
        Cow::Owned(format!("@{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Renders `<modifier?> <type> <identifier>`.
#[must_use]
pub fn render_parameter(parameter: &Parameter) -> String {
    format!("{} {}", parameter.ty, escape_identifier(&parameter.name))
}

/// Renders a comma separated parameter list, without parentheses.
#[must_use]
pub fn render_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(render_parameter)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the generic parameter list that follows a method name, empty for non-generic
/// methods.
#[must_use]
pub fn render_generic_marker(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!("<{}>", names.join(", "))
    }
}

/// Adds the namespace of every named type referenced by `ty` to `namespaces`.
pub fn collect_namespaces(ty: &TypeDescriptor, namespaces: &mut BTreeSet<String>) {
    match ty {
        TypeDescriptor::Primitive(primitive) => {
            if !primitive.is_keyword() {
                namespaces.insert("System".to_string());
            }
        }
        TypeDescriptor::Named(name) => {
            if name.as_primitive().is_none() {
                insert_namespace(name, namespaces);
            }
        }
        TypeDescriptor::Generic {
            definition,
            arguments,
        } => {
            insert_namespace(definition, namespaces);
            for argument in arguments {
                collect_namespaces(argument, namespaces);
            }
        }
        TypeDescriptor::Array { element: inner, .. }
        | TypeDescriptor::Pointer(inner)
        | TypeDescriptor::ByRef(inner, _) => collect_namespaces(inner, namespaces),
        TypeDescriptor::TypeParameter(_) => {}
    }
}

fn insert_namespace(name: &TypeName, namespaces: &mut BTreeSet<String>) {
    let namespace = name.root_namespace();
    if !namespace.is_empty() {
        namespaces.insert(namespace.to_string());
    }
}
