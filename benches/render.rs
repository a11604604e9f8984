//! Benchmarks for signature decoding and stub rendering.
//!
//! - Method signature parsing for typical alias shapes
//! - Rendering of nested generic types
//! - Emitting a complete file for a large alias catalog

extern crate cake_intellisense;

use cake_intellisense::{
    intellisense::{
        emitter::{EmitterOptions, StubEmitter},
        render::render_type,
        AliasKind, AliasMember, ContainerAliases, ContainerType, Parameter,
    },
    metadata::{
        signatures::parse_method_signature,
        typesystem::{Primitive, TypeDescriptor, TypeName},
    },
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn context() -> Parameter {
    Parameter::new(
        "context",
        TypeDescriptor::Named(TypeName::new("Cake.Core", "ICakeContext")),
    )
}

fn dictionary_of_lists() -> TypeDescriptor {
    TypeDescriptor::Generic {
        definition: TypeName::new("System.Collections.Generic", "Dictionary`2"),
        arguments: vec![
            TypeDescriptor::Primitive(Primitive::String),
            TypeDescriptor::Generic {
                definition: TypeName::new("System.Collections.Generic", "List`1"),
                arguments: vec![TypeDescriptor::Named(TypeName::new(
                    "Cake.Core.IO",
                    "FilePath",
                ))],
            },
        ],
    }
}

/// Signature: bool Alias(ICakeContext context, int count, string[] tags)
fn bench_parse_alias_signature(c: &mut Criterion) {
    let signature = [0x00, 0x03, 0x02, 0x12, 0x05, 0x08, 0x1D, 0x0E];

    c.bench_function("parse_alias_signature", |b| {
        b.iter(|| {
            let sig = parse_method_signature(black_box(&signature)).unwrap();
            black_box(sig)
        });
    });
}

/// Dictionary<string, List<FilePath>>
fn bench_render_nested_generic(c: &mut Criterion) {
    let ty = dictionary_of_lists();

    c.bench_function("render_nested_generic", |b| {
        b.iter(|| black_box(render_type(black_box(&ty))));
    });
}

/// 100 containers with 20 aliases each
fn bench_emit_catalog(c: &mut Criterion) {
    let catalog: Vec<ContainerAliases> = (0..100)
        .map(|container| ContainerAliases {
            container: ContainerType {
                namespace: "Cake.Common".to_string(),
                name: format!("Aliases{container}"),
            },
            aliases: (0..20)
                .map(|alias| AliasMember {
                    name: format!("Alias{alias}"),
                    kind: if alias % 5 == 0 {
                        AliasKind::Property
                    } else {
                        AliasKind::Callable
                    },
                    parameters: vec![
                        context(),
                        Parameter::new("settings", dictionary_of_lists()),
                        Parameter::new(
                            "tags",
                            TypeDescriptor::array(TypeDescriptor::Primitive(Primitive::String)),
                        ),
                    ],
                    return_type: TypeDescriptor::Primitive(Primitive::Boolean),
                    generic_parameters: Vec::new(),
                })
                .collect(),
        })
        .collect();

    let options = EmitterOptions {
        namespace: "Cake.IntellisenseGenerator".to_string(),
        class_name: "CakeFileIntellisense".to_string(),
        base_type: "CakeFile".to_string(),
        emit_usings: true,
    };

    c.bench_function("emit_catalog_2000_aliases", |b| {
        b.iter(|| black_box(StubEmitter::new(&options).emit(black_box(&catalog))));
    });
}

criterion_group!(
    benches,
    bench_parse_alias_signature,
    bench_render_nested_generic,
    bench_emit_catalog
);
criterion_main!(benches);
