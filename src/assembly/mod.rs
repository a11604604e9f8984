//! Loading of .NET assemblies as alias scanner [`Module`]s.
//!
//! An [`Assembly`] keeps the raw image (or a bare metadata root) and decodes its type
//! definitions on demand: the `TypeDef`, `MethodDef` and `Param` tables give the shape of
//! every type, method signatures give parameter and return types, and the `CustomAttribute`
//! table is joined back to methods to find the alias markers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cake_intellisense::{Assembly, Module};
//! use std::path::Path;
//!
//! let assembly = Assembly::from_file(Path::new("tools/Cake/Cake.Common.dll"))?;
//! for ty in assembly.defined_types()?.iter().filter(|ty| ty.is_static()) {
//!     println!("{}.{} - {} methods", ty.namespace, ty.name, ty.methods.len());
//! }
//! # Ok::<(), cake_intellisense::Error>(())
//! ```

mod loader;
mod resolver;
mod view;

use std::path::Path;

use crate::{
    file::File,
    intellisense::{Module, TypeDefinition},
    metadata::cor20header::Cor20Header,
    Result,
};
use loader::TypeLoader;
use view::MetadataView;

enum Source {
    Image(File),
    Metadata(Vec<u8>),
}

/// A .NET assembly whose types can be enumerated.
pub struct Assembly {
    name: String,
    source: Source,
}

impl Assembly {
    /// Maps and validates the assembly at `path`.
    ///
    /// # Errors
    /// Fails if the file cannot be read, is not a .NET image, or its metadata root and table
    /// stream cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Assembly> {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        Self::load(name, Source::Image(File::from_file(path)?))
    }

    /// Loads an assembly image that is already in memory.
    ///
    /// # Errors
    /// Fails if `data` is not a .NET image or its metadata cannot be parsed.
    pub fn from_mem(name: impl Into<String>, data: Vec<u8>) -> Result<Assembly> {
        Self::load(name.into(), Source::Image(File::from_mem(data)?))
    }

    /// Loads a bare metadata root (starting with `BSJB`) without a surrounding PE image.
    ///
    /// # Errors
    /// Fails if the metadata root or its table stream cannot be parsed.
    pub fn from_metadata(name: impl Into<String>, metadata: Vec<u8>) -> Result<Assembly> {
        Self::load(name.into(), Source::Metadata(metadata))
    }

    fn load(name: String, source: Source) -> Result<Assembly> {
        let assembly = Assembly { name, source };
        MetadataView::new(assembly.metadata()?)?;

        log::debug!("Loaded assembly '{}'", assembly.name);
        Ok(assembly)
    }

    /// Display name, the file name for assemblies loaded from disk.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metadata root of this assembly.
    ///
    /// # Errors
    /// Fails if the CLI header or the metadata directory cannot be located in the image.
    pub fn metadata(&self) -> Result<&[u8]> {
        match &self.source {
            Source::Image(file) => {
                let (clr_rva, clr_size) = file.clr()?;
                let clr_offset = file.rva_to_offset(clr_rva)?;
                let header = Cor20Header::read(file.data_slice(clr_offset, clr_size)?)?;

                let metadata_offset = file.rva_to_offset(header.meta_data_rva as usize)?;
                file.data_slice(metadata_offset, header.meta_data_size as usize)
            }
            Source::Metadata(metadata) => Ok(metadata),
        }
    }

    /// Decodes every type defined in the assembly, in `TypeDef` order.
    ///
    /// # Errors
    /// Fails if a table row, heap entry or signature is malformed.
    pub fn types(&self) -> Result<Vec<TypeDefinition>> {
        let view = MetadataView::new(self.metadata()?)?;
        TypeLoader::new(&view)?.load()
    }
}

impl Module for Assembly {
    fn name(&self) -> &str {
        &self.name
    }

    fn defined_types(&self) -> Result<Vec<TypeDefinition>> {
        self.types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        intellisense::AttributeType,
        metadata::typesystem::{Primitive, RefKind, TypeDescriptor, TypeName},
        test::{pe_image, MetadataBuilder, TypeToken},
        Error,
    };

    #[test]
    fn not_an_image() {
        assert!(Assembly::from_mem("junk.dll", vec![0xCC; 256]).is_err());
        assert!(Assembly::from_metadata("junk", vec![0xCC; 256]).is_err());
        assert!(Assembly::from_file(Path::new("missing/Cake.Common.dll")).is_err());
    }

    #[test]
    fn pe_image_round_trip() {
        let mut builder = MetadataBuilder::new();
        builder.type_def("Cake.Common", "EnvironmentAliases", 0x0010_0181);
        builder.method("EnvironmentVariable", &[0x00, 0x02, 0x0E, 0x1C, 0x0E], &[
            ("context", 0),
            ("variable", 0),
        ]);
        let metadata = builder.build();

        let assembly = Assembly::from_mem("Cake.Common.dll", pe_image(&metadata)).unwrap();
        assert_eq!(assembly.name(), "Cake.Common.dll");
        assert_eq!(assembly.metadata().unwrap(), metadata.as_slice());

        let types = assembly.types().unwrap();
        assert_eq!(types[1].name, "EnvironmentAliases");
        assert_eq!(types[1].methods[0].parameters[1].name, "variable");
    }

    #[test]
    fn uncompressed_tables_are_not_supported() {
        let metadata = MetadataBuilder::new().uncompressed().build();
        assert!(matches!(
            Assembly::from_metadata("enc", metadata),
            Err(Error::NotSupported)
        ));
    }

    #[test]
    fn aliases_and_signatures() {
        let mut builder = MetadataBuilder::new();
        let context = builder.type_ref("Cake.Core", "ICakeContext");
        let method_alias = builder.attribute_ctor("Cake.Core.Annotations", "CakeMethodAliasAttribute");
        let property_alias =
            builder.attribute_ctor("Cake.Core.Annotations", "CakePropertyAliasAttribute");

        builder.type_def("Cake.Common", "ArgumentAliases", 0x0010_0181);
        let foo = builder.method(
            "Foo",
            &[
                0x00, 0x03, 0x02, // static, 3 params, bool
                0x12, context.encoded(),
                0x08, // int32
                0x1D, 0x0E, // string[]
            ],
            &[("context", 0), ("count", 0), ("tags", 0)],
        );
        builder.custom_attribute(foo, method_alias);

        let bar = builder.method(
            "Bar",
            &[0x10, 0x01, 0x02, 0x1E, 0x00, 0x12, context.encoded(), 0x1E, 0x00],
            &[("context", 0), ("value", 0)],
        );
        builder.generic_param(bar, 0, "T");
        builder.custom_attribute(bar, method_alias);

        let verbose = builder.method(
            "Verbose",
            &[0x00, 0x01, 0x02, 0x12, context.encoded()],
            &[("context", 0)],
        );
        builder.custom_attribute(verbose, property_alias);

        builder.method("Helper", &[0x00, 0x00, 0x01], &[]);

        let assembly = Assembly::from_metadata("Cake.Test.dll", builder.build()).unwrap();
        let types = assembly.defined_types().unwrap();

        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name, "<Module>");
        let aliases = &types[1];
        assert!(aliases.is_static());
        assert_eq!(aliases.namespace, "Cake.Common");
        assert_eq!(aliases.methods.len(), 4);

        let foo = &aliases.methods[0];
        assert_eq!(foo.name, "Foo");
        assert_eq!(
            foo.attributes,
            vec![AttributeType::new("Cake.Core.Annotations", "CakeMethodAliasAttribute")]
        );
        assert_eq!(foo.return_type, TypeDescriptor::Primitive(Primitive::Boolean));
        assert_eq!(foo.parameters[0].name, "context");
        assert_eq!(
            foo.parameters[0].ty,
            TypeDescriptor::Named(TypeName::new("Cake.Core", "ICakeContext"))
        );
        assert_eq!(foo.parameters[1].ty, TypeDescriptor::Primitive(Primitive::Int32));
        assert_eq!(
            foo.parameters[2].ty,
            TypeDescriptor::array(TypeDescriptor::Primitive(Primitive::String))
        );

        let bar = &aliases.methods[1];
        assert_eq!(bar.generic_parameters, vec!["T"]);
        assert_eq!(bar.return_type, TypeDescriptor::TypeParameter("T".to_string()));
        assert_eq!(bar.parameters[1].name, "value");

        let verbose = &aliases.methods[2];
        assert_eq!(
            verbose.attributes,
            vec![AttributeType::new("Cake.Core.Annotations", "CakePropertyAliasAttribute")]
        );

        assert!(aliases.methods[3].attributes.is_empty());
    }

    #[test]
    fn by_ref_parameters_and_missing_names() {
        let mut builder = MetadataBuilder::new();
        builder.type_def("Cake.Common", "RefAliases", 0x0000_0181);
        builder.method(
            "TryGet",
            &[0x00, 0x04, 0x02, 0x1C, 0x10, 0x08, 0x10, 0x0E, 0x10, 0x0D],
            &[("context", 0), ("value", 0x0002), ("name", 0x0001)],
        );

        let assembly = Assembly::from_metadata("Refs.dll", builder.build()).unwrap();
        let types = assembly.types().unwrap();
        let method = &types[1].methods[0];

        assert_eq!(
            method.parameters[1].ty,
            TypeDescriptor::ByRef(Box::new(TypeDescriptor::Primitive(Primitive::Int32)), RefKind::Out)
        );
        assert_eq!(
            method.parameters[2].ty,
            TypeDescriptor::ByRef(Box::new(TypeDescriptor::Primitive(Primitive::String)), RefKind::In)
        );
        // No Param row for the fourth parameter
        assert_eq!(method.parameters[3].name, "arg4");
        assert_eq!(
            method.parameters[3].ty,
            TypeDescriptor::ByRef(Box::new(TypeDescriptor::Primitive(Primitive::Double)), RefKind::Ref)
        );
    }

    #[test]
    fn generic_instances_and_nested_types() {
        let mut builder = MetadataBuilder::new();
        let list = builder.type_ref("System.Collections.Generic", "List`1");
        let outer = builder.type_ref("Cake.Core", "Outer");
        let inner = builder.nested_type_ref(outer, "Inner");
        let spec = builder.type_spec(&[0x15, 0x12, list.encoded(), 0x01, 0x12, inner.encoded()]);

        builder.type_def("Cake.Common", "Container", 0x0000_0181);
        builder.method(
            "Items",
            &[0x00, 0x01, 0x12, spec.encoded(), 0x12, TypeToken::type_def(3)],
            &[("context", 0)],
        );
        let settings = builder.type_def("", "Settings", 0x0000_0002);
        builder.nested_class(settings, 2);

        let assembly = Assembly::from_metadata("Nested.dll", builder.build()).unwrap();
        let types = assembly.types().unwrap();
        let method = &types[1].methods[0];

        assert_eq!(
            method.return_type,
            TypeDescriptor::Generic {
                definition: TypeName::new("System.Collections.Generic", "List`1"),
                arguments: vec![TypeDescriptor::Named(TypeName::nested(
                    TypeName::new("Cake.Core", "Outer"),
                    "Inner"
                ))],
            }
        );
        assert_eq!(
            method.parameters[0].ty,
            TypeDescriptor::Named(TypeName::nested(
                TypeName::new("Cake.Common", "Container"),
                "Settings"
            ))
        );

        // Nested types report the namespace of their outermost type
        assert_eq!(types[2].name, "Settings");
        assert_eq!(types[2].namespace, "Cake.Common");
    }

    #[test]
    fn attribute_defined_in_same_module() {
        let mut builder = MetadataBuilder::new();
        builder.type_def("Cake.Core.Annotations", "CakeMethodAliasAttribute", 0x0010_0001);
        let ctor = builder.method(".ctor", &[0x20, 0x00, 0x01], &[]);

        builder.type_def("Cake.Common", "LocalAliases", 0x0010_0181);
        let alias = builder.method("Local", &[0x00, 0x01, 0x01, 0x1C], &[("context", 0)]);
        builder.method_def_attribute(alias, ctor);

        let assembly = Assembly::from_metadata("Local.dll", builder.build()).unwrap();
        let types = assembly.types().unwrap();
        assert_eq!(
            types[2].methods[0].attributes,
            vec![AttributeType::new("Cake.Core.Annotations", "CakeMethodAliasAttribute")]
        );
    }
}
