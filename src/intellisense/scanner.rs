//! Discovery of alias members.
//!
//! Only static classes are containers, and only methods carrying one of the configured marker
//! attributes are aliases. Order is preserved throughout: modules as given, types in metadata
//! order, methods in declaration order.

use crate::{
    intellisense::{
        AliasKind, AliasMember, AttributeType, ContainerAliases, ContainerType, MethodDefinition,
        Module, TypeDefinition,
    },
    Error,
};

/// The attribute types that mark alias members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasMarkers {
    /// Namespace all markers live in
    pub namespace: String,
    /// Marker of callable aliases
    pub method: String,
    /// Marker of property aliases
    pub property: String,
    /// Name suffix shared by every marker of the alias family
    pub family_suffix: String,
}

impl Default for AliasMarkers {
    fn default() -> Self {
        AliasMarkers {
            namespace: "Cake.Core.Annotations".to_string(),
            method: "CakeMethodAliasAttribute".to_string(),
            property: "CakePropertyAliasAttribute".to_string(),
            family_suffix: "AliasAttribute".to_string(),
        }
    }
}

/// What a single attribute means to the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerMatch {
    /// A recognised alias marker
    Alias(AliasKind),
    /// A marker of the alias family that is neither callable nor property
    Unsupported,
    /// Any other attribute
    Unrelated,
}

impl AliasMarkers {
    /// Classifies `attribute`.
    #[must_use]
    pub fn classify(&self, attribute: &AttributeType) -> MarkerMatch {
        if attribute.namespace != self.namespace {
            return MarkerMatch::Unrelated;
        }

        if attribute.name == self.method {
            MarkerMatch::Alias(AliasKind::Callable)
        } else if attribute.name == self.property {
            MarkerMatch::Alias(AliasKind::Property)
        } else if attribute.name.ends_with(&self.family_suffix) {
            MarkerMatch::Unsupported
        } else {
            MarkerMatch::Unrelated
        }
    }
}

/// Result of scanning a set of modules.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Containers with at least one alias, in scan order
    pub catalog: Vec<ContainerAliases>,
    /// One [`Error::ModuleLoad`] per module that could not be introspected
    pub module_failures: Vec<Error>,
    /// One [`Error::UnsupportedAliasShape`] per skipped member
    pub skipped_members: Vec<Error>,
}

impl ScanOutcome {
    /// Total number of aliases across all containers.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.catalog.iter().map(|entry| entry.aliases.len()).sum()
    }
}

/// Walks modules for alias members.
pub struct AliasScanner {
    markers: AliasMarkers,
}

impl AliasScanner {
    /// Creates a scanner that recognises `markers`.
    #[must_use]
    pub fn new(markers: AliasMarkers) -> Self {
        AliasScanner { markers }
    }

    /// Scans every module in order.
    ///
    /// A module whose types cannot be read is recorded in
    /// [`ScanOutcome::module_failures`] and the scan continues with the next one.
    #[must_use]
    pub fn scan(&self, modules: &[Box<dyn Module>]) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for module in modules {
            let types = match module.defined_types() {
                Ok(types) => types,
                Err(error) => {
                    log::warn!("Skipping module '{}' - {}", module.name(), error);
                    outcome.module_failures.push(Error::ModuleLoad {
                        module: module.name().to_string(),
                        source: Box::new(error),
                    });
                    continue;
                }
            };

            log::debug!("Scanning {} types of '{}'", types.len(), module.name());
            for ty in types.iter().filter(|ty| ty.is_static()) {
                if let Some(entry) = self.scan_type(ty, &mut outcome.skipped_members) {
                    outcome.catalog.push(entry);
                }
            }
        }

        outcome
    }

    /// Collects the aliases of one static type, `None` if it has none.
    fn scan_type(&self, ty: &TypeDefinition, skipped: &mut Vec<Error>) -> Option<ContainerAliases> {
        let container = ContainerType {
            namespace: ty.namespace.clone(),
            name: ty.name.clone(),
        };

        let mut aliases = Vec::new();
        for method in &ty.methods {
            match self.alias_kind(method) {
                MarkerMatch::Alias(kind) => aliases.push(AliasMember {
                    name: method.name.clone(),
                    kind,
                    parameters: method.parameters.clone(),
                    return_type: method.return_type.clone(),
                    generic_parameters: method.generic_parameters.clone(),
                }),
                MarkerMatch::Unsupported => {
                    let marker = method
                        .attributes
                        .iter()
                        .find(|attribute| {
                            self.markers.classify(attribute) == MarkerMatch::Unsupported
                        })
                        .map(|attribute| attribute.name.clone())
                        .unwrap_or_default();

                    log::warn!(
                        "Skipping {}.{} - unsupported alias marker '{}'",
                        ty.name,
                        method.name,
                        marker
                    );
                    skipped.push(Error::UnsupportedAliasShape {
                        container: ty.name.clone(),
                        member: method.name.clone(),
                        marker,
                    });
                }
                MarkerMatch::Unrelated => {}
            }
        }

        if aliases.is_empty() {
            return None;
        }

        log::debug!("Found {} aliases in {}", aliases.len(), ty.name);
        Some(ContainerAliases { container, aliases })
    }

    /// A recognised marker wins over an unsupported one.
    fn alias_kind(&self, method: &MethodDefinition) -> MarkerMatch {
        let mut result = MarkerMatch::Unrelated;
        for attribute in &method.attributes {
            match self.markers.classify(attribute) {
                found @ MarkerMatch::Alias(_) => return found,
                MarkerMatch::Unsupported => result = MarkerMatch::Unsupported,
                MarkerMatch::Unrelated => {}
            }
        }
        result
    }
}
