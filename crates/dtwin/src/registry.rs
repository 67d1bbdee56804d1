//! The model registry: every known twin type indexed by model identifier.
//!
//! Built once from explicit registrations, read-only afterwards and shared as
//! `Arc<ModelRegistry>`.

use crate::descriptor::{Marker, TwinDescriptor, TwinLink, ValueType};
use crate::error::TwinError;
use crate::twin::Twin;
use fxhash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::any::TypeId;
use std::fmt;
use tracing::{debug, info, warn};

/// A model library's registration unit.
pub trait TwinModule: Send + Sync {
    fn name(&self) -> &str;

    /// Twin types contributed by the module.
    fn twin_types(&self) -> Result<Vec<TwinLink>, TwinError>;
}

/// A named relationship of a model and the type it points at.
#[derive(Debug, Clone)]
pub struct ModelRelationship {
    pub name: String,
    pub target: &'static TwinDescriptor,
    pub many: bool,
}

/// Relationship model of one registered type.
#[derive(Debug)]
pub struct TwinModel {
    pub descriptor: &'static TwinDescriptor,
    /// Relationships declared on the type itself.
    pub relationships: Vec<ModelRelationship>,
    /// Relationships declared on ancestors, nearest ancestor first; the first name wins.
    pub extending_relationships: Vec<ModelRelationship>,
    ancestors: Vec<&'static TwinDescriptor>,
}

impl TwinModel {
    pub fn relationship(&self, name: &str) -> Option<&ModelRelationship> {
        self.all_relationships().find(|r| r.name == name)
    }

    pub fn all_relationships(&self) -> impl Iterator<Item = &ModelRelationship> {
        self.relationships.iter().chain(self.extending_relationships.iter())
    }

    pub fn ancestors(&self) -> &[&'static TwinDescriptor] {
        &self.ancestors
    }
}

enum Registration {
    Type(TwinLink),
    Module(Box<dyn TwinModule>),
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(link) => f.debug_tuple("Type").field(&link().type_name).finish(),
            Self::Module(module) => f.debug_tuple("Module").field(&module.name()).finish(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registrations: Vec<Registration>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register<T: Twin>(self) -> Self {
        self.register_link(T::descriptor)
    }

    #[must_use]
    pub fn register_link(mut self, link: TwinLink) -> Self {
        self.registrations.push(Registration::Type(link));
        self
    }

    #[must_use]
    pub fn module(mut self, module: impl TwinModule + 'static) -> Self {
        self.registrations.push(Registration::Module(Box::new(module)));
        self
    }

    /// Registers multiple modules at once.
    #[must_use]
    pub fn modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TwinModule>>,
    {
        self.registrations.extend(modules.into_iter().map(Registration::Module));
        self
    }

    pub fn build(self) -> Result<ModelRegistry, TwinError> {
        let mut seen = FxHashSet::default();
        let mut types: Vec<(usize, &'static TwinDescriptor)> = Vec::new();

        for link in self.registrations.into_iter().flat_map(expand) {
            let descriptor = link();
            if descriptor.is_abstract {
                debug!(type_name = descriptor.type_name, "skipping abstract twin type");
                continue;
            }
            if seen.insert(descriptor.type_id) {
                types.push((descriptor.depth()?, descriptor));
            }
        }
        types.sort_by_key(|(depth, _)| *depth);

        let mut registry = ModelRegistry::default();
        for (_, descriptor) in types {
            let model_id = descriptor.full_model_id();
            if registry.by_id.contains_key(&model_id) {
                return Err(TwinError::duplicate_model_id(model_id));
            }
            let model = twin_model(descriptor)?;
            registry.by_id.insert(model_id, registry.models.len());
            registry.by_type.insert(descriptor.type_id, registry.models.len());
            registry.models.push(model);
        }

        info!(types = registry.models.len(), "model registry built");
        Ok(registry)
    }
}

/// Resolves a registration to its type links. A failing module contributes nothing.
fn expand(registration: Registration) -> Vec<TwinLink> {
    match registration {
        Registration::Type(link) => vec![link],
        Registration::Module(module) => match module.twin_types() {
            Ok(links) => {
                debug!(module = module.name(), types = links.len(), "loaded twin module");
                links
            },
            Err(err) => {
                warn!(module = module.name(), error = %err, "twin module failed; skipping");
                Vec::new()
            },
        },
    }
}

fn own_relationships(
    descriptor: &'static TwinDescriptor,
) -> Result<Vec<ModelRelationship>, TwinError> {
    Ok(descriptor
        .classification()?
        .relationships()
        .iter()
        .filter(|p| !p.member.inherited)
        .filter_map(|p| match p.member.value_type {
            ValueType::Twin { target, many } => {
                Some(ModelRelationship { name: p.wire_name.clone(), target: target(), many })
            },
            _ => None,
        })
        .collect())
}

fn twin_model(descriptor: &'static TwinDescriptor) -> Result<TwinModel, TwinError> {
    let relationships = own_relationships(descriptor)?;
    let ancestors = descriptor.ancestors()?;

    let mut names: FxHashSet<String> = FxHashSet::default();
    let mut extending_relationships = Vec::new();
    for ancestor in ancestors.iter().copied() {
        for relationship in own_relationships(ancestor)? {
            if names.insert(relationship.name.clone()) {
                extending_relationships.push(relationship);
            }
        }
    }

    Ok(TwinModel { descriptor, relationships, extending_relationships, ancestors })
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<TwinModel>,
    by_id: FxHashMap<String, usize>,
    by_type: FxHashMap<TypeId, usize>,
}

impl ModelRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every indexed type, ancestors before descendants.
    pub fn all(&self) -> impl Iterator<Item = &'static TwinDescriptor> + '_ {
        self.models.iter().map(|m| m.descriptor)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn contains(&self, descriptor: &TwinDescriptor) -> bool {
        self.by_type.contains_key(&descriptor.type_id)
    }

    /// Looks a type up by its full model identifier (`dtmi:...;1`).
    pub fn get_by_id(&self, model_id: &str) -> Option<&'static TwinDescriptor> {
        self.by_id.get(model_id).map(|&index| self.models[index].descriptor)
    }

    pub fn twin_model(&self, descriptor: &TwinDescriptor) -> Result<&TwinModel, TwinError> {
        self.by_type
            .get(&descriptor.type_id)
            .map(|&index| &self.models[index])
            .ok_or_else(|| TwinError::unregistered_type(descriptor.type_name))
    }

    pub fn twin_model_of<T: Twin>(&self) -> Result<&TwinModel, TwinError> {
        self.twin_model(T::descriptor())
    }

    /// Indexed types that have `descriptor` as an ancestor.
    pub fn derived_types(&self, descriptor: &TwinDescriptor) -> Vec<&'static TwinDescriptor> {
        self.models
            .iter()
            .filter(|m| m.ancestors.iter().any(|a| a.type_id == descriptor.type_id))
            .map(|m| m.descriptor)
            .collect()
    }

    /// Indexed types that reach `descriptor` through their components and relationships.
    pub fn related_types(&self, descriptor: &TwinDescriptor) -> Vec<&'static TwinDescriptor> {
        self.models
            .iter()
            .filter(|m| m.descriptor.type_id != descriptor.type_id)
            .filter(|m| reachable(m.descriptor).contains(&descriptor.type_id))
            .map(|m| m.descriptor)
            .collect()
    }

    /// Derived types followed by related types.
    pub fn dependent_types(&self, descriptor: &TwinDescriptor) -> Vec<&'static TwinDescriptor> {
        let mut types = self.derived_types(descriptor);
        types.extend(self.related_types(descriptor));
        types
    }

    /// Resolves the type named by `$metadata.$model` of a twin document.
    pub fn type_from_json(&self, document: &Value) -> Result<&'static TwinDescriptor, TwinError> {
        let model_id = document
            .pointer("/$metadata/$model")
            .and_then(Value::as_str)
            .ok_or_else(|| TwinError::coercion("document has no $metadata.$model"))?;
        self.get_by_id(model_id).ok_or_else(|| TwinError::unregistered_type(model_id.to_owned()))
    }
}

/// Types reachable from `descriptor` through components and relationships declared on
/// each visited type itself, depth first.
fn reachable(descriptor: &'static TwinDescriptor) -> FxHashSet<TypeId> {
    let mut visited = FxHashSet::default();
    let mut stack = vec![descriptor];

    while let Some(current) = stack.pop() {
        for member in current.own_members() {
            if !matches!(member.marker, Marker::Component | Marker::Relationship) {
                continue;
            }
            let Some(target) = member.value_type.twin_target() else { continue };
            if target.type_id == current.type_id {
                continue;
            }
            if visited.insert(target.type_id) {
                stack.push(target);
            }
        }
    }

    visited
}
