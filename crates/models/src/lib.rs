//! Model library for facilities and their equipment.
//! Each submodule registers as one [`TwinModule`]; [`registry`] indexes all of them.
//!
//! ## Usage
//! ```rust,ignore
//! let registry = dtwin_models::registry()?;
//! assert!(registry.get_by_id("dtmi:dtwin:facility:Building;1").is_some());
//! ```

pub mod equipment;
pub mod facility;

use dtwin::{ModelRegistry, Twin, TwinError, TwinLink, TwinModule};

/// Spatial hierarchy: campus down to spaces and their climate component.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacilityModule;

impl TwinModule for FacilityModule {
    fn name(&self) -> &str {
        "facility"
    }

    fn twin_types(&self) -> Result<Vec<TwinLink>, TwinError> {
        Ok(vec![
            facility::Campus::descriptor,
            facility::Building::descriptor,
            facility::Floor::descriptor,
            facility::Space::descriptor,
            facility::Climate::descriptor,
        ])
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EquipmentModule;

impl TwinModule for EquipmentModule {
    fn name(&self) -> &str {
        "equipment"
    }

    fn twin_types(&self) -> Result<Vec<TwinLink>, TwinError> {
        Ok(vec![
            equipment::Asset::descriptor,
            equipment::Pump::descriptor,
            equipment::Thermostat::descriptor,
        ])
    }
}

/// Every module of this library.
pub fn modules() -> Vec<Box<dyn TwinModule>> {
    vec![Box::new(FacilityModule), Box::new(EquipmentModule)]
}

/// Registry over every model of this library.
pub fn registry() -> Result<ModelRegistry, TwinError> {
    let registry = ModelRegistry::builder().modules(modules()).build()?;
    tracing::debug!(types = registry.len(), "facility models registered");
    Ok(registry)
}
