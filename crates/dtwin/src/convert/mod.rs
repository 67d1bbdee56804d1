//! Conversion between twin instances and their wire documents.

mod read;
mod write;

use crate::classify::DEFAULT_EXCLUSIONS;
use crate::config::EngineConfig;
use crate::descriptor::TwinDescriptor;
use crate::error::TwinError;
use crate::registry::ModelRegistry;
use crate::schema::Interface;
use crate::twin::{DynTwin, Twin};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub(crate) use read::read_twin;
pub(crate) use write::{Mode, write_twin};

/// Serializes twins to wire JSON, reads them back and renders model documents.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct TwinSerializer {
    registry: Arc<ModelRegistry>,
    config: EngineConfig,
}

impl TwinSerializer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<ModelRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Wire document as a JSON value: reserved, then normal, then component keys.
    pub fn to_value(&self, twin: &dyn DynTwin) -> Result<Value, TwinError> {
        write_twin(twin, &self.config.reserved_exclusions, Mode::Twin).map(Value::Object)
    }

    pub fn serialize(&self, twin: &dyn DynTwin) -> Result<String, TwinError> {
        debug!(type_name = twin.twin_type().type_name, id = twin.id(), "serializing twin");
        let document = self.to_value(twin)?;
        self.render(&document)
    }

    pub fn deserialize<T: Twin>(&self, json: &str) -> Result<T, TwinError> {
        self.deserialize_as(T::descriptor(), json)?.downcast::<T>()
    }

    pub fn from_value<T: Twin>(&self, document: Value) -> Result<T, TwinError> {
        read_twin(T::descriptor(), document)?.downcast::<T>()
    }

    pub fn deserialize_as(
        &self,
        descriptor: &'static TwinDescriptor,
        json: &str,
    ) -> Result<Box<dyn DynTwin>, TwinError> {
        debug!(type_name = descriptor.type_name, "deserializing twin");
        let document: Value = serde_json::from_str(json)?;
        read_twin(descriptor, document)
    }

    /// Reads a document whose type is named by `$metadata.$model`.
    pub fn deserialize_any(&self, json: &str) -> Result<Box<dyn DynTwin>, TwinError> {
        let document: Value = serde_json::from_str(json)?;
        let descriptor = self.registry.type_from_json(&document)?;
        debug!(type_name = descriptor.type_name, "deserializing twin by model id");
        read_twin(descriptor, document)
    }

    /// DTDL interface document of a type.
    pub fn serialize_model(&self, descriptor: &'static TwinDescriptor) -> Result<String, TwinError> {
        let interface = Interface::from_descriptor(descriptor)?;
        self.render(&interface)
    }

    pub fn serialize_model_of<T: Twin>(&self) -> Result<String, TwinError> {
        self.serialize_model(T::descriptor())
    }

    fn render<S: Serialize>(&self, document: &S) -> Result<String, TwinError> {
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(rendered)
    }
}

/// Inline form of a twin used as a member value.
pub fn component_to_value(twin: &dyn DynTwin) -> Result<Value, TwinError> {
    write_twin(twin, &DEFAULT_EXCLUSIONS, Mode::Component).map(Value::Object)
}

pub fn component_from_value<T: Twin>(value: Value) -> Result<T, TwinError> {
    read_twin(T::descriptor(), value)?.downcast::<T>()
}
