//! Mapping engine between typed digital twin models and the platform's JSON wire format.
//! Keep the public surface small: types declare their metadata with `#[derive(DigitalTwin)]`,
//! the registry indexes them once, and the serializer and graph helpers do the rest.
//!
//! ## Declaring and converting a twin
//! ```rust,ignore
//! use dtwin::prelude::*;
//!
//! #[derive(Debug, DigitalTwin)]
//! #[twin(model_id = "dtmi:example:Sensor")]
//! struct Sensor {
//!     #[twin(base)]
//!     base: TwinBase,
//!     #[twin(property)]
//!     quantity: i32,
//! }
//!
//! let registry = Arc::new(ModelRegistry::builder().register::<Sensor>().build()?);
//! let serializer = TwinSerializer::new(registry);
//! let json = serializer.serialize(&sensor)?;
//! let back: Sensor = serializer.deserialize(&json)?;
//! ```

extern crate self as dtwin;

pub mod classify;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod registry;
pub mod schema;
pub mod twin;
pub mod types;
pub mod wire;

pub use classify::{Category, Classification, Property};
pub use config::EngineConfig;
pub use convert::TwinSerializer;
pub use descriptor::{
    EnumDescriptor, EnumMember, Marker, MemberDescriptor, ObjectField, ScalarKind,
    TwinDescriptor, TwinLink, ValueType,
};
pub use dtwin_derive::{DigitalTwin, twin_enum, twin_object};
pub use error::{TwinError, TwinErrorExt};
pub use registry::{ModelRegistry, ModelRelationship, RegistryBuilder, TwinModel, TwinModule};
pub use schema::{Content, Interface, Schema};
pub use twin::{ComponentField, DynTwin, MemberAccess, RelationshipField, Twin, TwinHooks, TwinRef};
pub use types::{BasicDigitalTwin, ETag, Relationship, TwinBase, TwinMetadata};
pub use wire::WireValue;

pub use serde;
pub use serde_json;

pub mod prelude {
    pub use crate::{
        DigitalTwin, DynTwin, ETag, ModelRegistry, Twin, TwinBase, TwinError, TwinErrorExt,
        TwinHooks, TwinSerializer, twin_enum, twin_object,
    };
    pub use std::sync::Arc;
}

/// Items referenced by macro-generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::convert::{component_from_value, component_to_value};
    pub use crate::descriptor::default_model_id;
    pub use crate::twin::blank_of;
    pub use crate::wire::{enum_discriminant, object_from_value, object_to_value};
}
