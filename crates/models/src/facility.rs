//! Spatial models: campus, building, floor and space.

use crate::equipment::Thermostat;
use dtwin::prelude::*;

#[twin_enum]
#[derive(Default)]
pub enum OccupancyState {
    #[default]
    Unknown,
    Vacant,
    Occupied,
}

#[twin_object]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:facility:Campus", display_name = "Campus")]
pub struct Campus {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub name: Option<String>,
    #[twin(property)]
    pub address: Option<Address>,
    #[twin(relationship, name = "hasBuilding", min = 1, max = 50)]
    pub buildings: Vec<Arc<Building>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:facility:Building", display_name = "Building")]
pub struct Building {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub name: Option<String>,
    #[twin(property)]
    pub year_built: Option<i32>,
    #[twin(property)]
    pub gross_area: Option<f64>,
    #[twin(relationship, name = "hasFloor")]
    pub floors: Vec<Arc<Floor>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:facility:Floor", display_name = "Floor")]
pub struct Floor {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub level: i32,
    #[twin(relationship, name = "hasSpace")]
    pub spaces: Vec<Arc<Space>>,
}

/// Indoor conditions of a space, inlined into the space document.
#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:facility:Climate", display_name = "Climate")]
pub struct Climate {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(telemetry)]
    pub temperature: Option<f64>,
    #[twin(telemetry)]
    pub humidity: Option<f64>,
    #[twin(property)]
    pub setpoint: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:facility:Space", display_name = "Space")]
pub struct Space {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub name: Option<String>,
    #[twin(property)]
    pub capacity: Option<u32>,
    #[twin(telemetry)]
    pub occupancy: OccupancyState,
    #[twin(component)]
    pub climate: Option<Climate>,
    #[twin(relationship, name = "servedBy")]
    pub served_by: Vec<Arc<Thermostat>>,
}
