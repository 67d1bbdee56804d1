//! Equipment models. Every concrete asset extends [`Asset`].

use crate::facility::Space;
use chrono::{DateTime, Utc};
use dtwin::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Comfort band accepted for thermostat setpoints, in degrees Celsius.
pub const SETPOINT_RANGE: std::ops::RangeInclusive<f64> = 5.0..=35.0;

#[twin_enum]
#[derive(Default)]
pub enum OperatingMode {
    #[default]
    Off,
    Auto = 10,
    Manual = 20,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:equipment:Asset", display_name = "Asset")]
pub struct Asset {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub manufacturer: Option<String>,
    #[twin(property, read_only)]
    pub serial_number: Option<String>,
    #[twin(property, name = "assetTag")]
    pub tag: Option<Uuid>,
    #[twin(property)]
    pub commissioned: Option<DateTime<Utc>>,
    #[twin(relationship, name = "locatedIn")]
    pub located_in: Option<Arc<Space>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:equipment:Pump", display_name = "Pump", version = 2)]
pub struct Pump {
    #[twin(extends)]
    pub asset: Asset,
    #[twin(property)]
    pub rated_flow: Option<Decimal>,
    #[twin(property)]
    pub mode: OperatingMode,
    #[twin(telemetry)]
    pub flow_rate: Option<f64>,
    #[twin(relationship)]
    pub feeds: Vec<Arc<Pump>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:dtwin:equipment:Thermostat", display_name = "Thermostat", hooks)]
pub struct Thermostat {
    #[twin(extends)]
    pub asset: Asset,
    #[twin(property)]
    pub setpoint: Option<f64>,
    #[twin(telemetry)]
    pub measured: Option<f64>,
    #[twin(relationship, max = 1)]
    pub controls: Option<Arc<Pump>>,
}

impl TwinHooks for Thermostat {
    fn validate(&self) -> Result<(), TwinError> {
        match self.setpoint {
            Some(setpoint) if !SETPOINT_RANGE.contains(&setpoint) => Err(TwinError::validation(
                format!("setpoint {setpoint} is outside {SETPOINT_RANGE:?}"),
            )),
            _ => Ok(()),
        }
    }
}
