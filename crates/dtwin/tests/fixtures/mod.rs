#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use dtwin::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:SimpleTwin")]
pub struct SimpleTwin {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub quantity: i32,
    #[twin(telemetry, exclude)]
    pub measurement: i32,
}

#[twin_enum]
#[derive(Default)]
pub enum State {
    #[default]
    Off,
    On = 5,
    Standby,
}

#[twin_object]
#[derive(Clone, Default, PartialEq)]
pub struct NestedObject {
    pub label: Option<String>,
    pub level: Option<f64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:ComponentTwin", display_name = "Component twin")]
pub struct ComponentTwin {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub name: Option<String>,
    #[twin(property)]
    pub state: Option<State>,
    #[twin(property)]
    pub nested: Option<NestedObject>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:TwinWithComponent")]
pub struct TwinWithComponent {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub temperature: Option<f64>,
    #[twin(component)]
    pub component_twin: Option<ComponentTwin>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:TwinWithEnum")]
pub struct TwinWithEnum {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub state: State,
    #[twin(property)]
    pub history: Vec<State>,
}

/// Telemetry declared first still lands after the explicit properties.
#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Sensor")]
pub struct Sensor {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(telemetry)]
    pub reading: f64,
    #[twin(property)]
    pub unit: String,
    #[twin(property, read_only)]
    pub serial: Option<String>,
    #[twin(property, name = "displayLabel")]
    pub label: Option<String>,
    /// Not a member; never on the wire.
    pub scratch: u32,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:AllScalars", version = 3)]
pub struct AllScalars {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub tiny: i8,
    #[twin(property)]
    pub small: i16,
    #[twin(property)]
    pub regular: i32,
    #[twin(property)]
    pub large: i64,
    #[twin(property)]
    pub byte: u8,
    #[twin(property)]
    pub word: u16,
    #[twin(property)]
    pub unsigned: u32,
    #[twin(property)]
    pub huge: u64,
    #[twin(property)]
    pub single: f32,
    #[twin(property)]
    pub double: f64,
    #[twin(property)]
    pub amount: Decimal,
    #[twin(property)]
    pub flag: bool,
    #[twin(property)]
    pub letter: char,
    #[twin(property)]
    pub uid: Option<Uuid>,
    #[twin(property)]
    pub observed: Option<DateTime<FixedOffset>>,
    #[twin(property)]
    pub local: Option<NaiveDateTime>,
    #[twin(property)]
    pub tag: Option<ETag>,
    #[twin(property)]
    pub limits: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Target")]
pub struct Target {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:A")]
pub struct A {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub a_value: Option<i32>,
    #[twin(relationship)]
    pub r1: Option<Arc<Target>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:B", version = 2)]
pub struct B {
    #[twin(extends)]
    pub a: A,
    #[twin(property)]
    pub b_value: Option<String>,
    #[twin(relationship)]
    pub r2: Vec<Arc<Target>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:C")]
pub struct C {
    #[twin(extends)]
    pub b: B,
    #[twin(relationship, max = 4)]
    pub r3: Vec<Arc<Target>>,
    #[twin(component)]
    pub part: Option<ComponentTwin>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Room")]
pub struct Room {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub area: Option<f64>,
    #[twin(component)]
    pub climate: Option<ComponentTwin>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Floor")]
pub struct Floor {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub level: i32,
    #[twin(relationship, name = "hasRoom")]
    pub rooms: Vec<Arc<Room>>,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Building")]
pub struct Building {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub name: Option<String>,
    #[twin(relationship, name = "contains")]
    pub floors: Vec<Arc<Floor>>,
}

/// Only accepts percentages from 1 to 100; a blank instance would fail validation.
#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Bounded", hooks)]
pub struct Bounded {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub percent: i32,
}

impl TwinHooks for Bounded {
    fn validate(&self) -> Result<(), TwinError> {
        if (1..=100).contains(&self.percent) {
            Ok(())
        } else {
            Err(TwinError::validation(format!("percent {} is outside 1..=100", self.percent)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Abstract", abstract)]
pub struct AbstractMarker {
    #[twin(base)]
    pub base: TwinBase,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Duplicate")]
pub struct DuplicateOne {
    #[twin(base)]
    pub base: TwinBase,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Duplicate")]
pub struct DuplicateTwo {
    #[twin(base)]
    pub base: TwinBase,
}

#[derive(Debug, Clone, PartialEq, DigitalTwin)]
#[twin(model_id = "dtmi:test:Clash")]
pub struct Clash {
    #[twin(base)]
    pub base: TwinBase,
    #[twin(property)]
    pub flow_rate: f64,
    #[twin(property, name = "flowRate")]
    pub flow: f64,
}

#[must_use]
pub fn simple_twin() -> SimpleTwin {
    SimpleTwin { base: TwinBase::new("122233").with_etag("4444"), quantity: 1, measurement: 2 }
}

#[must_use]
pub fn component(name: Option<&str>) -> ComponentTwin {
    ComponentTwin {
        base: TwinBase::default(),
        name: name.map(str::to_owned),
        state: Some(State::Standby),
        nested: None,
    }
}

#[must_use]
pub fn target(id: &str) -> Arc<Target> {
    Arc::new(Target { base: TwinBase::for_model(id, Target::descriptor()), label: None })
}

/// Building -> two floors -> rooms; room `R1` is shared by both floors.
#[must_use]
pub fn building() -> Building {
    let shared = Arc::new(Room {
        base: TwinBase::new("R1"),
        area: Some(20.5),
        climate: Some(component(Some("hvac"))),
    });
    let second = Arc::new(Room { base: TwinBase::new("R2"), area: None, climate: None });
    let f1 = Arc::new(Floor {
        base: TwinBase::new("F1"),
        level: 1,
        rooms: vec![Arc::clone(&shared), second],
    });
    let f2 = Arc::new(Floor { base: TwinBase::new("F2"), level: 2, rooms: vec![shared] });

    Building { base: TwinBase::new("B1"), name: Some("HQ".to_owned()), floors: vec![f1, f2] }
}

/// Registry holding every concrete fixture type except the clashing ones.
///
/// # Panics
/// * If the registry cannot be built.
#[must_use]
pub fn registry() -> Arc<ModelRegistry> {
    let registry = ModelRegistry::builder()
        .register::<SimpleTwin>()
        .register::<ComponentTwin>()
        .register::<TwinWithComponent>()
        .register::<TwinWithEnum>()
        .register::<Sensor>()
        .register::<AllScalars>()
        .register::<Target>()
        .register::<C>()
        .register::<B>()
        .register::<A>()
        .register::<Room>()
        .register::<Floor>()
        .register::<Building>()
        .register::<Bounded>()
        .register::<AbstractMarker>()
        .build()
        .expect("fixture registry must build");
    Arc::new(registry)
}

#[must_use]
pub fn serializer() -> TwinSerializer {
    TwinSerializer::new(registry())
}
