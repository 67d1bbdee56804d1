#![allow(dead_code)]

use dtwin::prelude::*;
use dtwin_models::equipment::{Asset, OperatingMode, Pump, Thermostat};
use dtwin_models::facility::{Building, Campus, Climate, Floor, OccupancyState, Space};

#[must_use]
pub fn asset(id: &str) -> Asset {
    Asset {
        base: TwinBase::new(id),
        manufacturer: Some("Acme".to_owned()),
        serial_number: Some(format!("SN-{id}")),
        tag: None,
        commissioned: None,
        located_in: None,
    }
}

#[must_use]
pub fn pump(id: &str) -> Arc<Pump> {
    Arc::new(Pump {
        asset: asset(id),
        rated_flow: Some("12.5".parse().unwrap_or_default()),
        mode: OperatingMode::Auto,
        flow_rate: Some(11.75),
        feeds: Vec::new(),
    })
}

/// One campus, one building, two floors; space `S1` is listed on both floors and its
/// thermostat controls pump `P1`.
#[must_use]
pub fn campus() -> Campus {
    let thermostat = Arc::new(Thermostat {
        asset: asset("T1"),
        setpoint: Some(21.0),
        measured: Some(20.4),
        controls: Some(pump("P1")),
    });
    let s1 = Arc::new(Space {
        base: TwinBase::new("S1"),
        name: Some("Lobby".to_owned()),
        capacity: Some(40),
        occupancy: OccupancyState::Occupied,
        climate: Some(Climate {
            base: TwinBase::default(),
            temperature: Some(20.4),
            humidity: None,
            setpoint: Some(21.0),
        }),
        served_by: vec![thermostat],
    });
    let ground = Arc::new(Floor { base: TwinBase::new("L0"), level: 0, spaces: vec![Arc::clone(&s1)] });
    let first = Arc::new(Floor { base: TwinBase::new("L1"), level: 1, spaces: vec![s1] });
    let building = Arc::new(Building {
        base: TwinBase::new("HQ"),
        name: Some("Headquarters".to_owned()),
        year_built: Some(1998),
        gross_area: Some(5400.0),
        floors: vec![ground, first],
    });

    Campus { base: TwinBase::new("C1"), name: Some("North".to_owned()), address: None, buildings: vec![building] }
}
