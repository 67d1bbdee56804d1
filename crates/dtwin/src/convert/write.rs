use crate::classify::{DEFAULT_EXCLUSIONS, Property};
use crate::error::{TwinError, TwinErrorExt};
use crate::twin::DynTwin;
use serde_json::{Map, Value};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Full document: reserved header, normal members, components (null when absent).
    Twin,
    /// Inline value: normal members and components, absent values omitted.
    Component,
}

pub(crate) fn write_twin<S: AsRef<str>>(
    twin: &dyn DynTwin,
    exclusions: &[S],
    mode: Mode,
) -> Result<Map<String, Value>, TwinError> {
    let descriptor = twin.twin_type();
    let classification = descriptor.classification()?;
    let mut document = Map::new();

    if mode == Mode::Twin {
        for property in classification.reserved(exclusions) {
            write_member(twin, property, &mut document)?;
        }
    }
    for property in classification.normal(exclusions) {
        write_member(twin, property, &mut document)?;
    }
    for property in classification.components() {
        match twin.component(property.member.member) {
            Some(component) => {
                let nested = write_twin(component, &DEFAULT_EXCLUSIONS, Mode::Component)
                    .context(format!("component {}", property.wire_name))?;
                document.insert(property.wire_name.clone(), Value::Object(nested));
            },
            None if mode == Mode::Twin => {
                document.insert(property.wire_name.clone(), Value::Null);
            },
            None => {},
        }
    }

    trace!(type_name = descriptor.type_name, keys = document.len(), ?mode, "wrote twin");
    Ok(document)
}

fn write_member(
    twin: &dyn DynTwin,
    property: &Property,
    document: &mut Map<String, Value>,
) -> Result<(), TwinError> {
    let value = twin
        .read_member(property.member.member)
        .context(format!("member {}", property.wire_name))?;
    if let Some(value) = value {
        document.insert(property.wire_name.clone(), value);
    }
    Ok(())
}
