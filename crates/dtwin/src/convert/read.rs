use crate::descriptor::TwinDescriptor;
use crate::error::{TwinError, TwinErrorExt};
use crate::twin::DynTwin;
use serde_json::Value;
use tracing::trace;

/// Populates a blank instance of `descriptor` from a JSON object.
///
/// Unknown keys, read-only members and `null` values are skipped; the type's validation
/// hook runs once every entry has been applied.
pub(crate) fn read_twin(
    descriptor: &'static TwinDescriptor,
    document: Value,
) -> Result<Box<dyn DynTwin>, TwinError> {
    let Value::Object(entries) = document else {
        return Err(TwinError::coercion(format!(
            "a {} document must be a JSON object",
            descriptor.type_name
        )));
    };
    let classification = descriptor.classification()?;
    let mut twin = descriptor.new_blank();

    for (key, value) in entries {
        let Some(property) = classification.lookup(&key) else {
            trace!(type_name = descriptor.type_name, key = %key, "skipping unknown key");
            continue;
        };
        if !property.member.writable || value.is_null() {
            continue;
        }
        twin.write_member(property.member.member, value)
            .context(format!("{}.{}", descriptor.type_name, property.wire_name))?;
    }

    twin.validate()?;
    Ok(twin)
}
