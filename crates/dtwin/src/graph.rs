//! Walks over the twin instance graph: flattening, edge extraction and the upload shape.

use crate::classify::DEFAULT_EXCLUSIONS;
use crate::convert::component_to_value;
use crate::descriptor::TwinDescriptor;
use crate::error::{TwinError, TwinErrorExt};
use crate::twin::DynTwin;
use crate::types::{BasicDigitalTwin, Relationship, basic_twin};
use fxhash::FxHashSet;
use serde_json::{Map, Value};
use std::any::TypeId;
use tracing::debug;

/// Identity of an instance: its address.
fn address(twin: &dyn DynTwin) -> usize {
    std::ptr::from_ref(twin).cast::<()>() as usize
}

/// The root followed by every twin reachable through relationships, each once.
///
/// Depth first in declaration order; a target's own traversal comes before the target.
pub fn flatten(root: &dyn DynTwin) -> Result<Vec<&dyn DynTwin>, TwinError> {
    let mut walk = Walk::default();
    walk.path.push(address(root));
    walk.visit(root)?;

    let mut seen = FxHashSet::default();
    let twins: Vec<&dyn DynTwin> = std::iter::once(root)
        .chain(walk.out)
        .filter(|twin| seen.insert(address(*twin)))
        .collect();

    debug!(root = root.id(), twins = twins.len(), "flattened twin graph");
    Ok(twins)
}

#[derive(Default)]
struct Walk<'a> {
    path: Vec<usize>,
    done: FxHashSet<usize>,
    out: Vec<&'a dyn DynTwin>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, twin: &'a dyn DynTwin) -> Result<(), TwinError> {
        let classification = twin.twin_type().classification()?;

        for property in classification.relationships() {
            for target in linked(twin, property.member.member) {
                let key = address(target);
                if self.path.contains(&key) {
                    return Err(TwinError::cycle(format!(
                        "{} reaches itself through {}",
                        target.id(),
                        property.wire_name
                    )));
                }
                if !self.done.contains(&key) {
                    self.path.push(key);
                    self.visit(target)?;
                    self.path.pop();
                    self.done.insert(key);
                }
                self.out.push(target);
            }
        }

        Ok(())
    }
}

/// Targets of a relationship member. An unset required target holds a blank twin without
/// an id and is not part of the graph.
fn linked<'a>(twin: &'a dyn DynTwin, member: &str) -> impl Iterator<Item = &'a dyn DynTwin> {
    twin.related(member).into_iter().filter(|target| !target.id().is_empty())
}

/// One edge per target of every relationship member, named by the member's wire name.
pub fn relationships(twin: &dyn DynTwin) -> Result<Vec<Relationship>, TwinError> {
    let classification = twin.twin_type().classification()?;
    let source = twin.id();

    Ok(classification
        .relationships()
        .iter()
        .flat_map(|property| {
            linked(twin, property.member.member)
                .map(|target| Relationship::new(source, target.id(), property.wire_name.clone()))
        })
        .collect())
}

/// Wire contents of a twin: normal members and components, without the header.
///
/// Absent members are dropped; structured values lose their null fields recursively.
pub fn refresh_contents(twin: &dyn DynTwin) -> Result<Map<String, Value>, TwinError> {
    let classification = twin.twin_type().classification()?;
    let mut contents = Map::new();

    for property in classification.normal(&DEFAULT_EXCLUSIONS) {
        let value = twin
            .read_member(property.member.member)
            .context(format!("member {}", property.wire_name))?;
        match value {
            None | Some(Value::Null) => {},
            Some(mut value) => {
                if property.value_type().is_structured() {
                    strip_nulls(&mut value);
                }
                contents.insert(property.wire_name.clone(), value);
            },
        }
    }
    for property in classification.components() {
        if let Some(component) = twin.component(property.member.member) {
            let mut value = component_to_value(component)?;
            strip_nulls(&mut value);
            contents.insert(property.wire_name.clone(), value);
        }
    }

    Ok(contents)
}

/// Removes `null` fields from an object and from every object nested in it.
pub fn strip_nulls(value: &mut Value) {
    if let Value::Object(object) = value {
        object.retain(|_, field| !field.is_null());
        for field in object.values_mut() {
            strip_nulls(field);
        }
    }
}

/// Header plus refreshed contents, the shape the platform accepts for uploads.
pub fn to_basic_twin(twin: &dyn DynTwin) -> Result<BasicDigitalTwin, TwinError> {
    Ok(basic_twin(twin, refresh_contents(twin)?))
}

/// Types that must exist on the platform before the graph under `root` can be uploaded,
/// ancestors before descendants.
pub fn dependent_types(root: &dyn DynTwin) -> Result<Vec<&'static TwinDescriptor>, TwinError> {
    let mut seen = FxHashSet::default();
    let mut types = Vec::new();

    for twin in flatten(root)? {
        collect_type(twin.twin_type(), &mut seen, &mut types)?;
    }

    let mut ranked = types
        .into_iter()
        .map(|descriptor| descriptor.depth().map(|depth| (depth, descriptor)))
        .collect::<Result<Vec<_>, _>>()?;
    ranked.sort_by_key(|(depth, _)| *depth);
    Ok(ranked.into_iter().map(|(_, descriptor)| descriptor).collect())
}

fn collect_type(
    descriptor: &'static TwinDescriptor,
    seen: &mut FxHashSet<TypeId>,
    types: &mut Vec<&'static TwinDescriptor>,
) -> Result<(), TwinError> {
    if !seen.insert(descriptor.type_id) {
        return Ok(());
    }
    for ancestor in descriptor.ancestors()? {
        collect_type(ancestor, seen, types)?;
    }
    types.push(descriptor);
    for property in descriptor.classification()?.components() {
        if let Some(target) = property.value_type().twin_target() {
            collect_type(target, seen, types)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Marker, MemberDescriptor, ValueType};
    use crate::twin::{MemberAccess, Twin, blank_of};
    use crate::types::TwinBase;
    use serde_json::json;
    use std::any::Any;
    use std::sync::OnceLock;

    /// Hand-written twin whose `next` relationship points back at itself.
    #[derive(Debug, Default)]
    struct Loop {
        base: TwinBase,
    }

    impl MemberAccess for Loop {
        fn members() -> Vec<MemberDescriptor> {
            let mut members: Vec<MemberDescriptor> =
                TwinBase::members().into_iter().map(MemberDescriptor::inherit).collect();
            members.push(
                MemberDescriptor::builder()
                    .member("next")
                    .marker(Marker::Relationship)
                    .value_type(ValueType::Twin { target: Loop::descriptor, many: false })
                    .declared_by("Loop")
                    .build(),
            );
            members
        }

        fn read_member(&self, member: &str) -> Result<Option<Value>, TwinError> {
            self.base.read_member(member)
        }

        fn write_member(&mut self, member: &str, value: Value) -> Result<(), TwinError> {
            self.base.write_member(member, value)
        }

        fn related(&self, member: &str) -> Vec<&dyn DynTwin> {
            if member == "next" { vec![self as &dyn DynTwin] } else { Vec::new() }
        }
    }

    impl DynTwin for Loop {
        fn twin_type(&self) -> &'static TwinDescriptor {
            Self::descriptor()
        }

        fn header(&self) -> &TwinBase {
            &self.base
        }

        fn header_mut(&mut self) -> &mut TwinBase {
            &mut self.base
        }

        fn validate(&self) -> Result<(), TwinError> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    impl Twin for Loop {
        fn descriptor() -> &'static TwinDescriptor {
            static DESCRIPTOR: OnceLock<TwinDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                TwinDescriptor::builder()
                    .type_id(TypeId::of::<Self>())
                    .type_name("Loop")
                    .model_id("dtmi:test:Loop".to_owned())
                    .display_name("Loop")
                    .members(Self::members())
                    .blank(blank_of::<Self>)
                    .build()
            })
        }

        fn blank() -> Self {
            Self::default()
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let twin = Loop { base: TwinBase::new("L1") };

        let err = flatten(&twin).map(|twins| twins.len()).unwrap_err();
        assert!(matches!(err, TwinError::Cycle { .. }), "unexpected: {err}");
        assert!(matches!(dependent_types(&twin), Err(TwinError::Cycle { .. })));

        let edges = relationships(&twin).unwrap();
        assert_eq!(edges, vec![Relationship::new("L1", "L1", "next")]);
    }

    #[test]
    fn strip_nulls_recurses_into_objects_only() {
        let mut value = json!({
            "name": "pump",
            "rating": null,
            "inner": {"a": null, "b": 1, "deeper": {"c": null}},
            "list": [null, 1]
        });
        strip_nulls(&mut value);
        assert_eq!(value, json!({"name": "pump", "inner": {"b": 1, "deeper": {}}, "list": [null, 1]}));

        let once = value.clone();
        strip_nulls(&mut value);
        assert_eq!(value, once);
    }
}
