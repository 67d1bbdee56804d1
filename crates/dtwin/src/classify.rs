//! Partitioning of a type's members into wire categories.

use crate::descriptor::{Marker, MemberDescriptor, TwinDescriptor, ValueType};
use crate::error::TwinError;
use fxhash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Wire names with platform-fixed meaning.
pub const RESERVED_NAMES: [&str; 7] =
    ["$dtId", "$etag", "$metadata", "@context", "displayName", "extends", "@type"];

/// Reserved names left out of a serialized twin unless the caller says otherwise.
pub const DEFAULT_EXCLUSIONS: [&str; 5] = ["@id", "@type", "extends", "@context", "displayName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Reserved,
    Normal,
    Telemetry,
    Component,
    Relationship,
}

/// A member with its resolved wire name and category.
#[derive(Debug, Clone)]
pub struct Property {
    pub wire_name: String,
    pub category: Category,
    pub member: MemberDescriptor,
}

impl Property {
    pub fn value_type(&self) -> &ValueType {
        &self.member.value_type
    }
}

/// Disjoint wire categories of one type, each in declaration order.
#[derive(Debug, Default)]
pub struct Classification {
    reserved: Vec<Property>,
    normal: Vec<Property>,
    telemetry: Vec<Property>,
    components: Vec<Property>,
    relationships: Vec<Property>,
    by_wire_name: FxHashMap<String, (Category, usize)>,
}

impl Classification {
    pub fn reserved<'a, S: AsRef<str>>(
        &'a self,
        exclude: &'a [S],
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.reserved.iter().filter(move |p| !is_excluded(exclude, &p.wire_name))
    }

    /// Explicit normal members followed by telemetry, exclusions applied after both.
    pub fn normal<'a, S: AsRef<str>>(
        &'a self,
        exclude: &'a [S],
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.normal
            .iter()
            .chain(self.telemetry.iter())
            .filter(move |p| !is_excluded(exclude, &p.wire_name))
    }

    pub fn components(&self) -> &[Property] {
        &self.components
    }

    pub fn relationships(&self) -> &[Property] {
        &self.relationships
    }

    /// Wire-name lookup over reserved, normal, telemetry and component members.
    pub fn lookup(&self, wire_name: &str) -> Option<&Property> {
        let (category, index) = self.by_wire_name.get(wire_name)?;
        match category {
            Category::Reserved => self.reserved.get(*index),
            Category::Normal => self.normal.get(*index),
            Category::Telemetry => self.telemetry.get(*index),
            Category::Component => self.components.get(*index),
            Category::Relationship => None,
        }
    }

    fn push(&mut self, property: Property) {
        let bucket = match property.category {
            Category::Reserved => &mut self.reserved,
            Category::Normal => &mut self.normal,
            Category::Telemetry => &mut self.telemetry,
            Category::Component => &mut self.components,
            Category::Relationship => &mut self.relationships,
        };
        if property.category != Category::Relationship {
            self.by_wire_name
                .insert(property.wire_name.clone(), (property.category, bucket.len()));
        }
        bucket.push(property);
    }
}

fn is_excluded<S: AsRef<str>>(exclude: &[S], wire_name: &str) -> bool {
    exclude.iter().any(|e| e.as_ref() == wire_name)
}

pub fn is_reserved(wire_name: &str) -> bool {
    RESERVED_NAMES.contains(&wire_name)
}

pub fn classify(descriptor: &TwinDescriptor) -> Result<Classification, TwinError> {
    let mut classification = Classification::default();
    let mut names = FxHashSet::default();

    for member in &descriptor.members {
        if member.excluded {
            continue;
        }
        let wire_name = member.wire_name().into_owned();
        let Some(category) = categorize(descriptor, member, &wire_name)? else {
            continue;
        };
        if !names.insert(wire_name.clone()) {
            return Err(TwinError::classification(format!(
                "{}: more than one member maps to `{wire_name}`",
                descriptor.type_name
            )));
        }
        classification.push(Property { wire_name, category, member: member.clone() });
    }

    trace!(
        type_name = descriptor.type_name,
        reserved = classification.reserved.len(),
        normal = classification.normal.len() + classification.telemetry.len(),
        components = classification.components.len(),
        relationships = classification.relationships.len(),
        "classified twin members"
    );
    Ok(classification)
}

fn categorize(
    descriptor: &TwinDescriptor,
    member: &MemberDescriptor,
    wire_name: &str,
) -> Result<Option<Category>, TwinError> {
    if member.marker != Marker::Relationship && is_reserved(wire_name) {
        return Ok(Some(Category::Reserved));
    }

    let category = match member.marker {
        Marker::TwinOnly => return Ok(None),
        Marker::Property => Category::Normal,
        Marker::Telemetry => Category::Telemetry,
        Marker::Component => match member.value_type {
            ValueType::Twin { many: false, .. } => Category::Component,
            _ => {
                return Err(TwinError::classification(format!(
                    "{}.{}: a component must hold a single twin value",
                    descriptor.type_name, member.member
                )));
            },
        },
        Marker::Relationship => match member.value_type {
            ValueType::Twin { .. } => Category::Relationship,
            _ => {
                return Err(TwinError::classification(format!(
                    "{}.{}: a relationship must point at twins",
                    descriptor.type_name, member.member
                )));
            },
        },
    };

    Ok(Some(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_set_is_closed() {
        assert!(is_reserved("$dtId"));
        assert!(is_reserved("displayName"));
        assert!(!is_reserved("@id"));
        assert!(!is_reserved("quantity"));
    }

    #[test]
    fn exclusions_filter_by_wire_name() {
        assert!(is_excluded(&DEFAULT_EXCLUSIONS, "displayName"));
        assert!(!is_excluded(&DEFAULT_EXCLUSIONS, "$etag"));
    }
}
