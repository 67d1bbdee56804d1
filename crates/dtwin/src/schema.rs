//! DTDL v2 interface documents generated from twin descriptors.
//!
//! Only members declared on the type itself are listed; inherited members are reached
//! through `extends`. Header members never appear.

use crate::descriptor::{Marker, MemberDescriptor, TwinDescriptor, ValueType};
use crate::error::TwinError;
use serde::{Deserialize, Serialize};

pub const INTERFACE: &str = "Interface";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum Content {
    Property {
        name: String,
        schema: Schema,
        writable: bool,
    },
    Telemetry {
        name: String,
        schema: Schema,
    },
    Component {
        name: String,
        schema: String,
    },
    #[serde(rename_all = "camelCase")]
    Relationship {
        name: String,
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_multiplicity: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_multiplicity: Option<u32>,
    },
}

impl Content {
    pub fn name(&self) -> &str {
        match self {
            Self::Property { name, .. }
            | Self::Telemetry { name, .. }
            | Self::Component { name, .. }
            | Self::Relationship { name, .. } => name,
        }
    }
}

/// A primitive schema name (`"double"`) or a complex schema object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    Primitive(String),
    Complex(Box<ComplexSchema>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum ComplexSchema {
    #[serde(rename_all = "camelCase")]
    Enum { value_schema: String, enum_values: Vec<EnumValue> },
    Object { fields: Vec<SchemaField> },
    #[serde(rename_all = "camelCase")]
    Array { element_schema: Schema },
    #[serde(rename_all = "camelCase")]
    Map { map_key: SchemaField, map_value: SchemaField },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    pub enum_value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub schema: Schema,
}

impl Schema {
    pub fn of(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::Scalar(kind) => Self::Primitive(kind.schema().to_owned()),
            ValueType::Enum(descriptor) => Self::Complex(Box::new(ComplexSchema::Enum {
                value_schema: "integer".to_owned(),
                enum_values: descriptor
                    .members
                    .iter()
                    .map(|m| EnumValue { name: m.name.to_owned(), enum_value: m.value })
                    .collect(),
            })),
            ValueType::Object(fields) => Self::Complex(Box::new(ComplexSchema::Object {
                fields: fields
                    .iter()
                    .map(|f| SchemaField { name: f.name.to_owned(), schema: Self::of(&f.value_type) })
                    .collect(),
            })),
            ValueType::Array(inner) => {
                Self::Complex(Box::new(ComplexSchema::Array { element_schema: Self::of(inner) }))
            },
            ValueType::Map(inner) => Self::Complex(Box::new(ComplexSchema::Map {
                map_key: SchemaField {
                    name: "key".to_owned(),
                    schema: Self::Primitive("string".to_owned()),
                },
                map_value: SchemaField { name: "value".to_owned(), schema: Self::of(inner) },
            })),
            // Inline twin values reference the target interface by id.
            ValueType::Twin { target, .. } => Self::Primitive(target().full_model_id()),
        }
    }
}

impl Interface {
    pub fn from_descriptor(descriptor: &TwinDescriptor) -> Result<Self, TwinError> {
        // Surfaces classification errors for the type before anything is rendered.
        descriptor.classification()?;
        let contents = descriptor.own_members().filter_map(content).collect();

        Ok(Self {
            id: descriptor.full_model_id(),
            kind: INTERFACE.to_owned(),
            context: descriptor.context.clone(),
            display_name: descriptor.display_name.clone(),
            extends: descriptor.parent_model_id(),
            contents,
        })
    }
}

fn content(member: &MemberDescriptor) -> Option<Content> {
    let name = member.wire_name().into_owned();
    let content = match member.marker {
        Marker::TwinOnly => return None,
        Marker::Property => {
            Content::Property { name, schema: Schema::of(&member.value_type), writable: member.writable }
        },
        Marker::Telemetry => Content::Telemetry { name, schema: Schema::of(&member.value_type) },
        Marker::Component => Content::Component {
            name,
            schema: member.value_type.twin_target()?.full_model_id(),
        },
        Marker::Relationship => {
            let ValueType::Twin { target, many } = member.value_type else {
                return None;
            };
            Content::Relationship {
                name,
                target: target().full_model_id(),
                min_multiplicity: member.min_multiplicity,
                max_multiplicity: member.max_multiplicity.or((!many).then_some(1)),
            }
        },
    };
    Some(content)
}
