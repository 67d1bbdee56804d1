//! Platform built-in types: the twin header, concurrency tags, edges and the generic twin.

use crate::descriptor::{Marker, MemberDescriptor, ScalarKind, TwinDescriptor, ValueType};
use crate::error::TwinError;
use crate::twin::{DynTwin, MemberAccess};
use crate::wire::WireValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque optimistic-concurrency token. Quotes around the raw value are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The tag without surrounding quotes.
    pub fn as_str(&self) -> &str {
        self.0.trim_matches('"')
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ETag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for ETag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ETag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|raw| Self::new(raw.trim_matches('"')))
    }
}

/// The `$metadata` object of a twin document.
#[crate::twin_object]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TwinMetadata {
    #[serde(rename = "$model")]
    pub model: String,
}

impl TwinMetadata {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

/// Reserved header every twin embeds, directly or through its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwinBase {
    pub id: String,
    pub etag: Option<ETag>,
    pub metadata: Option<TwinMetadata>,
}

impl TwinBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Header carrying `$metadata.$model` for the given type.
    pub fn for_model(id: impl Into<String>, descriptor: &TwinDescriptor) -> Self {
        Self {
            id: id.into(),
            etag: None,
            metadata: Some(TwinMetadata::new(descriptor.full_model_id())),
        }
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<ETag>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn model_id(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.model.as_str())
    }
}

impl MemberAccess for TwinBase {
    fn members() -> Vec<MemberDescriptor> {
        vec![
            MemberDescriptor::builder()
                .member("id")
                .rename("$dtId")
                .marker(Marker::TwinOnly)
                .value_type(ValueType::Scalar(ScalarKind::String))
                .declared_by("TwinBase")
                .build(),
            MemberDescriptor::builder()
                .member("etag")
                .rename("$etag")
                .marker(Marker::TwinOnly)
                .value_type(ValueType::Scalar(ScalarKind::ETag))
                .declared_by("TwinBase")
                .build(),
            MemberDescriptor::builder()
                .member("metadata")
                .rename("$metadata")
                .marker(Marker::TwinOnly)
                .value_type(<TwinMetadata as WireValue>::value_type())
                .declared_by("TwinBase")
                .build(),
        ]
    }

    fn read_member(&self, member: &str) -> Result<Option<Value>, TwinError> {
        match member {
            "id" => self.id.to_wire(),
            "etag" => self.etag.to_wire(),
            "metadata" => self.metadata.to_wire(),
            other => Err(TwinError::unknown_member(other.to_owned())),
        }
    }

    fn write_member(&mut self, member: &str, value: Value) -> Result<(), TwinError> {
        match member {
            "id" => self.id = String::from_wire(value)?,
            "etag" => self.etag = Option::<ETag>::from_wire(value)?,
            "metadata" => self.metadata = Option::<TwinMetadata>::from_wire(value)?,
            other => return Err(TwinError::unknown_member(other.to_owned())),
        }
        Ok(())
    }
}

/// A directed, named edge between two twins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "$relationshipId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "$sourceId")]
    pub source_id: String,
    #[serde(rename = "$targetId")]
    pub target_id: String,
    #[serde(rename = "$relationshipName")]
    pub name: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source_id: source_id.into(),
            target_id: target_id.into(),
            name: name.into(),
            properties: Map::new(),
        }
    }
}

/// Untyped twin: header plus a free-form contents map. Upload payload shape and the
/// fallback for documents whose model is not registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicDigitalTwin {
    #[serde(rename = "$dtId")]
    pub id: String,
    #[serde(rename = "$etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
    #[serde(rename = "$metadata", default)]
    pub metadata: TwinMetadata,
    #[serde(flatten)]
    pub contents: Map<String, Value>,
}

impl BasicDigitalTwin {
    /// Header of the twin; `$metadata` is kept only when it names a model.
    pub fn header(&self) -> TwinBase {
        TwinBase {
            id: self.id.clone(),
            etag: self.etag.clone(),
            metadata: (!self.metadata.model.is_empty()).then(|| self.metadata.clone()),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.metadata.model
    }
}

/// Builds a [`BasicDigitalTwin`] from any twin's header and a contents map.
pub(crate) fn basic_twin(twin: &dyn DynTwin, contents: Map<String, Value>) -> BasicDigitalTwin {
    let header = twin.header();
    let metadata = header
        .metadata
        .clone()
        .filter(|m| !m.model.is_empty())
        .unwrap_or_else(|| TwinMetadata::new(twin.twin_type().full_model_id()));

    BasicDigitalTwin { id: header.id.clone(), etag: header.etag.clone(), metadata, contents }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_drops_surrounding_quotes() {
        let tag = ETag::new("\"W/4444\"");
        assert_eq!(tag.as_str(), "W/4444");
        assert_eq!(serde_json::to_value(&tag).unwrap(), Value::from("W/4444"));
    }

    #[test]
    fn basic_twin_keeps_contents_beside_header() {
        let json = r#"{"$dtId":"b1","$metadata":{"$model":"dtmi:x:B;1"},"name":"HQ"}"#;
        let twin: BasicDigitalTwin = serde_json::from_str(json).unwrap();
        assert_eq!(twin.id, "b1");
        assert_eq!(twin.model_id(), "dtmi:x:B;1");
        assert_eq!(twin.contents.get("name"), Some(&Value::from("HQ")));
        assert_eq!(twin.contents.len(), 1);
    }

    #[test]
    fn relationship_omits_absent_id() {
        let edge = Relationship::new("b1", "F1", "contains");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"$sourceId": "b1", "$targetId": "F1", "$relationshipName": "contains"})
        );
    }
}
