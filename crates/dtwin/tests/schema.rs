pub mod fixtures;

use dtwin::prelude::*;
use dtwin::{Content, Interface, Schema};
use fixtures::*;
use serde_json::{Value, json};

fn model(serializer: &TwinSerializer, descriptor: &'static dtwin::TwinDescriptor) -> Value {
    let json = serializer.serialize_model(descriptor).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn simple_model_lists_excluded_telemetry_but_no_header() {
    let value = model(&serializer(), SimpleTwin::descriptor());

    assert_eq!(
        value,
        json!({
            "@id": "dtmi:test:SimpleTwin;1",
            "@type": "Interface",
            "@context": "dtmi:dtdl:context;2",
            "displayName": "SimpleTwin",
            "contents": [
                {"@type": "Property", "name": "quantity", "schema": "integer", "writable": true},
                {"@type": "Telemetry", "name": "measurement", "schema": "integer"}
            ]
        })
    );
}

#[test]
fn derived_model_lists_own_members_and_extends_parent() {
    let value = model(&serializer(), C::descriptor());

    assert_eq!(value["@id"], json!("dtmi:test:C;1"));
    assert_eq!(value["extends"], json!("dtmi:test:B;2"));
    assert_eq!(
        value["contents"],
        json!([
            {"@type": "Relationship", "name": "r3", "target": "dtmi:test:Target;1", "maxMultiplicity": 4},
            {"@type": "Component", "name": "part", "schema": "dtmi:test:ComponentTwin;1"}
        ])
    );
}

#[test]
fn single_relationships_are_capped_at_one() {
    let interface = Interface::from_descriptor(A::descriptor()).unwrap();
    let relationship = interface.contents.iter().find(|c| c.name() == "r1");

    assert_eq!(
        relationship,
        Some(&Content::Relationship {
            name: "r1".to_owned(),
            target: "dtmi:test:Target;1".to_owned(),
            min_multiplicity: None,
            max_multiplicity: Some(1),
        })
    );
    assert!(interface.extends.is_none());
}

#[test]
fn complex_schemas_are_nested() {
    let interface = Interface::from_descriptor(ComponentTwin::descriptor()).unwrap();
    assert_eq!(interface.display_name, "Component twin");

    let value = serde_json::to_value(&interface).unwrap();
    assert_eq!(
        value["contents"][1]["schema"],
        json!({
            "@type": "Enum",
            "valueSchema": "integer",
            "enumValues": [
                {"name": "Off", "enumValue": 0},
                {"name": "On", "enumValue": 5},
                {"name": "Standby", "enumValue": 6}
            ]
        })
    );
    assert_eq!(
        value["contents"][2]["schema"],
        json!({
            "@type": "Object",
            "fields": [
                {"name": "label", "schema": "string"},
                {"name": "level", "schema": "double"},
                {"name": "tags", "schema": {"@type": "Array", "elementSchema": "string"}}
            ]
        })
    );
}

#[test]
fn read_only_and_renamed_members_in_schema() {
    let interface = Interface::from_descriptor(Sensor::descriptor()).unwrap();
    let names: Vec<&str> = interface.contents.iter().map(Content::name).collect();
    assert_eq!(names, ["reading", "unit", "serial", "displayLabel"]);

    let serial = interface.contents.iter().find(|c| c.name() == "serial");
    assert!(matches!(serial, Some(Content::Property { writable: false, .. })));
    assert!(matches!(
        interface.contents.first(),
        Some(Content::Telemetry { schema: Schema::Primitive(s), .. }) if s == "double"
    ));
}

#[test]
fn versioned_model_ids_and_scalar_schemas() {
    let value = model(&serializer(), AllScalars::descriptor());
    assert_eq!(value["@id"], json!("dtmi:test:AllScalars;3"));

    let schemas: Vec<(String, Value)> = value["contents"]
        .as_array()
        .map(|items| {
            items.iter().map(|c| (c["name"].as_str().unwrap_or_default().to_owned(), c["schema"].clone())).collect()
        })
        .unwrap_or_default();
    let schema = |name: &str| schemas.iter().find(|(n, _)| n == name).map(|(_, s)| s.clone());

    assert_eq!(schema("large"), Some(json!("long")));
    assert_eq!(schema("single"), Some(json!("float")));
    assert_eq!(schema("amount"), Some(json!("double")));
    assert_eq!(schema("observed"), Some(json!("dateTime")));
    assert_eq!(
        schema("limits"),
        Some(json!({
            "@type": "Map",
            "mapKey": {"name": "key", "schema": "string"},
            "mapValue": {"name": "value", "schema": "double"}
        }))
    );
}

#[test]
fn schema_generation_surfaces_classification_errors() {
    let result = serializer().serialize_model_of::<Clash>();
    assert!(matches!(result, Err(TwinError::Classification { .. })));
}

#[test]
fn interface_documents_parse_back() {
    let json = serializer().serialize_model_of::<Building>().unwrap();
    let interface: Interface = serde_json::from_str(&json).unwrap();

    assert_eq!(interface.id, "dtmi:test:Building;1");
    assert_eq!(interface.contents.len(), 2);
}
