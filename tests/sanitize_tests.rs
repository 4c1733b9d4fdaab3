use std::collections::BTreeMap;

use serde_json::json;

use cpgexport::{PropertyBag, PropertyValue, SanitizedValue, sanitize_bag};

fn bag(entries: Vec<(&str, PropertyValue)>) -> PropertyBag {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[test]
fn test_sanitize_null_becomes_empty_string() {
    let out = sanitize_bag(&bag(vec![("comment", PropertyValue::Null)]));
    assert_eq!(out["comment"], SanitizedValue::String(String::new()));
}

#[test]
fn test_sanitize_scalars_pass_through() {
    let out = sanitize_bag(&bag(vec![
        ("code", PropertyValue::String("x = 1".into())),
        ("line", PropertyValue::Int(42)),
        ("weight", PropertyValue::Float(0.5)),
        ("inferred", PropertyValue::Bool(true)),
    ]));
    assert_eq!(out["code"], SanitizedValue::String("x = 1".into()));
    assert_eq!(out["line"], SanitizedValue::Int(42));
    assert_eq!(out["weight"], SanitizedValue::Float(0.5));
    assert_eq!(out["inferred"], SanitizedValue::Bool(true));
}

#[test]
fn test_sanitize_symbol_exports_its_name() {
    let out = sanitize_bag(&bag(vec![(
        "access",
        PropertyValue::Symbol("WRITE".into()),
    )]));
    assert_eq!(out["access"], SanitizedValue::String("WRITE".into()));
}

#[test]
fn test_sanitize_collection_becomes_string_list() {
    let out = sanitize_bag(&bag(vec![(
        "args",
        PropertyValue::List(vec![
            PropertyValue::Int(1),
            PropertyValue::String("two".into()),
            PropertyValue::Symbol("THREE".into()),
            PropertyValue::Null,
        ]),
    )]));
    assert_eq!(
        out["args"],
        SanitizedValue::StringList(vec![
            "1".into(),
            "two".into(),
            "THREE".into(),
            "".into()
        ])
    );
}

#[test]
fn test_sanitize_opaque_value_stringified() {
    let out = sanitize_bag(&bag(vec![(
        "location",
        PropertyValue::Json(json!({ "file": "a.rs", "line": 3 })),
    )]));
    assert_eq!(
        out["location"],
        SanitizedValue::String(r#"{"file":"a.rs","line":3}"#.into())
    );
}

#[test]
fn test_sanitize_demangles_name_property() {
    let out = sanitize_bag(&bag(vec![(
        "name",
        PropertyValue::String("_ZN3foo3barE".into()),
    )]));
    assert_eq!(out["name"], SanitizedValue::String("foo::bar".into()));
}

#[test]
fn test_sanitize_leaves_unmangled_name_alone() {
    let out = sanitize_bag(&bag(vec![(
        "name",
        PropertyValue::String("plain_name".into()),
    )]));
    assert_eq!(out["name"], SanitizedValue::String("plain_name".into()));
}

#[test]
fn test_sanitize_non_string_name_uses_generic_rules() {
    let out = sanitize_bag(&bag(vec![("name", PropertyValue::Int(7))]));
    assert_eq!(out["name"], SanitizedValue::Int(7));
}

#[test]
fn test_sanitize_is_idempotent() {
    let raw = bag(vec![
        ("name", PropertyValue::String("_ZN3foo3barE".into())),
        ("comment", PropertyValue::Null),
        ("line", PropertyValue::Int(42)),
        ("access", PropertyValue::Symbol("READ".into())),
        (
            "args",
            PropertyValue::List(vec![PropertyValue::Int(1), PropertyValue::Bool(false)]),
        ),
        ("location", PropertyValue::Json(json!({ "line": 3 }))),
    ]);
    let once = sanitize_bag(&raw);
    let as_properties: PropertyBag = once
        .iter()
        .map(|(k, v)| (k.clone(), PropertyValue::from(v)))
        .collect();
    let twice = sanitize_bag(&as_properties);
    assert_eq!(once, twice);
}

#[test]
fn test_sanitize_preserves_all_keys() {
    let raw = bag(vec![
        ("a", PropertyValue::Null),
        ("b", PropertyValue::Int(1)),
        ("c", PropertyValue::List(vec![])),
    ]);
    let out = sanitize_bag(&raw);
    let keys: Vec<&str> = out.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(out["c"], SanitizedValue::StringList(vec![]));
}

#[test]
fn test_sanitized_bag_survives_json_round_trip() {
    let raw = bag(vec![
        ("line", PropertyValue::Int(42)),
        ("inferred", PropertyValue::Bool(true)),
        (
            "args",
            PropertyValue::List(vec![PropertyValue::String("x".into())]),
        ),
    ]);
    let out = sanitize_bag(&raw);
    let text = serde_json::to_string(&out).expect("serialize");
    let back: BTreeMap<String, SanitizedValue> = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, out);
}
