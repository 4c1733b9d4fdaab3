use crate::demangle::demangle;
use crate::model::{PropertyBag, PropertyValue, SanitizedBag, SanitizedValue};

/// Reduces a staged property bag to scalars and flat string lists.
///
/// Per-value rules: null becomes an empty string; strings, numbers and
/// booleans pass through; a tagged value is exported by its symbolic name;
/// collections become ordered lists of element string representations;
/// anything else falls back to its JSON text. The `name` property, when
/// string-valued, is demangled before the generic rules apply.
///
/// Idempotent: sanitizing an already-sanitized bag yields the same bag.
pub fn sanitize_bag(bag: &PropertyBag) -> SanitizedBag {
    bag.iter()
        .map(|(key, value)| {
            let sanitized = if key == "name" {
                match value {
                    PropertyValue::String(s) => SanitizedValue::String(demangle(s)),
                    other => sanitize_value(other),
                }
            } else {
                sanitize_value(value)
            };
            (key.clone(), sanitized)
        })
        .collect()
}

pub fn sanitize_value(value: &PropertyValue) -> SanitizedValue {
    match value {
        PropertyValue::Null => SanitizedValue::String(String::new()),
        PropertyValue::Bool(v) => SanitizedValue::Bool(*v),
        PropertyValue::Int(v) => SanitizedValue::Int(*v),
        PropertyValue::Float(v) => SanitizedValue::Float(*v),
        PropertyValue::String(v) => SanitizedValue::String(v.clone()),
        PropertyValue::Symbol(name) => SanitizedValue::String(name.clone()),
        PropertyValue::List(items) => {
            SanitizedValue::StringList(items.iter().map(stringify).collect())
        }
        PropertyValue::Json(v) => SanitizedValue::String(json_text(v)),
    }
}

fn stringify(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => String::new(),
        PropertyValue::Bool(v) => v.to_string(),
        PropertyValue::Int(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::String(v) => v.clone(),
        PropertyValue::Symbol(name) => name.clone(),
        PropertyValue::List(items) => {
            let parts: Vec<String> = items.iter().map(stringify).collect();
            format!("[{}]", parts.join(", "))
        }
        PropertyValue::Json(v) => json_text(v),
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
