use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node as produced by the upstream graph builder, staged for export.
///
/// `local_id` is the builder's own identifier. It is NOT unique across
/// independently constructed subgraphs; see [`crate::correlate::IdentityCorrelator`]
/// for the durable identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisNode {
    pub local_id: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl AnalysisNode {
    pub fn new(local_id: i64, labels: Vec<String>) -> Self {
        Self {
            local_id,
            labels,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property<K: Into<String>>(mut self, key: K, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// A directed typed edge between two staged nodes, referenced by their
/// analysis-local ids. Endpoints may be unresolved at staging time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagedEdge {
    pub edge_type: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl StagedEdge {
    pub fn new<T: Into<String>>(edge_type: T, start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            edge_type: edge_type.into(),
            start,
            end,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property<K: Into<String>>(mut self, key: K, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// A raw property value as handed over by the upstream builder.
///
/// `Symbol` carries the symbolic name of an enumerated/tagged upstream value;
/// `Json` is the catch-all for shapes the builder serialized as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Symbol(String),
    List(Vec<PropertyValue>),
    Json(Value),
}

/// A property value reduced to a shape the target store accepts: a scalar or
/// a flat list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SanitizedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringList(Vec<String>),
}

impl SanitizedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SanitizedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SanitizedValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&SanitizedValue> for PropertyValue {
    fn from(value: &SanitizedValue) -> Self {
        match value {
            SanitizedValue::Bool(v) => PropertyValue::Bool(*v),
            SanitizedValue::Int(v) => PropertyValue::Int(*v),
            SanitizedValue::Float(v) => PropertyValue::Float(*v),
            SanitizedValue::String(v) => PropertyValue::String(v.clone()),
            SanitizedValue::StringList(v) => {
                PropertyValue::List(v.iter().cloned().map(PropertyValue::String).collect())
            }
        }
    }
}

/// A property bag staged for export.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// A property bag after sanitization, ready for persistence.
pub type SanitizedBag = BTreeMap<String, SanitizedValue>;

/// Shared handle to a staged node. Object identity (the allocation, not the
/// value) is what the aux store and the correlator key on.
pub type NodeHandle = Arc<AnalysisNode>;
