//! Adjustment input parsing
//!
//! An adjustment maps parameter names to either a bare value, which replaces
//! every record of the parameter, or a list of partial records. Entries are
//! kept raw until the engine validates them so that one bad entry does not
//! hide the others.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::errors::{AdjustError, AdjustResult};

/// Adjustments in input order
pub type AdjustmentMap = IndexMap<String, Adjustment>;

/// The update for one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    /// Replaces the value of every stored record
    Bare(Value),
    /// Partial records, applied in order
    Records(Vec<Value>),
}

impl Adjustment {
    /// Classifies a raw value. A list whose first element is an object is a
    /// list of records; an empty list is an empty list of records.
    pub fn from_json(raw: Value) -> Self {
        match raw {
            Value::Array(items) if items.first().map_or(true, Value::is_object) => {
                Adjustment::Records(items)
            }
            other => Adjustment::Bare(other),
        }
    }

    /// Builds a record list from typed partial records
    pub fn records(records: impl IntoIterator<Item = PartialRecord>) -> Self {
        Adjustment::Records(records.into_iter().map(|r| r.to_json()).collect())
    }
}

/// A record with any subset of labels
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    pub labels: IndexMap<String, Value>,
    pub value: Value,
}

impl PartialRecord {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            labels: IndexMap::new(),
            value: value.into(),
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Splits a raw entry into labels and value.
    pub fn from_json(raw: &Value) -> Result<Self, String> {
        let object = raw
            .as_object()
            .ok_or_else(|| format!("expected a record object, got {}", raw))?;
        let value = object
            .get("value")
            .cloned()
            .ok_or_else(|| format!("record {} has no value", raw))?;
        let labels = object
            .iter()
            .filter(|(k, _)| k.as_str() != "value")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self { labels, value })
    }

    pub fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        object.insert("value".to_string(), self.value.clone());
        Value::Object(object)
    }
}

/// Parses `{"param": <value or records>, ...}`.
pub fn parse_adjustments(raw: &Value) -> AdjustResult<AdjustmentMap> {
    let object = raw.as_object().ok_or_else(|| {
        AdjustError::Parse(format!("expected an object of parameter names, got {}", raw))
    })?;
    Ok(object
        .iter()
        .map(|(name, value)| (name.clone(), Adjustment::from_json(value.clone())))
        .collect())
}

/// Parses adjustment JSON text.
pub fn parse_adjustments_str(content: &str) -> AdjustResult<AdjustmentMap> {
    let raw: Value =
        serde_json::from_str(content).map_err(|e| AdjustError::Parse(format!("Invalid JSON: {}", e)))?;
    parse_adjustments(&raw)
}
