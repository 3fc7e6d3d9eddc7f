//! Record keys and value records

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::{ParamValue, Scalar};

/// Identity of one record: the domain position of each of the parameter's
/// labels, in axis order.
///
/// Keys order lexicographically by position, which is grid order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey(Vec<usize>);

impl RecordKey {
    pub fn new(positions: Vec<usize>) -> Self {
        Self(positions)
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    /// Position on one axis
    pub fn at(&self, axis: usize) -> Option<usize> {
        self.0.get(axis).copied()
    }

    /// Copy of this key with `axis` moved to `position`
    pub fn with_position(&self, axis: usize, position: usize) -> Self {
        let mut positions = self.0.clone();
        if let Some(slot) = positions.get_mut(axis) {
            *slot = position;
        }
        Self(positions)
    }

    /// Positions on every axis except `axis`
    pub fn without(&self, axis: usize) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != axis)
            .map(|(_, p)| *p)
            .collect()
    }
}

impl From<Vec<usize>> for RecordKey {
    fn from(positions: Vec<usize>) -> Self {
        Self(positions)
    }
}

/// A record as seen from outside the store: label values plus the value.
///
/// Serializes flat, e.g. `{"year": 2017, "marital_status": "single", "value": 6350.0}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRecord {
    pub labels: IndexMap<String, Scalar>,
    pub value: ParamValue,
}

impl ValueRecord {
    /// Value of one label of this record
    pub fn label(&self, name: &str) -> Option<&Scalar> {
        self.labels.get(name)
    }
}

impl Serialize for ValueRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len() + 1))?;
        for (name, value) in &self.labels {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}
