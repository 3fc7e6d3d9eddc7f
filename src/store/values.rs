//! In-memory value store

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::record::RecordKey;
use crate::schema::{ParamValue, SchemaRegistry};

/// All records of one parameter, unique by key and iterated in grid order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamRecords {
    records: BTreeMap<RecordKey, ParamValue>,
}

impl ParamRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ParamValue> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    /// Inserts or replaces a record. Returns the previous value.
    pub fn insert(&mut self, key: RecordKey, value: ParamValue) -> Option<ParamValue> {
        self.records.insert(key, value)
    }

    pub fn remove(&mut self, key: &RecordKey) -> Option<ParamValue> {
        self.records.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &ParamValue)> {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(RecordKey, ParamValue)> for ParamRecords {
    fn from_iter<I: IntoIterator<Item = (RecordKey, ParamValue)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Records of every parameter, in parameter declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    params: IndexMap<String, ParamRecords>,
}

impl ValueStore {
    /// Populates a store with every parameter's declared defaults.
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let params = registry
            .params()
            .map(|param| {
                let records = param
                    .defaults()
                    .iter()
                    .map(|d| (RecordKey::new(d.positions.clone()), d.value.clone()))
                    .collect();
                (param.name().to_string(), records)
            })
            .collect();
        Self { params }
    }

    pub fn get(&self, param: &str) -> Option<&ParamRecords> {
        self.params.get(param)
    }

    pub fn get_mut(&mut self, param: &str) -> Option<&mut ParamRecords> {
        self.params.get_mut(param)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamRecords)> {
        self.params.iter().map(|(name, records)| (name.as_str(), records))
    }

    /// Total number of records across all parameters
    pub fn record_count(&self) -> usize {
        self.params.values().map(ParamRecords::len).sum()
    }
}
