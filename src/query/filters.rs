//! Label filtering for queries
//!
//! Exact match on domain positions only. A filter on a label a parameter
//! does not vary over does not constrain that parameter.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::spec::QuerySpec;
use crate::schema::{ParamDef, SchemaRegistry};
use crate::state::{LabelError, LabelResult, StateView};
use crate::store::RecordKey;

/// Allowed positions per label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    allowed: IndexMap<String, BTreeSet<usize>>,
}

impl LabelFilter {
    /// Resolves a query's filters, intersected with the state if asked.
    pub fn resolve(registry: &SchemaRegistry, state: &StateView, spec: &QuerySpec) -> LabelResult<Self> {
        let mut allowed: IndexMap<String, BTreeSet<usize>> = IndexMap::new();

        for (name, values) in &spec.filters {
            let label = registry
                .label(name)
                .ok_or_else(|| LabelError::UnknownLabel(name.clone()))?;
            let positions = values
                .iter()
                .map(|value| {
                    label.position(value).ok_or_else(|| LabelError::UnknownLabelValue {
                        label: name.clone(),
                        value: value.to_string(),
                    })
                })
                .collect::<LabelResult<BTreeSet<_>>>()?;
            allowed.insert(name.clone(), positions);
        }

        if spec.use_state {
            for label in registry.labels() {
                let Some(selected) = state.selection(label.name()) else {
                    continue;
                };
                let selected: BTreeSet<usize> = selected.iter().copied().collect();
                allowed
                    .entry(label.name().to_string())
                    .and_modify(|positions| positions.retain(|p| selected.contains(p)))
                    .or_insert(selected);
            }
        }

        Ok(Self { allowed })
    }

    /// Checks if a record of `param` passes every filter
    pub fn matches(&self, param: &ParamDef, key: &RecordKey) -> bool {
        param.labels().iter().enumerate().all(|(axis, name)| {
            match (self.allowed.get(name), key.at(axis)) {
                (Some(allowed), Some(position)) => allowed.contains(&position),
                (Some(_), None) => false,
                (None, _) => true,
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
