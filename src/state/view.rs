//! Active state

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::errors::{LabelError, LabelResult};
use crate::observability::Event;
use crate::schema::{display_raw, LabelDef, Scalar, SchemaRegistry};

/// Per-label value lists, in label declaration order
pub type Selections = IndexMap<String, Vec<Scalar>>;

/// The selected subset of each label's domain.
///
/// A label without a selection is active over its whole domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateView {
    selected: IndexMap<String, Vec<usize>>,
}

impl StateView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection of every label named in `selections`.
    ///
    /// Other labels keep their selection. Nothing changes if any label or
    /// value is unknown.
    pub fn set(&mut self, registry: &SchemaRegistry, selections: &Selections) -> LabelResult<()> {
        let mut resolved = Vec::with_capacity(selections.len());
        for (name, values) in selections {
            let label = registry
                .label(name)
                .ok_or_else(|| LabelError::UnknownLabel(name.clone()))?;
            let mut positions = values
                .iter()
                .map(|value| {
                    label.position(value).ok_or_else(|| LabelError::UnknownLabelValue {
                        label: name.clone(),
                        value: value.to_string(),
                    })
                })
                .collect::<LabelResult<Vec<_>>>()?;
            positions.sort_unstable();
            positions.dedup();
            resolved.push((name.clone(), positions));
        }

        for (name, positions) in resolved {
            self.selected.insert(name, positions);
        }
        // Keep selections in declaration order.
        self.selected.sort_by_cached_key(|name, _| {
            registry
                .labels()
                .position(|l| l.name() == name)
                .unwrap_or(usize::MAX)
        });

        debug!(event = %Event::StateSet, labels = selections.len(), "state set");
        Ok(())
    }

    /// Drops every selection
    pub fn clear(&mut self) {
        self.selected.clear();
        debug!(event = %Event::StateCleared, "state cleared");
    }

    /// Current selections as label values
    pub fn view(&self, registry: &SchemaRegistry) -> Selections {
        self.selected
            .iter()
            .filter_map(|(name, positions)| {
                let label = registry.label(name)?;
                let values = positions
                    .iter()
                    .filter_map(|&p| label.value(p).cloned())
                    .collect();
                Some((name.clone(), values))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Explicitly selected positions of a label
    pub fn selection(&self, label: &str) -> Option<&[usize]> {
        self.selected.get(label).map(Vec::as_slice)
    }

    /// Active positions of a label: its selection, or the whole domain
    pub fn active_positions(&self, label: &LabelDef) -> Vec<usize> {
        match self.selected.get(label.name()) {
            Some(positions) => positions.clone(),
            None => (0..label.len()).collect(),
        }
    }
}

/// Parses selections such as `{"year": [2017, 2018], "marital_status": "single"}`.
///
/// A single value selects just that value. Values are coerced to the label's
/// type; values that cannot be coerced are unknown values.
pub fn selections_from_json(registry: &SchemaRegistry, raw: &Value) -> LabelResult<Selections> {
    let object = raw
        .as_object()
        .ok_or_else(|| LabelError::InvalidSelection(format!("expected an object, got {}", raw)))?;

    let mut selections = Selections::with_capacity(object.len());
    for (name, values) in object {
        let label = registry
            .label(name)
            .ok_or_else(|| LabelError::UnknownLabel(name.clone()))?;
        let items = match values {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        let coerced = items
            .into_iter()
            .map(|item| {
                label
                    .value_type()
                    .coerce(item)
                    .map_err(|_| LabelError::UnknownLabelValue {
                        label: name.clone(),
                        value: display_raw(item),
                    })
            })
            .collect::<LabelResult<Vec<_>>>()?;
        selections.insert(name.clone(), coerced);
    }
    Ok(selections)
}
