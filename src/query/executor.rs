//! Query execution

use indexmap::IndexMap;
use tracing::debug;

use super::filters::LabelFilter;
use super::spec::QuerySpec;
use crate::observability::Event;
use crate::schema::SchemaRegistry;
use crate::state::{LabelResult, StateView};
use crate::store::{ValueRecord, ValueStore};

/// Records per parameter, in parameter declaration order
pub type QueryResult = IndexMap<String, Vec<ValueRecord>>;

/// Runs label queries against a store
pub struct QueryExecutor<'a> {
    registry: &'a SchemaRegistry,
    store: &'a ValueStore,
    state: &'a StateView,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(registry: &'a SchemaRegistry, store: &'a ValueStore, state: &'a StateView) -> Self {
        Self {
            registry,
            store,
            state,
        }
    }

    /// Executes a query.
    ///
    /// Records come back in grid order. Names in `spec.params` that are not
    /// parameters are ignored.
    pub fn execute(&self, spec: &QuerySpec) -> LabelResult<QueryResult> {
        let filter = LabelFilter::resolve(self.registry, self.state, spec)?;

        let mut result = QueryResult::new();
        let mut matched = 0;
        for param in self.registry.params() {
            if let Some(wanted) = &spec.params {
                if !wanted.iter().any(|name| name == param.name()) {
                    continue;
                }
            }
            let Some(records) = self.store.get(param.name()) else {
                continue;
            };

            let selected: Vec<ValueRecord> = records
                .iter()
                .filter(|(key, _)| filter.matches(param, key))
                .map(|(key, value)| ValueRecord {
                    labels: self.registry.record_labels(param, key.positions()),
                    value: value.clone(),
                })
                .collect();

            if selected.is_empty() && !spec.include_empty {
                continue;
            }
            matched += selected.len();
            result.insert(param.name().to_string(), selected);
        }

        debug!(
            event = %Event::QueryExecuted,
            params = result.len(),
            records = matched,
            "query complete"
        );
        Ok(result)
    }
}
