//! The parameter engine facade
//!
//! `Parameters` owns one registry, one store and one state. Reads borrow it
//! shared, mutations borrow it exclusively.

use serde_json::Value;
use tracing::{debug, warn};

use crate::adjust::{
    parse_adjustments, parse_adjustments_str, AdjustError, AdjustOptions, AdjustReport,
    AdjustResult, AdjustmentEngine, AdjustmentMap, ValidationErrors,
};
use crate::config::{ConfigResult, EngineConfig};
use crate::extend::{Extender, IndexRates};
use crate::observability::Event;
use crate::projector::{ArrayProjector, Grid, ProjectionResult};
use crate::query::{QueryExecutor, QueryResult, QuerySpec};
use crate::schema::{Scalar, SchemaRegistry, SchemaResult};
use crate::state::{selections_from_json, LabelError, LabelResult, Selections, StateView};
use crate::store::{ValueRecord, ValueStore};

#[derive(Debug, Clone)]
pub struct Parameters {
    registry: SchemaRegistry,
    store: ValueStore,
    state: StateView,
    rates: Option<IndexRates>,
    errors: ValidationErrors,
    warnings: ValidationErrors,
}

impl Parameters {
    /// Loads the defaults and extends them over the full extend domain.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self::build(registry, None)
    }

    /// Like [`Parameters::new`], with operators, index rates and an initial
    /// state taken from `config`.
    pub fn with_config(registry: SchemaRegistry, config: &EngineConfig) -> ConfigResult<Self> {
        let operators = config.operators(registry.operators());
        let registry = registry.with_operators(operators)?;
        let rates = config.index_rates(&registry)?;
        let initial = config.initial_state(&registry)?;

        let mut params = Self::build(registry, Some(rates));
        if !initial.is_empty() {
            params.set_state(&initial)?;
        }
        Ok(params)
    }

    pub fn from_json_str(schema: &str) -> SchemaResult<Self> {
        Ok(Self::new(SchemaRegistry::from_json_str(schema)?))
    }

    fn build(registry: SchemaRegistry, rates: Option<IndexRates>) -> Self {
        let mut store = ValueStore::from_registry(&registry);
        if let Some(label) = registry.extend_label() {
            let domain: Vec<usize> = (0..label.len()).collect();
            let mut extender = Extender::new(&registry);
            if let Some(rates) = &rates {
                extender = extender.with_rates(rates);
            }
            extender.extend_store(&mut store, &domain);
        }

        debug!(
            event = %Event::StoreInitialized,
            params = registry.params().count(),
            records = store.record_count(),
            "store initialized"
        );

        Self {
            registry,
            store,
            state: StateView::new(),
            rates,
            errors: ValidationErrors::new(),
            warnings: ValidationErrors::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Parameter names in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.registry.params().map(|p| p.name())
    }

    /// Every stored record of `name`, in domain order, ignoring the state
    pub fn records(&self, name: &str) -> Option<Vec<ValueRecord>> {
        let param = self.registry.param(name)?;
        let records = self.store.get(name)?;
        Some(
            records
                .iter()
                .map(|(key, value)| ValueRecord {
                    labels: self.registry.record_labels(param, key.positions()),
                    value: value.clone(),
                })
                .collect(),
        )
    }

    pub fn view_state(&self) -> Selections {
        self.state.view(&self.registry)
    }

    pub fn set_state(&mut self, selections: &Selections) -> LabelResult<()> {
        self.state.set(&self.registry, selections)
    }

    /// Parses selections such as `{"year": 2017}` and sets them
    pub fn set_state_json(&mut self, raw: &Value) -> LabelResult<()> {
        let selections = selections_from_json(&self.registry, raw)?;
        self.set_state(&selections)
    }

    pub fn clear_state(&mut self) {
        self.state.clear();
    }

    pub fn query(&self, spec: &QuerySpec) -> LabelResult<QueryResult> {
        QueryExecutor::new(&self.registry, &self.store, &self.state).execute(spec)
    }

    /// Records matching `filters`, intersected with the state when
    /// `use_state` is set
    pub fn specification(&self, use_state: bool, filters: Selections) -> LabelResult<QueryResult> {
        self.query(&QuerySpec::new().with_filters(filters).use_state(use_state))
    }

    /// Applies adjustments.
    ///
    /// Valid entries are written even when the call fails. The call fails
    /// when it collected errors and `raise_errors` is set, or collected
    /// warnings and `ignore_warnings` is not.
    pub fn adjust(&mut self, adjustments: &AdjustmentMap, options: &AdjustOptions) -> AdjustResult<AdjustReport> {
        let mut engine = AdjustmentEngine::new(&self.registry);
        if let Some(rates) = &self.rates {
            engine = engine.with_rates(rates);
        }
        let report = engine.apply(&mut self.store, &self.state, adjustments, options);

        self.errors = report.errors.clone();
        self.warnings = report.warnings.clone();

        if report.should_raise(options) {
            warn!(
                event = %Event::AdjustRejected,
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "adjustment rejected"
            );
            return Err(AdjustError::Validation {
                errors: report.errors,
                warnings: report.warnings,
            });
        }
        Ok(report)
    }

    /// Applies adjustments given as a JSON object
    pub fn adjust_json(&mut self, raw: &Value, options: &AdjustOptions) -> AdjustResult<AdjustReport> {
        let adjustments = parse_adjustments(raw)?;
        self.adjust(&adjustments, options)
    }

    /// Applies adjustments given as JSON text
    pub fn adjust_str(&mut self, content: &str, options: &AdjustOptions) -> AdjustResult<AdjustReport> {
        let adjustments = parse_adjustments_str(content)?;
        self.adjust(&adjustments, options)
    }

    /// Re-runs extension over `values` of the extend label, or its full
    /// domain. Returns the number of records created.
    pub fn extend(&mut self, values: Option<&[Scalar]>) -> LabelResult<usize> {
        let Some(label) = self.registry.extend_label() else {
            return Ok(0);
        };
        let mut domain = match values {
            Some(values) => values
                .iter()
                .map(|value| {
                    label.position(value).ok_or_else(|| LabelError::UnknownLabelValue {
                        label: label.name().to_string(),
                        value: value.to_string(),
                    })
                })
                .collect::<LabelResult<Vec<_>>>()?,
            None => (0..label.len()).collect(),
        };
        domain.sort_unstable();
        domain.dedup();

        let mut extender = Extender::new(&self.registry);
        if let Some(rates) = &self.rates {
            extender = extender.with_rates(rates);
        }
        Ok(extender.extend_store(&mut self.store, &domain))
    }

    pub fn to_grid(&self, name: &str) -> ProjectionResult<Grid> {
        ArrayProjector::new(&self.registry, &self.store, &self.state).to_grid(name)
    }

    /// Records for every cell of `grid`. The store is not modified; pass the
    /// records to [`Parameters::adjust`] to write them.
    pub fn from_grid(&self, name: &str, grid: &Grid) -> ProjectionResult<Vec<ValueRecord>> {
        ArrayProjector::new(&self.registry, &self.store, &self.state).from_grid(name, grid)
    }

    /// Errors collected by the last adjustment
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Warnings collected by the last adjustment
    pub fn warnings(&self) -> &ValidationErrors {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamValue;
    use serde_json::json;

    fn params() -> Parameters {
        Parameters::new(
            SchemaRegistry::from_json(&json!({
                "labels": {
                    "year": {"type": "int", "validators": {"range": {"min": 2020, "max": 2023}}, "extend": true}
                },
                "parameters": {
                    "amount": {
                        "type": "int",
                        "value": [{"year": 2021, "value": 5}],
                        "validators": {"range": {"min": 0, "max": 100}}
                    },
                    "flag": {"type": "bool", "value": true}
                }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_construction_extends_full_domain() {
        let params = params();
        let records = params.records("amount").unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.value == ParamValue::from(5i64)));
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["amount", "flag"]);
        assert!(params.records("missing").is_none());
    }

    #[test]
    fn test_failed_adjust_keeps_errors() {
        let mut params = params();
        let err = params
            .adjust_json(&json!({"amount": 500}), &AdjustOptions::default())
            .unwrap_err();
        assert!(matches!(err, AdjustError::Validation { .. }));
        assert_eq!(params.errors().get("amount").len(), 4);

        params
            .adjust_json(&json!({"amount": 50}), &AdjustOptions::default())
            .unwrap();
        assert!(params.errors().is_empty());
    }

    #[test]
    fn test_extend_rejects_unknown_values() {
        let mut params = params();
        assert_eq!(params.extend(None).unwrap(), 0);
        assert!(matches!(
            params.extend(Some(&[Scalar::Int(1999)])).unwrap_err(),
            LabelError::UnknownLabelValue { .. }
        ));
    }

    #[test]
    fn test_from_json_str_and_specification() {
        let mut params = Parameters::from_json_str(
            r#"{
                "labels": {"year": {"type": "int", "validators": {"range": {"min": 2020, "max": 2021}}}},
                "parameters": {"amount": {"type": "int", "value": [{"year": 2020, "value": 1}, {"year": 2021, "value": 2}]}}
            }"#,
        )
        .unwrap();
        params.set_state_json(&json!({"year": 2020})).unwrap();

        let mut filters = Selections::new();
        filters.insert("year".to_string(), vec![Scalar::Int(2021)]);
        assert!(params.specification(true, filters.clone()).unwrap().is_empty());
        assert_eq!(params.specification(false, filters).unwrap()["amount"].len(), 1);

        assert!(Parameters::from_json_str("{").is_err());
    }

    #[test]
    fn test_out_of_range_default_is_rejected() {
        let err = Parameters::from_json_str(
            r#"{"parameters": {"rate": {"type": "float", "value": -5, "validators": {"range": {"min": 0, "max": 1}}}}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), crate::schema::SchemaErrorCode::PgSchemaInvalidDefault);
        assert!(err.message().contains("rate -5 < min 0"));
    }

    #[test]
    fn test_state_round_trip() {
        let mut params = params();
        params.set_state_json(&json!({"year": [2022, 2021]})).unwrap();
        assert_eq!(
            params.view_state()["year"],
            vec![Scalar::Int(2021), Scalar::Int(2022)]
        );
        params.clear_state();
        assert!(params.view_state().is_empty());
    }
}
