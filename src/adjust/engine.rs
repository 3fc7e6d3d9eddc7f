//! Adjustment engine
//!
//! An adjustment call runs in three phases:
//!
//! 1. Expand: every entry becomes a list of candidate writes to exact
//!    record keys. Bare values hit every stored record; partial records hit
//!    every stored record agreeing on the labels they name.
//! 2. Validate: candidates are checked against the parameter's validators.
//!    Range bounds that name another parameter see that parameter's
//!    candidates from the same call when it has any.
//! 3. Commit: accepted candidates are written in input order, so the last
//!    write to a key wins. With extension on, active records after each
//!    written extend value are dropped and refilled from the new values.
//!    Inactive records keep their values and are never used as a source.
//!
//! Rejected entries never touch the store. Accepted entries are written even
//! when other entries of the same call fail.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::parser::{Adjustment, AdjustmentMap, PartialRecord};
use crate::extend::{Extender, IndexRates};
use crate::observability::Event;
use crate::schema::{
    display_raw, Bound, BoundSource, Level, ParamDef, ParamValue, Scalar, SchemaRegistry,
    ViolationKind,
};
use crate::state::StateView;
use crate::store::{ParamRecords, RecordKey, ValueStore};

/// Switches for one adjustment call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustOptions {
    /// Surface collected errors as a failure
    pub raise_errors: bool,
    /// Refill the extend dimension after writing
    pub extend_adjustment: bool,
    /// Apply values that only fail `warn` validators, without failing
    pub ignore_warnings: bool,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self {
            raise_errors: true,
            extend_adjustment: true,
            ignore_warnings: false,
        }
    }
}

/// Outcome of one adjustment call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustReport {
    /// Records written by the adjustment itself
    pub written: usize,
    /// Records created by the extension step
    pub extended: usize,
    pub errors: ValidationErrors,
    pub warnings: ValidationErrors,
}

impl AdjustReport {
    /// Whether the caller should see this report as a failure
    pub fn should_raise(&self, options: &AdjustOptions) -> bool {
        (options.raise_errors && !self.errors.is_empty())
            || (!options.ignore_warnings && !self.warnings.is_empty())
    }
}

/// A write to one exact record
#[derive(Debug, Clone)]
struct Candidate {
    key: RecordKey,
    value: ParamValue,
}

/// Validates and merges adjustments into a store.
pub struct AdjustmentEngine<'a> {
    registry: &'a SchemaRegistry,
    rates: Option<&'a IndexRates>,
}

impl<'a> AdjustmentEngine<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            rates: None,
        }
    }

    /// Index rates for the extension step
    pub fn with_rates(mut self, rates: &'a IndexRates) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Applies `adjustments` to `store`.
    pub fn apply(
        &self,
        store: &mut ValueStore,
        state: &StateView,
        adjustments: &AdjustmentMap,
        options: &AdjustOptions,
    ) -> AdjustReport {
        debug!(event = %Event::AdjustBegin, params = adjustments.len(), "adjustment begins");
        let mut report = AdjustReport::default();

        let mut expanded: IndexMap<String, Vec<Candidate>> = IndexMap::new();
        for (name, adjustment) in adjustments {
            let (param, records) = match (self.registry.param(name), store.get(name)) {
                (Some(param), Some(records)) => (param, records),
                _ => {
                    report.errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownParameter,
                        name.as_str(),
                        IndexMap::new(),
                        format!("{} is not a valid parameter.", name),
                    ));
                    continue;
                }
            };
            let candidates = self.expand(param, records, adjustment, &mut report.errors);
            expanded.entry(name.clone()).or_default().extend(candidates);
        }

        let mut accepted: Vec<(&ParamDef, Vec<Candidate>)> = Vec::with_capacity(expanded.len());
        for (name, candidates) in &expanded {
            let Some(param) = self.registry.param(name) else {
                continue;
            };
            let passed = candidates
                .iter()
                .filter(|candidate| self.validate(param, candidate, store, &expanded, options, &mut report))
                .cloned()
                .collect();
            accepted.push((param, passed));
        }

        for (param, candidates) in accepted {
            self.commit(param, store, state, candidates, options, &mut report);
        }

        debug!(
            event = %Event::AdjustComplete,
            written = report.written,
            extended = report.extended,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "adjustment complete"
        );
        report
    }

    fn expand(
        &self,
        param: &ParamDef,
        records: &ParamRecords,
        adjustment: &Adjustment,
        errors: &mut ValidationErrors,
    ) -> Vec<Candidate> {
        match adjustment {
            Adjustment::Bare(raw) => match param.coerce_value(raw) {
                Ok(value) => records
                    .keys()
                    .map(|key| Candidate {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect(),
                Err(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::TypeCoercion,
                        param.name(),
                        IndexMap::new(),
                        format!("{}: {}", param.name(), e.message()),
                    ));
                    Vec::new()
                }
            },
            Adjustment::Records(entries) if entries.is_empty() && param.is_vector() => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::Malformed,
                    param.name(),
                    IndexMap::new(),
                    format!(
                        "{}: an empty list is ambiguous for a vector parameter, use [{{\"value\": []}}]",
                        param.name()
                    ),
                ));
                Vec::new()
            }
            Adjustment::Records(entries) => {
                let mut candidates = Vec::new();
                for entry in entries {
                    match PartialRecord::from_json(entry) {
                        Ok(partial) => {
                            self.expand_partial(param, records, &partial, errors, &mut candidates)
                        }
                        Err(reason) => errors.push(ValidationError::new(
                            ValidationErrorKind::Malformed,
                            param.name(),
                            IndexMap::new(),
                            format!("{}: {}", param.name(), reason),
                        )),
                    }
                }
                candidates
            }
        }
    }

    fn expand_partial(
        &self,
        param: &ParamDef,
        records: &ParamRecords,
        partial: &PartialRecord,
        errors: &mut ValidationErrors,
        candidates: &mut Vec<Candidate>,
    ) {
        let mut selector: Vec<Option<usize>> = vec![None; param.labels().len()];
        let mut valid = true;

        for (name, raw) in &partial.labels {
            let Some(axis) = param.label_index(name) else {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownLabel,
                    param.name(),
                    partial.labels.clone(),
                    format!("{} is not a valid label for {}.", name, param.name()),
                ));
                valid = false;
                continue;
            };
            match self.registry.label(name).and_then(|label| label.lookup(raw)) {
                Some(position) => selector[axis] = Some(position),
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownLabelValue,
                        param.name(),
                        partial.labels.clone(),
                        format!(
                            "{}: {} is not a valid value of label {}.",
                            param.name(),
                            display_raw(raw),
                            name
                        ),
                    ));
                    valid = false;
                }
            }
        }

        let value = match param.coerce_value(&partial.value) {
            Ok(value) => value,
            Err(e) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::TypeCoercion,
                    param.name(),
                    partial.labels.clone(),
                    format!("{}{}: {}", param.name(), render_raw(&partial.labels), e.message()),
                ));
                return;
            }
        };
        if !valid {
            return;
        }

        if let Some(positions) = selector.iter().copied().collect::<Option<Vec<usize>>>() {
            candidates.push(Candidate {
                key: RecordKey::new(positions),
                value,
            });
            return;
        }

        let before = candidates.len();
        for key in records.keys() {
            let agrees = selector
                .iter()
                .enumerate()
                .all(|(axis, wanted)| wanted.map_or(true, |p| key.at(axis) == Some(p)));
            if agrees {
                candidates.push(Candidate {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        if candidates.len() == before {
            warn!(
                event = %Event::AdjustEntrySkipped,
                param = param.name(),
                labels = %render_raw(&partial.labels),
                "adjustment entry matched no stored record"
            );
        }
    }

    /// Returns whether the candidate may be written.
    fn validate(
        &self,
        param: &ParamDef,
        candidate: &Candidate,
        store: &ValueStore,
        expanded: &IndexMap<String, Vec<Candidate>>,
        options: &AdjustOptions,
        report: &mut AdjustReport,
    ) -> bool {
        let bounds = BoundContext {
            registry: self.registry,
            store,
            expanded,
            param,
            key: &candidate.key,
        };
        let rendered = self.registry.render_labels(param, candidate.key.positions());
        let labels: IndexMap<String, Value> = self
            .registry
            .record_labels(param, candidate.key.positions())
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect();

        let mut failed = false;
        let mut warned = false;
        for validator in param.validators() {
            for element in candidate.value.elements() {
                let Some(violation) = validator.validate(param.name(), &rendered, element, &bounds)
                else {
                    continue;
                };
                let kind = match violation.kind {
                    ViolationKind::Range => ValidationErrorKind::RangeViolation,
                    ViolationKind::Choice => ValidationErrorKind::ChoiceViolation,
                };
                let error = ValidationError::new(kind, param.name(), labels.clone(), violation.message)
                    .with_level(violation.level);
                match violation.level {
                    Level::Error => {
                        report.errors.push(error);
                        failed = true;
                    }
                    Level::Warn => {
                        report.warnings.push(error);
                        warned = true;
                    }
                }
                // One report per validator and record.
                break;
            }
        }

        !failed && (!warned || options.ignore_warnings)
    }

    fn commit(
        &self,
        param: &ParamDef,
        store: &mut ValueStore,
        state: &StateView,
        candidates: Vec<Candidate>,
        options: &AdjustOptions,
        report: &mut AdjustReport,
    ) {
        let Some(records) = store.get_mut(param.name()) else {
            return;
        };

        let extension = match (
            options.extend_adjustment,
            self.registry.extend_axis(param),
            self.registry.extend_label(),
        ) {
            (true, Some(axis), Some(label)) => Some((axis, state.active_positions(label))),
            _ => None,
        };

        if let Some((axis, active)) = &extension {
            let active_set: HashSet<usize> = active.iter().copied().collect();
            let mut stale = Vec::new();
            for candidate in &candidates {
                let Some(written_at) = candidate.key.at(*axis) else {
                    continue;
                };
                if !active_set.contains(&written_at) {
                    warn!(
                        event = %Event::AdjustInactiveValue,
                        param = param.name(),
                        labels = %self.registry.render_labels(param, candidate.key.positions()),
                        "adjusted value is not active in the current state"
                    );
                }
                let others = candidate.key.without(*axis);
                stale.extend(
                    records
                        .keys()
                        .filter(|key| {
                            key.at(*axis).map_or(false, |p| p > written_at && active_set.contains(&p))
                                && key.without(*axis) == others
                        })
                        .cloned(),
                );
            }
            for key in stale {
                records.remove(&key);
            }
        }

        let mut written = HashSet::with_capacity(candidates.len());
        for candidate in candidates {
            written.insert(candidate.key.clone());
            records.insert(candidate.key, candidate.value);
            report.written += 1;
        }

        if let Some((_, active)) = extension {
            let mut extender = Extender::new(self.registry);
            if let Some(rates) = self.rates {
                extender = extender.with_rates(rates);
            }
            report.extended += extender.refill_param(param, records, &active, &written);
        }
    }
}

/// Resolves range bounds for one candidate record
struct BoundContext<'b> {
    registry: &'b SchemaRegistry,
    store: &'b ValueStore,
    expanded: &'b IndexMap<String, Vec<Candidate>>,
    param: &'b ParamDef,
    key: &'b RecordKey,
}

impl BoundContext<'_> {
    /// Whether `other_key` of `other` agrees with the validated record on
    /// every label both parameters vary over
    fn shares_labels(&self, other: &ParamDef, other_key: &RecordKey) -> bool {
        other.labels().iter().enumerate().all(|(axis, name)| {
            match self.param.label_index(name) {
                Some(own_axis) => other_key.at(axis) == self.key.at(own_axis),
                None => true,
            }
        })
    }
}

impl BoundSource for BoundContext<'_> {
    fn resolve(&self, bound: &Bound) -> Vec<Scalar> {
        match bound {
            Bound::Value(value) => vec![value.clone()],
            Bound::Default => self
                .store
                .get(self.param.name())
                .and_then(|records| records.get(self.key))
                .map(|value| value.elements().to_vec())
                .unwrap_or_default(),
            Bound::Param(name) => {
                let Some(other) = self.registry.param(name) else {
                    return Vec::new();
                };
                match self.expanded.get(name).filter(|c| !c.is_empty()) {
                    Some(candidates) => candidates
                        .iter()
                        .filter(|c| self.shares_labels(other, &c.key))
                        .flat_map(|c| c.value.elements().to_vec())
                        .collect(),
                    None => self
                        .store
                        .get(name)
                        .map(|records| {
                            records
                                .iter()
                                .filter(|(key, _)| self.shares_labels(other, key))
                                .flat_map(|(_, value)| value.elements().to_vec())
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            }
        }
    }
}

fn render_raw(labels: &IndexMap<String, Value>) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = labels
        .iter()
        .map(|(name, value)| format!("{}={}", name, display_raw(value)))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::parse_adjustments;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_json(&json!({
            "labels": {
                "year": {"type": "int", "validators": {"range": {"min": 2013, "max": 2020}}, "extend": true},
                "marital_status": {"type": "str", "validators": {"choice": {"choices": ["single", "joint"]}}}
            },
            "parameters": {
                "sd": {
                    "type": "float",
                    "value": [
                        {"year": 2013, "marital_status": "single", "value": 100},
                        {"year": 2013, "marital_status": "joint", "value": 200}
                    ],
                    "validators": {"range": {"min": 0, "max": 9e99}}
                },
                "floor": {
                    "type": "int",
                    "value": 10,
                    "validators": {"range": {"min": 0, "max": "ceiling"}}
                },
                "ceiling": {
                    "type": "int",
                    "value": 100,
                    "validators": {"range": {"min": 0, "max": 1000, "level": "warn"}}
                },
                "mode": {
                    "type": "str",
                    "value": "fast",
                    "validators": {"choice": {"choices": ["fast", "slow"]}}
                },
                "cap": {
                    "type": "float",
                    "value": 5,
                    "validators": {"when": {
                        "param": "mode",
                        "is": "fast",
                        "then": {"range": {"max": 10}},
                        "otherwise": {"range": {"max": 100}}
                    }}
                }
            }
        }))
        .unwrap()
    }

    fn extended_store(registry: &SchemaRegistry) -> ValueStore {
        let mut store = ValueStore::from_registry(registry);
        let domain: Vec<usize> = (0..8).collect();
        Extender::new(registry).extend_store(&mut store, &domain);
        store
    }

    fn sd(store: &ValueStore, year: usize, status: usize) -> Option<f64> {
        store
            .get("sd")?
            .get(&RecordKey::new(vec![year, status]))?
            .as_scalar()?
            .as_f64()
    }

    fn apply(registry: &SchemaRegistry, store: &mut ValueStore, raw: Value, options: AdjustOptions) -> AdjustReport {
        let adjustments = parse_adjustments(&raw).unwrap();
        AdjustmentEngine::new(registry).apply(store, &StateView::new(), &adjustments, &options)
    }

    #[test]
    fn test_wildcard_updates_every_status() {
        let registry = registry();
        let mut store = extended_store(&registry);

        let report = apply(
            &registry,
            &mut store,
            json!({"sd": [{"year": 2015, "value": 500}]}),
            AdjustOptions::default(),
        );
        assert!(report.errors.is_empty());
        assert_eq!(report.written, 2);
        assert_eq!(sd(&store, 2, 0), Some(500.0));
        assert_eq!(sd(&store, 2, 1), Some(500.0));
        // propagated forward, earlier years untouched
        assert_eq!(sd(&store, 7, 1), Some(500.0));
        assert_eq!(sd(&store, 1, 1), Some(200.0));
    }

    #[test]
    fn test_later_entry_takes_over() {
        let registry = registry();
        let mut store = extended_store(&registry);

        apply(
            &registry,
            &mut store,
            json!({"sd": [
                {"year": 2014, "marital_status": "single", "value": 300},
                {"year": 2017, "marital_status": "single", "value": 400}
            ]}),
            AdjustOptions::default(),
        );
        assert_eq!(sd(&store, 3, 0), Some(300.0));
        assert_eq!(sd(&store, 4, 0), Some(400.0));
        assert_eq!(sd(&store, 7, 0), Some(400.0));
        assert_eq!(sd(&store, 7, 1), Some(200.0));
    }

    #[test]
    fn test_without_extension_only_named_records_change() {
        let registry = registry();
        let mut store = extended_store(&registry);

        let options = AdjustOptions {
            extend_adjustment: false,
            ..AdjustOptions::default()
        };
        let report = apply(
            &registry,
            &mut store,
            json!({"sd": [{"year": 2014, "marital_status": "single", "value": 300}]}),
            options,
        );
        assert_eq!(report.extended, 0);
        assert_eq!(sd(&store, 1, 0), Some(300.0));
        assert_eq!(sd(&store, 2, 0), Some(100.0));
    }

    #[test]
    fn test_same_key_last_write_wins() {
        let registry = registry();
        let mut store = extended_store(&registry);

        apply(
            &registry,
            &mut store,
            json!({"sd": [
                {"year": 2016, "value": 1},
                {"year": 2016, "marital_status": "joint", "value": 2}
            ]}),
            AdjustOptions::default(),
        );
        assert_eq!(sd(&store, 3, 0), Some(1.0));
        assert_eq!(sd(&store, 3, 1), Some(2.0));
    }

    #[test]
    fn test_rejected_entries_do_not_mutate() {
        let registry = registry();
        let mut store = extended_store(&registry);
        let before = store.clone();

        let report = apply(
            &registry,
            &mut store,
            json!({
                "sd": [
                    {"year": 2015, "value": "abc"},
                    {"year": 2016, "value": -1},
                    {"year": 2040, "value": 1},
                    {"region": "north", "value": 1},
                    {"value": 5, "year": 2017, "marital_status": "single", "extra": true},
                    7
                ],
                "mode": "medium",
                "missing": 1
            }),
            AdjustOptions::default(),
        );

        let kinds: Vec<ValidationErrorKind> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::TypeCoercion));
        assert!(kinds.contains(&ValidationErrorKind::RangeViolation));
        assert!(kinds.contains(&ValidationErrorKind::UnknownLabelValue));
        assert!(kinds.contains(&ValidationErrorKind::UnknownLabel));
        assert!(kinds.contains(&ValidationErrorKind::Malformed));
        assert!(kinds.contains(&ValidationErrorKind::ChoiceViolation));
        assert!(kinds.contains(&ValidationErrorKind::UnknownParameter));
        assert_eq!(report.written, 0);
        assert_eq!(store, before);

        let range = report.errors.get("sd").iter().find(|e| e.kind == ValidationErrorKind::RangeViolation).unwrap();
        assert_eq!(range.message, "sd[year=2016, marital_status=single] -1 < min 0");
    }

    #[test]
    fn test_valid_entries_apply_next_to_invalid_ones() {
        let registry = registry();
        let mut store = extended_store(&registry);

        let report = apply(
            &registry,
            &mut store,
            json!({"sd": [
                {"year": 2015, "marital_status": "joint", "value": "abc"},
                {"year": 2015, "marital_status": "single", "value": "3000"}
            ]}),
            AdjustOptions::default(),
        );
        assert_eq!(report.errors.len(), 1);
        assert!(report.should_raise(&AdjustOptions::default()));
        assert_eq!(sd(&store, 2, 0), Some(3000.0));
        assert_eq!(sd(&store, 2, 1), Some(200.0));
    }

    #[test]
    fn test_param_bound_prefers_same_call_values() {
        let registry = registry();
        let mut store = extended_store(&registry);

        // ceiling is 100 in the store
        let report = apply(&registry, &mut store, json!({"floor": 150}), AdjustOptions::default());
        assert_eq!(report.errors.get("floor").len(), 1);

        // raising the ceiling in the same call lets the floor through
        let report = apply(
            &registry,
            &mut store,
            json!({"floor": 150, "ceiling": 200}),
            AdjustOptions::default(),
        );
        assert!(report.errors.is_empty());
        assert_eq!(
            store.get("floor").unwrap().get(&RecordKey::new(vec![])),
            Some(&ParamValue::from(150i64))
        );
    }

    #[test]
    fn test_when_follows_referenced_param() {
        let registry = registry();
        let mut store = extended_store(&registry);

        let report = apply(&registry, &mut store, json!({"cap": 50}), AdjustOptions::default());
        let errors = report.errors.get("cap");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::RangeViolation);
        assert_eq!(errors[0].message, "When mode is fast, cap value is invalid: cap 50 > max 10");

        let report = apply(
            &registry,
            &mut store,
            json!({"cap": 50, "mode": "slow"}),
            AdjustOptions::default(),
        );
        assert!(report.errors.is_empty());
        assert_eq!(
            store.get("cap").unwrap().get(&RecordKey::new(vec![])),
            Some(&ParamValue::from(50.0))
        );
    }

    #[test]
    fn test_warnings_block_unless_ignored() {
        let registry = registry();
        let mut store = extended_store(&registry);
        let key = RecordKey::new(vec![]);

        let report = apply(&registry, &mut store, json!({"ceiling": 5000}), AdjustOptions::default());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.errors.is_empty());
        assert!(report.should_raise(&AdjustOptions::default()));
        assert_eq!(store.get("ceiling").unwrap().get(&key), Some(&ParamValue::from(100i64)));

        let options = AdjustOptions {
            ignore_warnings: true,
            ..AdjustOptions::default()
        };
        let report = apply(&registry, &mut store, json!({"ceiling": 5000}), options);
        assert_eq!(report.warnings.len(), 1);
        assert!(!report.should_raise(&options));
        assert_eq!(store.get("ceiling").unwrap().get(&key), Some(&ParamValue::from(5000i64)));
    }

    #[test]
    fn test_bare_value_overwrites_everything() {
        let registry = registry();
        let mut store = extended_store(&registry);

        let report = apply(&registry, &mut store, json!({"sd": 0}), AdjustOptions::default());
        assert_eq!(report.written, 16);
        assert!(store.get("sd").unwrap().iter().all(|(_, v)| v == &ParamValue::from(0.0)));
    }

    #[test]
    fn test_scoped_extension_leaves_inactive_years() {
        let registry = registry();
        let mut store = extended_store(&registry);
        let mut state = StateView::new();
        let selections = crate::state::selections_from_json(&registry, &json!({"year": [2013, 2014, 2015]})).unwrap();
        state.set(&registry, &selections).unwrap();

        let adjustments = parse_adjustments(&json!({"sd": [{"year": 2013, "value": 50}]})).unwrap();
        AdjustmentEngine::new(&registry).apply(&mut store, &state, &adjustments, &AdjustOptions::default());

        assert_eq!(sd(&store, 2, 0), Some(50.0));
        // outside the active state: unchanged
        assert_eq!(sd(&store, 3, 0), Some(100.0));
    }

    #[test]
    fn test_refill_across_state_gap() {
        let registry = registry();
        let mut store = extended_store(&registry);
        store.get_mut("sd").unwrap().insert(RecordKey::new(vec![3, 0]), ParamValue::from(700.0));
        let mut state = StateView::new();
        let selections = crate::state::selections_from_json(&registry, &json!({"year": [2013, 2015, 2016]})).unwrap();
        state.set(&registry, &selections).unwrap();

        let adjustments = parse_adjustments(&json!({"sd": [{"year": 2013, "marital_status": "single", "value": 50}]})).unwrap();
        AdjustmentEngine::new(&registry).apply(&mut store, &state, &adjustments, &AdjustOptions::default());

        // 2014 is inactive and keeps its old value without leaking into 2015
        assert_eq!(sd(&store, 1, 0), Some(100.0));
        assert_eq!(sd(&store, 2, 0), Some(50.0));
        // 2016 held its own stored value, which is dropped and refilled
        assert_eq!(sd(&store, 3, 0), Some(50.0));
        assert_eq!(sd(&store, 4, 0), Some(100.0));
    }
}
