//! Forward/backward fill along the extend dimension

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::rates::{round_cents, IndexRates};
use crate::observability::Event;
use crate::schema::{ParamDef, ParamValue, Scalar, SchemaRegistry, ValueType};
use crate::store::{ParamRecords, RecordKey, ValueStore};

/// Fills missing extend-label values from neighboring records.
pub struct Extender<'a> {
    registry: &'a SchemaRegistry,
    rates: Option<&'a IndexRates>,
}

impl<'a> Extender<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            rates: None,
        }
    }

    /// Index filled values of `indexed` parameters with `rates`
    /// when the schema enables it.
    pub fn with_rates(mut self, rates: &'a IndexRates) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Extends every parameter over `domain` (extend-label positions).
    /// Returns the number of records created.
    pub fn extend_store(&self, store: &mut ValueStore, domain: &[usize]) -> usize {
        let mut filled = 0;
        for param in self.registry.params() {
            if let Some(records) = store.get_mut(param.name()) {
                filled += self.extend_param(param, records, domain);
            }
        }
        debug!(
            event = %Event::ExtendComplete,
            domain = domain.len(),
            filled,
            "extension complete"
        );
        filled
    }

    /// Extends one parameter over `domain`.
    ///
    /// Records are grouped by their other labels. A missing value takes the
    /// nearest record before it in domain order, or failing that the first
    /// record after it. Parameters that do not vary over the extend label are
    /// left alone.
    pub fn extend_param(&self, param: &ParamDef, records: &mut ParamRecords, domain: &[usize]) -> usize {
        self.fill(param, records, domain, |_| true)
    }

    /// Refills `domain` after an adjustment.
    ///
    /// Values are carried only from records inside `domain` or from
    /// `written` records. Records at positions outside `domain` keep their
    /// values but never propagate into it.
    pub fn refill_param(
        &self,
        param: &ParamDef,
        records: &mut ParamRecords,
        domain: &[usize],
        written: &HashSet<RecordKey>,
    ) -> usize {
        let Some(axis) = self.registry.extend_axis(param) else {
            return 0;
        };
        let active: HashSet<usize> = domain.iter().copied().collect();
        self.fill(param, records, domain, |key| {
            written.contains(key) || key.at(axis).map_or(false, |p| active.contains(&p))
        })
    }

    fn fill(
        &self,
        param: &ParamDef,
        records: &mut ParamRecords,
        domain: &[usize],
        is_source: impl Fn(&RecordKey) -> bool,
    ) -> usize {
        let Some(axis) = self.registry.extend_axis(param) else {
            return 0;
        };

        // Group by the other labels; each group keeps one key as a template.
        let mut groups: BTreeMap<Vec<usize>, (RecordKey, BTreeMap<usize, ParamValue>)> = BTreeMap::new();
        for (key, value) in records.iter() {
            let Some(position) = key.at(axis) else {
                continue;
            };
            let (_, known) = groups
                .entry(key.without(axis))
                .or_insert_with(|| (key.clone(), BTreeMap::new()));
            if is_source(key) {
                known.insert(position, value.clone());
            }
        }

        let mut filled = 0;
        for (template, known) in groups.values() {
            for &target in domain {
                if known.contains_key(&target) {
                    continue;
                }
                let source = known
                    .range(..target)
                    .next_back()
                    .or_else(|| known.range(target..).next());
                let Some((&from, value)) = source else {
                    continue;
                };

                records.insert(
                    template.with_position(axis, target),
                    self.fill_value(param, value, from, target),
                );
                filled += 1;
            }
        }
        filled
    }

    fn fill_value(&self, param: &ParamDef, value: &ParamValue, from: usize, to: usize) -> ParamValue {
        let rates = match self.rates {
            Some(rates) if self.registry.operators().uses_extend_func && param.is_indexed() => rates,
            _ => return value.clone(),
        };

        value.map(|element| match element {
            Scalar::Float(v) => Scalar::Float(rates.index(*v, from, to, round_cents)),
            Scalar::Int(v) if param.value_type() == ValueType::Int => {
                Scalar::Int(rates.index(*v as f64, from, to, f64::round) as i64)
            }
            other => other.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Operators;
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
                    "indexed": true,
                    "value": [
                        {"year": 2015, "marital_status": "single", "value": 100},
                        {"year": 2017, "marital_status": "single", "value": 200},
                        {"year": 2016, "marital_status": "joint", "value": 300}
                    ]
                },
                "flat": {"type": "int", "value": 5}
            }
        }))
        .unwrap()
    }

    fn value_at(store: &ValueStore, key: &[usize]) -> f64 {
        store
            .get("sd")
            .unwrap()
            .get(&RecordKey::new(key.to_vec()))
            .and_then(|v| v.as_scalar())
            .and_then(Scalar::as_f64)
            .unwrap()
    }

    #[test]
    fn test_fill_backward_then_forward() {
        let registry = registry();
        let mut store = ValueStore::from_registry(&registry);
        let domain: Vec<usize> = (0..8).collect();

        let filled = Extender::new(&registry).extend_store(&mut store, &domain);
        assert_eq!(filled, 13);
        assert_eq!(store.get("sd").unwrap().len(), 16);

        // single: 2013-2016 = 100, 2017-2020 = 200
        assert_eq!(value_at(&store, &[0, 0]), 100.0);
        assert_eq!(value_at(&store, &[3, 0]), 100.0);
        assert_eq!(value_at(&store, &[4, 0]), 200.0);
        assert_eq!(value_at(&store, &[7, 0]), 200.0);
        // joint: 300 everywhere
        assert_eq!(value_at(&store, &[0, 1]), 300.0);
        assert_eq!(value_at(&store, &[7, 1]), 300.0);

        // Unlabeled parameters are untouched
        assert_eq!(store.get("flat").unwrap().len(), 1);
    }

    #[test]
    fn test_extend_is_idempotent() {
        let registry = registry();
        let mut store = ValueStore::from_registry(&registry);
        let domain: Vec<usize> = (0..8).collect();
        let extender = Extender::new(&registry);

        extender.extend_store(&mut store, &domain);
        let once = store.clone();
        assert_eq!(extender.extend_store(&mut store, &domain), 0);
        assert_eq!(store, once);
    }

    #[test]
    fn test_scoped_domain_only_fills_selection() {
        let registry = registry();
        let mut store = ValueStore::from_registry(&registry);

        Extender::new(&registry).extend_store(&mut store, &[5, 6]);
        let sd = store.get("sd").unwrap();
        assert!(sd.contains(&RecordKey::new(vec![5, 0])));
        assert!(sd.contains(&RecordKey::new(vec![6, 1])));
        assert!(!sd.contains(&RecordKey::new(vec![0, 0])));
        assert_eq!(sd.len(), 7);
    }

    #[test]
    fn test_refill_skips_values_outside_domain() {
        let registry = registry();
        let mut store = ValueStore::from_registry(&registry);
        let domain: Vec<usize> = (0..8).collect();
        let extender = Extender::new(&registry);
        extender.extend_store(&mut store, &domain);

        // single: 2015 rewritten, 2016 stale and outside the refill domain
        let records = store.get_mut("sd").unwrap();
        let param = registry.param("sd").unwrap();
        let written = RecordKey::new(vec![2, 0]);
        records.insert(written.clone(), ParamValue::from(150.0));
        records.remove(&RecordKey::new(vec![4, 0]));
        records.remove(&RecordKey::new(vec![5, 0]));

        let filled = extender.refill_param(param, records, &[2, 4, 5], &HashSet::from([written]));
        assert_eq!(filled, 2);
        assert_eq!(value_at(&store, &[3, 0]), 100.0);
        assert_eq!(value_at(&store, &[4, 0]), 150.0);
        assert_eq!(value_at(&store, &[5, 0]), 150.0);
    }

    #[test]
    fn test_indexing_applies_only_when_enabled() {
        let registry = registry()
            .with_operators(Operators {
                label_to_extend: Some("year".into()),
                uses_extend_func: true,
            })
            .unwrap();
        let mut rates = IndexRates::new();
        for position in 0..7 {
            rates.insert(position, 0.1);
        }

        let mut store = ValueStore::from_registry(&registry);
        let domain: Vec<usize> = (0..8).collect();
        Extender::new(&registry)
            .with_rates(&rates)
            .extend_store(&mut store, &domain);

        // single 2015 = 100: 2016 = 110, 2014 = 90.91
        assert_eq!(value_at(&store, &[3, 0]), 110.0);
        assert_eq!(value_at(&store, &[1, 0]), 90.91);
        // explicit records are never rewritten
        assert_eq!(value_at(&store, &[4, 0]), 200.0);
    }
}
