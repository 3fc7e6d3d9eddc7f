//! Label definitions and domain enumeration
//!
//! A label's domain is the ordered list of every value it can take. Order is
//! the declaration order: listed order for `choice`, ascending for `range` and
//! `date_range`. Records, state selections and grid axes all refer to label
//! values by their position in this list.

use std::cmp::Ordering;

use chrono::Days;
use serde_json::Value;

use super::decl::{LabelDecl, RangeDecl, ValidatorsDecl};
use super::errors::{SchemaError, SchemaResult};
use super::types::{display_raw, Scalar, ValueType};

/// Largest domain a single label may enumerate
pub const MAX_DOMAIN_SIZE: usize = 1_000_000;

/// A declared label with its enumerated domain
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDef {
    name: String,
    value_type: ValueType,
    domain: Vec<Scalar>,
    pub(super) extend: bool,
}

impl LabelDef {
    pub(super) fn from_decl(name: &str, decl: &LabelDecl) -> SchemaResult<Self> {
        let value_type = ValueType::parse(&decl.type_name)
            .ok_or_else(|| SchemaError::unknown_type(name, &decl.type_name))?;
        if decl.validators.when.is_some() {
            return Err(SchemaError::invalid_domain(name, "when validators apply to parameters only"));
        }
        let domain = enumerate_domain(name, value_type, &decl.validators)?;

        Ok(Self {
            name: name.to_string(),
            value_type,
            domain,
            extend: decl.extend,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// All values of this label, in domain order
    pub fn domain(&self) -> &[Scalar] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Whether this is the extend dimension
    pub fn is_extend(&self) -> bool {
        self.extend
    }

    /// Value at a domain position
    pub fn value(&self, position: usize) -> Option<&Scalar> {
        self.domain.get(position)
    }

    /// Domain position of a typed value
    pub fn position(&self, value: &Scalar) -> Option<usize> {
        self.domain
            .iter()
            .position(|d| d.compare(value) == Some(Ordering::Equal))
    }

    /// Coerces a raw value and returns its domain position
    pub fn lookup(&self, raw: &Value) -> Option<usize> {
        let value = self.value_type.coerce(raw).ok()?;
        self.position(&value)
    }
}

fn enumerate_domain(
    name: &str,
    value_type: ValueType,
    validators: &ValidatorsDecl,
) -> SchemaResult<Vec<Scalar>> {
    let range = validators.range.as_ref().or(validators.date_range.as_ref());

    let domain = match (&validators.choice, range) {
        (Some(choice), range) => {
            let mut values = Vec::with_capacity(choice.choices.len());
            for raw in &choice.choices {
                let value = value_type
                    .coerce(raw)
                    .map_err(|e| SchemaError::invalid_domain(name, e.message()))?;
                if values.iter().any(|v: &Scalar| v == &value) {
                    return Err(SchemaError::invalid_domain(
                        name,
                        format!("duplicate choice {}", value),
                    ));
                }
                values.push(value);
            }
            // A range next to a choice narrows the listed values.
            match range {
                Some(range) => {
                    let (min, max) = range_bounds(name, value_type, range)?;
                    values
                        .into_iter()
                        .filter(|v| {
                            v.compare(&min) != Some(Ordering::Less)
                                && v.compare(&max) != Some(Ordering::Greater)
                        })
                        .collect()
                }
                None => values,
            }
        }
        (None, Some(range)) => enumerate_range(name, value_type, range)?,
        (None, None) if value_type == ValueType::Bool => {
            vec![Scalar::Bool(false), Scalar::Bool(true)]
        }
        (None, None) => {
            return Err(SchemaError::invalid_domain(
                name,
                "declare a choice or range validator",
            ))
        }
    };

    if domain.is_empty() {
        return Err(SchemaError::invalid_domain(name, "domain is empty"));
    }
    Ok(domain)
}

fn range_bounds(name: &str, value_type: ValueType, range: &RangeDecl) -> SchemaResult<(Scalar, Scalar)> {
    let bound = |raw: &Option<Value>, side: &str| -> SchemaResult<Scalar> {
        let raw = raw
            .as_ref()
            .ok_or_else(|| SchemaError::invalid_domain(name, format!("range has no {}", side)))?;
        value_type
            .coerce(raw)
            .map_err(|_| SchemaError::undefined_bound(name, display_raw(raw)))
    };
    Ok((bound(&range.min, "min")?, bound(&range.max, "max")?))
}

fn check_count(name: &str, span: i128, count: i128) -> SchemaResult<usize> {
    if span < 0 {
        return Ok(0);
    }
    if count > MAX_DOMAIN_SIZE as i128 {
        return Err(SchemaError::invalid_domain(
            name,
            format!("more than {} values", MAX_DOMAIN_SIZE),
        ));
    }
    Ok(count.max(0) as usize)
}

fn enumerate_range(name: &str, value_type: ValueType, range: &RangeDecl) -> SchemaResult<Vec<Scalar>> {
    let (min, max) = range_bounds(name, value_type, range)?;
    let step_type = match value_type {
        ValueType::Date => ValueType::Int,
        other => other,
    };
    let step = match &range.step {
        Some(raw) => step_type
            .coerce(raw)
            .map_err(|e| SchemaError::invalid_domain(name, e.message()))?,
        None => match step_type {
            ValueType::Float => Scalar::Float(1.0),
            _ => Scalar::Int(1),
        },
    };

    match (min, max, step) {
        (Scalar::Int(min), Scalar::Int(max), Scalar::Int(step)) => {
            if step <= 0 {
                return Err(SchemaError::invalid_domain(name, "step must be positive"));
            }
            let span = max as i128 - min as i128;
            let count = check_count(name, span, span / step as i128 + 1)?;
            Ok((0..count as i64).map(|k| Scalar::Int(min + k * step)).collect())
        }
        (Scalar::Float(min), Scalar::Float(max), Scalar::Float(step)) => {
            if step <= 0.0 {
                return Err(SchemaError::invalid_domain(name, "step must be positive"));
            }
            let span = ((max - min) / step + 1e-9).floor();
            if !span.is_finite() {
                return Err(SchemaError::invalid_domain(name, "range is not finite"));
            }
            let count = check_count(name, span as i128, span as i128 + 1)?;
            Ok((0..count).map(|k| Scalar::Float(min + k as f64 * step)).collect())
        }
        (Scalar::Date(min), Scalar::Date(max), Scalar::Int(step)) => {
            if step <= 0 {
                return Err(SchemaError::invalid_domain(name, "step must be positive"));
            }
            let days = (max - min).num_days();
            let count = check_count(name, days as i128, days as i128 / step as i128 + 1)?;
            let mut values = Vec::with_capacity(count);
            for k in 0..count as u64 {
                let date = min
                    .checked_add_days(Days::new(k * step as u64))
                    .ok_or_else(|| SchemaError::invalid_domain(name, "date out of range"))?;
                values.push(Scalar::Date(date));
            }
            Ok(values)
        }
        _ => Err(SchemaError::invalid_domain(
            name,
            format!("a range cannot enumerate {} values", value_type),
        )),
    }
}
