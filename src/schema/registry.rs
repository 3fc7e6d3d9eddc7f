//! Schema registry
//!
//! Turns a [`SchemaDecl`] into typed label and parameter definitions.
//! Registration fails fast on the first problem; a registry is never
//! partially built. Default values must pass their parameter's
//! `error`-level validators.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::decl::{ParamDecl, SchemaDecl, ValidatorsDecl, WhenDecl};
use super::errors::{SchemaError, SchemaResult};
use super::label::LabelDef;
use super::param::{DefaultRecord, ParamDef};
use super::types::{display_raw, Scalar, ValueType};
use super::validator::{Bound, BoundSource, Condition, Level, Validator};
use crate::observability::Event;

/// Name of the range bound that refers to a parameter's own stored value
const DEFAULT_BOUND: &str = "default";

/// Engine switches attached to a schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operators {
    /// Label along which missing values are filled
    pub label_to_extend: Option<String>,
    /// Apply index rates to `indexed` parameters while extending
    pub uses_extend_func: bool,
}

/// Registry of all declared labels and parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    labels: IndexMap<String, LabelDef>,
    params: IndexMap<String, ParamDef>,
    operators: Operators,
}

impl SchemaRegistry {
    /// Builds a registry from a parsed declaration.
    pub fn register(decl: &SchemaDecl) -> SchemaResult<Self> {
        let mut labels = IndexMap::with_capacity(decl.labels.len());
        for (name, label_decl) in &decl.labels {
            labels.insert(name.clone(), LabelDef::from_decl(name, label_decl)?);
        }

        let label_to_extend = resolve_extend_label(&labels, decl.operators.label_to_extend.as_deref())?;
        for label in labels.values_mut() {
            label.extend = label_to_extend.as_deref() == Some(label.name());
        }

        let mut params = IndexMap::with_capacity(decl.parameters.len());
        for (name, param_decl) in &decl.parameters {
            let param = build_param(name, param_decl, &labels, &decl.parameters)?;
            params.insert(name.clone(), param);
        }

        let registry = Self {
            labels,
            params,
            operators: Operators {
                label_to_extend,
                uses_extend_func: decl.operators.uses_extend_func,
            },
        };
        registry.check_defaults()?;

        debug!(
            event = %Event::SchemaRegistered,
            labels = registry.labels.len(),
            parameters = registry.params.len(),
            label_to_extend = registry.operators.label_to_extend.as_deref().unwrap_or(""),
            "schema registered"
        );
        Ok(registry)
    }

    /// Builds a registry from an in-memory JSON document.
    pub fn from_json(value: &Value) -> SchemaResult<Self> {
        let decl: SchemaDecl = serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::malformed("<in-memory>", e.to_string()))?;
        Self::register(&decl)
    }

    /// Builds a registry from JSON text.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        let decl: SchemaDecl = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed("<in-memory>", format!("Invalid JSON: {}", e)))?;
        Self::register(&decl)
    }

    /// Reads and registers a schema file.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;
        let decl: SchemaDecl = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;
        Self::register(&decl)
    }

    /// Replaces the schema's operators.
    ///
    /// The extend label named here supersedes any per-label `extend` flag.
    pub fn with_operators(mut self, operators: Operators) -> SchemaResult<Self> {
        if let Some(name) = &operators.label_to_extend {
            if !self.labels.contains_key(name) {
                return Err(SchemaError::undeclared_label("operators", name));
            }
        }
        for label in self.labels.values_mut() {
            label.extend = operators.label_to_extend.as_deref() == Some(label.name());
        }
        self.operators = operators;
        Ok(self)
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    pub fn label(&self, name: &str) -> Option<&LabelDef> {
        self.labels.get(name)
    }

    /// Labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &LabelDef> {
        self.labels.values()
    }

    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.get(name)
    }

    /// Parameters in declaration order
    pub fn params(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.values()
    }

    /// The extend dimension, if one is declared
    pub fn extend_label(&self) -> Option<&LabelDef> {
        self.operators
            .label_to_extend
            .as_deref()
            .and_then(|name| self.labels.get(name))
    }

    /// Axis of the extend dimension within `param`'s labels
    pub fn extend_axis(&self, param: &ParamDef) -> Option<usize> {
        self.operators
            .label_to_extend
            .as_deref()
            .and_then(|name| param.label_index(name))
    }

    /// Label definitions of `param`, in axis order
    pub fn param_labels<'a>(&'a self, param: &'a ParamDef) -> impl Iterator<Item = &'a LabelDef> + 'a {
        param.labels().iter().filter_map(move |name| self.labels.get(name))
    }

    /// Label values of a record key of `param`
    pub fn record_labels(&self, param: &ParamDef, positions: &[usize]) -> IndexMap<String, Scalar> {
        self.param_labels(param)
            .zip(positions)
            .filter_map(|(label, &pos)| {
                label
                    .value(pos)
                    .map(|value| (label.name().to_string(), value.clone()))
            })
            .collect()
    }

    /// Renders a record key as `[year=2017, marital_status=single]`.
    /// Unlabeled records render as an empty string.
    pub fn render_labels(&self, param: &ParamDef, positions: &[usize]) -> String {
        let labels = self.record_labels(param, positions);
        if labels.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = labels
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        format!("[{}]", parts.join(", "))
    }

    fn check_defaults(&self) -> SchemaResult<()> {
        for param in self.params.values() {
            for record in param.defaults() {
                let bounds = DefaultBounds {
                    registry: self,
                    param,
                    record,
                };
                let rendered = self.render_labels(param, &record.positions);
                for validator in param.validators() {
                    for element in record.value.elements() {
                        match validator.validate(param.name(), &rendered, element, &bounds) {
                            Some(violation) if violation.level == Level::Error => {
                                return Err(SchemaError::invalid_default(param.name(), violation.message));
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolves bounds of one default record against the declared defaults
struct DefaultBounds<'a> {
    registry: &'a SchemaRegistry,
    param: &'a ParamDef,
    record: &'a DefaultRecord,
}

impl BoundSource for DefaultBounds<'_> {
    fn resolve(&self, bound: &Bound) -> Vec<Scalar> {
        match bound {
            Bound::Value(value) => vec![value.clone()],
            Bound::Default => self.record.value.elements().to_vec(),
            Bound::Param(name) => {
                let Some(other) = self.registry.param(name) else {
                    return Vec::new();
                };
                other
                    .defaults()
                    .iter()
                    .filter(|d| {
                        other.labels().iter().zip(&d.positions).all(|(label, &position)| {
                            match self.param.label_index(label) {
                                Some(axis) => self.record.positions.get(axis) == Some(&position),
                                None => true,
                            }
                        })
                    })
                    .flat_map(|d| d.value.elements().to_vec())
                    .collect()
            }
        }
    }
}

fn resolve_extend_label(
    labels: &IndexMap<String, LabelDef>,
    from_operators: Option<&str>,
) -> SchemaResult<Option<String>> {
    let flagged: Vec<&str> = labels
        .values()
        .filter(|l| l.is_extend())
        .map(|l| l.name())
        .collect();
    if flagged.len() > 1 {
        return Err(SchemaError::multiple_extend_labels(&flagged));
    }

    if let Some(name) = from_operators {
        if !labels.contains_key(name) {
            return Err(SchemaError::undeclared_label("operators", name));
        }
        if let Some(&other) = flagged.first() {
            if other != name {
                return Err(SchemaError::multiple_extend_labels(&[other, name]));
            }
        }
        return Ok(Some(name.to_string()));
    }

    Ok(flagged.first().map(|name| name.to_string()))
}

fn build_param(
    name: &str,
    decl: &ParamDecl,
    labels: &IndexMap<String, LabelDef>,
    declared: &IndexMap<String, ParamDecl>,
) -> SchemaResult<ParamDef> {
    let value_type = ValueType::parse(&decl.type_name)
        .ok_or_else(|| SchemaError::unknown_type(name, &decl.type_name))?;
    if decl.number_dims > 1 {
        return Err(SchemaError::malformed(
            name,
            format!("number_dims must be 0 or 1, got {}", decl.number_dims),
        ));
    }

    let validators = build_validators(name, value_type, decl.number_dims, &decl.validators, declared)?;

    let mut param = ParamDef {
        name: name.to_string(),
        title: decl.title.clone(),
        description: decl.description.clone(),
        notes: decl.notes.clone(),
        value_type,
        number_dims: decl.number_dims,
        labels: Vec::new(),
        validators,
        indexed: decl.indexed,
        attributes: decl.attributes.clone(),
        defaults: Vec::new(),
    };
    build_defaults(&mut param, &decl.value, labels)?;
    Ok(param)
}

fn build_validators(
    name: &str,
    value_type: ValueType,
    number_dims: u8,
    decl: &ValidatorsDecl,
    declared: &IndexMap<String, ParamDecl>,
) -> SchemaResult<Vec<Validator>> {
    let mut validators = Vec::new();

    for range in [&decl.range, &decl.date_range].into_iter().flatten() {
        let bound = |raw: &Option<Value>| -> SchemaResult<Option<Bound>> {
            raw.as_ref()
                .map(|raw| parse_bound(name, value_type, raw, declared))
                .transpose()
        };
        validators.push(Validator::Range {
            min: bound(&range.min)?,
            max: bound(&range.max)?,
            level: range.level,
        });
    }

    if let Some(choice) = &decl.choice {
        let choices = choice
            .choices
            .iter()
            .map(|raw| value_type.coerce(raw))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaError::malformed(name, format!("choice validator: {}", e)))?;
        validators.push(Validator::Choice {
            choices,
            level: choice.level,
        });
    }

    if let Some(when) = &decl.when {
        validators.push(build_when(name, value_type, number_dims, when, declared)?);
    }

    Ok(validators)
}

fn build_when(
    name: &str,
    value_type: ValueType,
    number_dims: u8,
    decl: &WhenDecl,
    declared: &IndexMap<String, ParamDecl>,
) -> SchemaResult<Validator> {
    let (param, when_type) = if decl.param == DEFAULT_BOUND {
        (Bound::Default, value_type)
    } else {
        let other = declared
            .get(&decl.param)
            .ok_or_else(|| SchemaError::undefined_bound(name, &decl.param))?;
        let when_type = ValueType::parse(&other.type_name)
            .ok_or_else(|| SchemaError::unknown_type(decl.param.as_str(), &other.type_name))?;
        (Bound::Param(decl.param.clone()), when_type)
    };

    let is = parse_condition(name, when_type, &decl.is)?;
    let then = build_validators(name, value_type, number_dims, &decl.then, declared)?;
    let otherwise = build_validators(name, value_type, number_dims, &decl.otherwise, declared)?;

    // Branch validators compare element by element and cannot
    // reference vector values.
    for validator in then.iter().chain(&otherwise) {
        for bound in validator.bounds() {
            let vector = match bound {
                Bound::Default => number_dims > 0,
                Bound::Param(other) => declared.get(other).map_or(false, |p| p.number_dims > 0),
                Bound::Value(_) => false,
            };
            if vector {
                return Err(SchemaError::malformed(
                    name,
                    format!("{} is validated against {} in an invalid context", name, bound),
                ));
            }
        }
    }

    Ok(Validator::When {
        param,
        is,
        then,
        otherwise,
        level: decl.level,
    })
}

fn parse_condition(name: &str, value_type: ValueType, raw: &Value) -> SchemaResult<Condition> {
    let operand = |raw: &Value| {
        value_type
            .coerce(raw)
            .map_err(|e| SchemaError::malformed(name, format!("when condition: {}", e.message())))
    };

    let Value::Object(comparisons) = raw else {
        return Ok(Condition::equal_to(operand(raw)?));
    };
    let mut condition = Condition::default();
    for (comparison, raw) in comparisons {
        let slot = match comparison.as_str() {
            "equal_to" => &mut condition.equal_to,
            "less_than" => &mut condition.less_than,
            "greater_than" => &mut condition.greater_than,
            other => {
                return Err(SchemaError::malformed(
                    name,
                    format!("unknown when comparison '{}'", other),
                ))
            }
        };
        *slot = Some(operand(raw)?);
    }
    if condition == Condition::default() {
        return Err(SchemaError::malformed(name, "when condition is empty"));
    }
    Ok(condition)
}

fn parse_bound(
    name: &str,
    value_type: ValueType,
    raw: &Value,
    declared: &IndexMap<String, ParamDecl>,
) -> SchemaResult<Bound> {
    if let Value::String(s) = raw {
        if s == DEFAULT_BOUND {
            return Ok(Bound::Default);
        }
        if declared.contains_key(s) {
            return Ok(Bound::Param(s.clone()));
        }
    }

    // Integer parameters may still carry float sentinels such as 9e99.
    let literal = match value_type {
        ValueType::Int => value_type.coerce(raw).or_else(|_| ValueType::Float.coerce(raw)),
        _ => value_type.coerce(raw),
    };
    literal
        .map(Bound::Value)
        .map_err(|_| SchemaError::undefined_bound(name, display_raw(raw)))
}

fn build_defaults(
    param: &mut ParamDef,
    value: &Value,
    labels: &IndexMap<String, LabelDef>,
) -> SchemaResult<()> {
    let items = match value {
        Value::Array(items) if items.first().map_or(false, Value::is_object) => items,
        Value::Array(items) if items.is_empty() && !param.is_vector() => return Ok(()),
        other => {
            let value = param
                .coerce_value(other)
                .map_err(|e| SchemaError::invalid_default(param.name(), e.message()))?;
            param.defaults.push(DefaultRecord {
                positions: Vec::new(),
                value,
            });
            return Ok(());
        }
    };

    let mut label_set: Option<Vec<&str>> = None;
    let mut seen = HashSet::with_capacity(items.len());
    let mut defaults = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let record = item.as_object().ok_or_else(|| {
            SchemaError::invalid_default(param.name(), format!("record {} is not an object", index))
        })?;
        let raw_value = record.get("value").ok_or_else(|| {
            SchemaError::invalid_default(param.name(), format!("record {} has no value", index))
        })?;

        let mut keys: Vec<&str> = record
            .keys()
            .map(String::as_str)
            .filter(|k| *k != "value")
            .collect();
        keys.sort_unstable();

        match &label_set {
            None => {
                for key in &keys {
                    if !labels.contains_key(*key) {
                        return Err(SchemaError::undeclared_label(param.name(), key));
                    }
                }
                // Axis order follows label declaration order.
                param.labels = labels
                    .keys()
                    .filter(|name| keys.contains(&name.as_str()))
                    .cloned()
                    .collect();
                label_set = Some(keys);
            }
            Some(expected) if *expected != keys => {
                if let Some(key) = keys.iter().find(|k| !labels.contains_key(**k)) {
                    return Err(SchemaError::undeclared_label(param.name(), key));
                }
                return Err(SchemaError::inconsistent_labels(param.name(), index));
            }
            Some(_) => {}
        }

        let mut positions = Vec::with_capacity(param.labels.len());
        for name in &param.labels {
            let (label, raw) = match (labels.get(name), record.get(name)) {
                (Some(label), Some(raw)) => (label, raw),
                _ => return Err(SchemaError::undeclared_label(param.name(), name)),
            };
            let position = label.lookup(raw).ok_or_else(|| {
                SchemaError::invalid_default(
                    param.name(),
                    format!("{}={} is not a value of label '{}'", name, display_raw(raw), name),
                )
            })?;
            positions.push(position);
        }

        let value = param
            .coerce_value(raw_value)
            .map_err(|e| SchemaError::invalid_default(param.name(), e.message()))?;

        if !seen.insert(positions.clone()) {
            return Err(SchemaError::invalid_default(
                param.name(),
                format!("record {} repeats the labels of an earlier record", index),
            ));
        }
        defaults.push(DefaultRecord { positions, value });
    }

    param.defaults = defaults;
    Ok(())
}
