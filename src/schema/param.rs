//! Parameter definitions

use indexmap::IndexMap;
use serde_json::Value;

use super::types::{CoercionError, ParamValue, ValueType};
use super::validator::Validator;

/// A default value record, keyed by the domain position of each of the
/// parameter's labels
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultRecord {
    pub positions: Vec<usize>,
    pub value: ParamValue,
}

/// A declared parameter. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub(super) name: String,
    pub(super) title: Option<String>,
    pub(super) description: Option<String>,
    pub(super) notes: Option<String>,
    pub(super) value_type: ValueType,
    pub(super) number_dims: u8,
    pub(super) labels: Vec<String>,
    pub(super) validators: Vec<Validator>,
    pub(super) indexed: bool,
    pub(super) attributes: IndexMap<String, Value>,
    pub(super) defaults: Vec<DefaultRecord>,
}

impl ParamDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// 0 for scalar values, 1 for vectors
    pub fn number_dims(&self) -> u8 {
        self.number_dims
    }

    pub fn is_vector(&self) -> bool {
        self.number_dims == 1
    }

    /// Labels this parameter varies over, in label declaration order.
    /// This is also the axis order of its grid projection.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Axis index of `label`, if this parameter varies over it
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Participates in indexing during extension
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Free-form attributes carried through from the declaration
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn defaults(&self) -> &[DefaultRecord] {
        &self.defaults
    }

    /// Coerces a raw value to this parameter's type and shape
    pub fn coerce_value(&self, raw: &Value) -> Result<ParamValue, CoercionError> {
        match (self.is_vector(), raw) {
            (true, Value::Array(items)) => items
                .iter()
                .map(|item| self.value_type.coerce(item))
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Vector),
            (true, other) => Err(CoercionError::not_a_list(other)),
            (false, Value::Array(_)) => Err(CoercionError::unexpected_list(raw)),
            (false, other) => self.value_type.coerce(other).map(ParamValue::Scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Scalar;
    use serde_json::json;

    fn param(number_dims: u8) -> ParamDef {
        ParamDef {
            name: "brackets".to_string(),
            title: None,
            description: None,
            notes: None,
            value_type: ValueType::Float,
            number_dims,
            labels: vec!["year".to_string()],
            validators: Vec::new(),
            indexed: false,
            attributes: IndexMap::new(),
            defaults: Vec::new(),
        }
    }

    #[test]
    fn test_coerce_scalar() {
        let p = param(0);
        assert_eq!(p.coerce_value(&json!("3000")).unwrap(), ParamValue::from(3000.0));
        assert!(p.coerce_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_coerce_vector() {
        let p = param(1);
        assert_eq!(
            p.coerce_value(&json!([1, "2.5"])).unwrap(),
            ParamValue::Vector(vec![Scalar::Float(1.0), Scalar::Float(2.5)])
        );
        let err = p.coerce_value(&json!(4)).unwrap_err();
        assert!(err.message().starts_with("Not a valid list"));
        assert!(p.coerce_value(&json!([1, "x"])).is_err());
    }

    #[test]
    fn test_label_index() {
        let p = param(0);
        assert_eq!(p.label_index("year"), Some(0));
        assert_eq!(p.label_index("marital_status"), None);
    }
}
