//! Declaration records
//!
//! The raw shape of a schema document, parsed with serde. Nothing here is
//! validated beyond its JSON shape; [`super::registry::SchemaRegistry`]
//! turns these records into typed definitions.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::validator::Level;

/// A complete schema document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDecl {
    #[serde(default)]
    pub labels: IndexMap<String, LabelDecl>,
    #[serde(default)]
    pub operators: OperatorsDecl,
    #[serde(default)]
    pub parameters: IndexMap<String, ParamDecl>,
}

/// Engine switches declared next to the labels
///
/// Unrecognized operators are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorsDecl {
    #[serde(default)]
    pub label_to_extend: Option<String>,
    #[serde(default)]
    pub uses_extend_func: bool,
}

/// A label declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelDecl {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub validators: ValidatorsDecl,
    /// Marks this label as the extend dimension
    #[serde(default)]
    pub extend: bool,
}

/// The closed set of validator declarations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorsDecl {
    #[serde(default)]
    pub range: Option<RangeDecl>,
    #[serde(default)]
    pub date_range: Option<RangeDecl>,
    #[serde(default)]
    pub choice: Option<ChoiceDecl>,
    /// Parameters only
    #[serde(default)]
    pub when: Option<Box<WhenDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeDecl {
    #[serde(default)]
    pub min: Option<Value>,
    #[serde(default)]
    pub max: Option<Value>,
    /// Only meaningful on labels, where it spaces the enumerated domain
    #[serde(default)]
    pub step: Option<Value>,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceDecl {
    pub choices: Vec<Value>,
    #[serde(default)]
    pub level: Level,
}

/// A conditional validator.
///
/// `is` is either a literal to compare for equality or an object with any of
/// `equal_to`, `less_than` and `greater_than`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhenDecl {
    pub param: String,
    pub is: Value,
    #[serde(default)]
    pub then: ValidatorsDecl,
    #[serde(default)]
    pub otherwise: ValidatorsDecl,
    #[serde(default)]
    pub level: Level,
}

/// A parameter declaration
///
/// Keys other than the ones below are kept as free-form attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamDecl {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub number_dims: u8,
    pub value: Value,
    #[serde(default)]
    pub validators: ValidatorsDecl,
    #[serde(default)]
    pub indexed: bool,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}
