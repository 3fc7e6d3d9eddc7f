//! Value type definitions for labels and parameters
//!
//! Supported types:
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - bool: Boolean
//! - str: UTF-8 string
//! - date: calendar date, written as `YYYY-MM-DD`
//!
//! Raw JSON values are coerced into these types at the parsing boundary.
//! Numeric text (`"3000"`) is accepted for numeric types; anything else that
//! does not fit the declared type is a coercion failure.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared value type of a label or parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    Str,
    /// Calendar date
    Date,
}

impl ValueType {
    /// Parses a declared type name. Returns `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ValueType::Int),
            "float" => Some(ValueType::Float),
            "bool" => Some(ValueType::Bool),
            "str" => Some(ValueType::Str),
            "date" => Some(ValueType::Date),
            _ => None,
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
            ValueType::Date => "date",
        }
    }

    /// Whether values of this type project onto a numeric grid
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float | ValueType::Bool)
    }

    /// Coerces a raw JSON value into a scalar of this type.
    pub fn coerce(&self, raw: &Value) -> Result<Scalar, CoercionError> {
        let coerced = match (self, raw) {
            (ValueType::Int, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral))
                .map(Scalar::Int),
            (ValueType::Int, Value::String(s)) => parse_int(s).map(Scalar::Int),
            (ValueType::Float, Value::Number(n)) => {
                n.as_f64().filter(|f| f.is_finite()).map(Scalar::Float)
            }
            (ValueType::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Scalar::Float),
            (ValueType::Bool, Value::Bool(b)) => Some(Scalar::Bool(*b)),
            (ValueType::Bool, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Scalar::Bool(false)),
                Some(1) => Some(Scalar::Bool(true)),
                _ => None,
            },
            (ValueType::Bool, Value::String(s)) => parse_bool(s).map(Scalar::Bool),
            (ValueType::Str, Value::String(s)) => Some(Scalar::Str(s.clone())),
            (ValueType::Date, Value::String(s)) => {
                NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .ok()
                    .map(Scalar::Date)
            }
            _ => None,
        };

        coerced.ok_or_else(|| CoercionError::new(*self, raw))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(integral))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A raw value that does not fit its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    message: String,
}

impl CoercionError {
    /// Creates an error for `raw` not fitting `expected`
    pub fn new(expected: ValueType, raw: &Value) -> Self {
        let input = display_raw(raw);
        let message = match expected {
            ValueType::Int | ValueType::Float => format!("Not a valid number: {}.", input),
            ValueType::Bool => format!("Not a valid boolean: {}.", input),
            ValueType::Date => format!("Not a valid date: {}.", input),
            ValueType::Str => format!("Not a valid string: {}.", input),
        };
        Self { message }
    }

    /// Creates an error for a vector-valued parameter given a non-list value
    pub fn not_a_list(raw: &Value) -> Self {
        Self {
            message: format!("Not a valid list: {}.", display_raw(raw)),
        }
    }

    /// Creates an error for a scalar parameter given a list value
    pub fn unexpected_list(raw: &Value) -> Self {
        Self {
            message: format!("Expected a single value, got a list: {}.", display_raw(raw)),
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CoercionError {}

/// Renders a raw value without JSON quoting for strings
pub(crate) fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A single typed value: a label value or one parameter value element
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Date(NaiveDate),
}

impl Scalar {
    /// Returns the type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Scalar::Int(_) => ValueType::Int,
            Scalar::Float(_) => ValueType::Float,
            Scalar::Bool(_) => ValueType::Bool,
            Scalar::Str(_) => ValueType::Str,
            Scalar::Date(_) => ValueType::Date,
        }
    }

    /// Numeric view of this value. Booleans map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Str(_) | Scalar::Date(_) => None,
        }
    }

    /// Orders two values of comparable types.
    ///
    /// Int and Float compare numerically with each other; strings and dates
    /// compare only with their own kind. Anything else is incomparable.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            (Scalar::Date(a), Scalar::Date(b)) => Some(a.cmp(b)),
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int(_) | Scalar::Float(_), Scalar::Int(_) | Scalar::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => None,
        }
    }

    /// Converts back into a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => Value::from(*f),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Str(s) => Value::String(s.clone()),
            Scalar::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Str(s) => serializer.serialize_str(s),
            Scalar::Date(d) => serializer.serialize_str(&d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(v)
    }
}

/// A parameter value: one scalar, or a vector for parameters with
/// `number_dims == 1`
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    Vector(Vec<Scalar>),
}

impl ParamValue {
    /// Returns the scalar if this is not a vector
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            ParamValue::Vector(_) => None,
        }
    }

    /// All elements, in order. A scalar is a single element.
    pub fn elements(&self) -> &[Scalar] {
        match self {
            ParamValue::Scalar(s) => std::slice::from_ref(s),
            ParamValue::Vector(v) => v,
        }
    }

    /// Applies `f` to every element, keeping the shape
    pub fn map(&self, f: impl Fn(&Scalar) -> Scalar) -> ParamValue {
        match self {
            ParamValue::Scalar(s) => ParamValue::Scalar(f(s)),
            ParamValue::Vector(v) => ParamValue::Vector(v.iter().map(f).collect()),
        }
    }

    /// Converts back into a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Scalar(s) => s.to_json(),
            ParamValue::Vector(v) => Value::Array(v.iter().map(Scalar::to_json).collect()),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Scalar(s) => s.serialize(serializer),
            ParamValue::Vector(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for element in v {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
        }
    }
}

impl From<Scalar> for ParamValue {
    fn from(v: Scalar) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec<Scalar>> for ParamValue {
    fn from(v: Vec<Scalar>) -> Self {
        ParamValue::Vector(v)
    }
}

macro_rules! param_value_from {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                ParamValue::Scalar(Scalar::from(v))
            }
        })*
    };
}

param_value_from!(i64, i32, f64, bool, &str, String, NaiveDate);
