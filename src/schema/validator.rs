//! Value validators for parameters
//!
//! Validators are a closed set:
//! - range: inclusive `min` / `max` bounds (also declared as `date_range`)
//! - choice: membership in a fixed list
//! - when: picks `then` or `otherwise` validators by testing another
//!   parameter's value (or the parameter's own stored value) against a
//!   condition
//!
//! A range bound is a literal, the name of another parameter, or `"default"`
//! (the parameter's own stored value). Non-literal bounds are resolved by the
//! caller through [`BoundSource`], so a validator never reads the store itself.
//!
//! Each validator carries a level. `error` violations reject the value;
//! `warn` violations are reported separately and only block the value when
//! the caller does not ignore warnings.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::Scalar;

/// Severity of a validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warn,
    #[default]
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// One end of a range validator
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// A literal value
    Value(Scalar),
    /// Values of another parameter at matching labels
    Param(String),
    /// The parameter's own stored value at the same labels
    Default,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Value(v) => write!(f, "{}", v),
            Bound::Param(name) => write!(f, "{}", name),
            Bound::Default => write!(f, "default"),
        }
    }
}

/// Resolves bounds to the concrete values a record must be compared against.
pub trait BoundSource {
    fn resolve(&self, bound: &Bound) -> Vec<Scalar>;
}

/// Test of a `when` validator against the referenced value
///
/// Every given comparison must hold. A condition with none never holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub equal_to: Option<Scalar>,
    pub less_than: Option<Scalar>,
    pub greater_than: Option<Scalar>,
}

impl Condition {
    pub fn equal_to(value: Scalar) -> Self {
        Self {
            equal_to: Some(value),
            ..Self::default()
        }
    }

    pub fn matches(&self, value: &Scalar) -> bool {
        let mut tested = false;
        let checks = [
            (&self.equal_to, Ordering::Equal),
            (&self.less_than, Ordering::Less),
            (&self.greater_than, Ordering::Greater),
        ];
        for (operand, wanted) in checks {
            if let Some(operand) = operand {
                tested = true;
                if value.compare(operand) != Some(wanted) {
                    return false;
                }
            }
        }
        tested
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = &self.equal_to {
            parts.push(v.to_string());
        }
        if let Some(v) = &self.less_than {
            parts.push(format!("less than {}", v));
        }
        if let Some(v) = &self.greater_than {
            parts.push(format!("greater than {}", v));
        }
        write!(f, "{}", parts.join(" and "))
    }
}

/// Kind of validator that rejected a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Range,
    Choice,
}

/// A failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub level: Level,
    pub message: String,
}

/// A parameter value validator
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    Range {
        min: Option<Bound>,
        max: Option<Bound>,
        level: Level,
    },
    Choice {
        choices: Vec<Scalar>,
        level: Level,
    },
    When {
        /// Referenced value: another parameter, or `Default` for the
        /// parameter's own stored value
        param: Bound,
        is: Condition,
        then: Vec<Validator>,
        otherwise: Vec<Validator>,
        level: Level,
    },
}

impl Validator {
    /// Every bound this validator resolves, nested `when` branches included
    pub fn bounds(&self) -> Vec<&Bound> {
        match self {
            Validator::Range { min, max, .. } => min.iter().chain(max.iter()).collect(),
            Validator::Choice { .. } => Vec::new(),
            Validator::When {
                param,
                then,
                otherwise,
                ..
            } => std::iter::once(param)
                .chain(then.iter().chain(otherwise).flat_map(Validator::bounds))
                .collect(),
        }
    }

    /// Validates one value element of `param`.
    ///
    /// `labels` is a rendered label suffix used in messages, e.g.
    /// `[year=2017, marital_status=single]`.
    pub fn validate(
        &self,
        param: &str,
        labels: &str,
        input: &Scalar,
        bounds: &dyn BoundSource,
    ) -> Option<Violation> {
        match self {
            Validator::Range { min, max, level } => {
                if let Some(bound) = min {
                    for value in bounds.resolve(bound) {
                        if input.compare(&value) == Some(Ordering::Less) {
                            return Some(Violation {
                                kind: ViolationKind::Range,
                                level: *level,
                                message: format!(
                                    "{}{} {} < min {}{}",
                                    param,
                                    labels,
                                    input,
                                    value,
                                    reference_suffix(bound)
                                ),
                            });
                        }
                    }
                }
                if let Some(bound) = max {
                    for value in bounds.resolve(bound) {
                        if input.compare(&value) == Some(Ordering::Greater) {
                            return Some(Violation {
                                kind: ViolationKind::Range,
                                level: *level,
                                message: format!(
                                    "{}{} {} > max {}{}",
                                    param,
                                    labels,
                                    input,
                                    value,
                                    reference_suffix(bound)
                                ),
                            });
                        }
                    }
                }
                None
            }
            Validator::Choice { choices, level } => {
                if choices.iter().any(|c| c == input) {
                    return None;
                }
                // Long choice lists are left out of the message.
                let listed = if choices.len() < 20 {
                    let rendered: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
                    format!(" [{}]", rendered.join(", "))
                } else {
                    String::new()
                };
                let suffix = if labels.is_empty() {
                    String::new()
                } else {
                    format!(" for labels {}", labels)
                };
                Some(Violation {
                    kind: ViolationKind::Choice,
                    level: *level,
                    message: format!(
                        "{} \"{}\" must be in list of choices{}{}.",
                        param, input, listed, suffix
                    ),
                })
            }
            Validator::When {
                param: when,
                is,
                then,
                otherwise,
                level,
            } => {
                let subject = match when {
                    Bound::Default => param.to_string(),
                    other => other.to_string(),
                };
                for value in bounds.resolve(when) {
                    let (branch, verb) = if is.matches(&value) {
                        (then, "is")
                    } else {
                        (otherwise, "is not")
                    };
                    for validator in branch {
                        let Some(inner) = validator.validate(param, labels, input, bounds) else {
                            continue;
                        };
                        // A warn-level `when` softens everything below it.
                        let level = match level {
                            Level::Warn => Level::Warn,
                            Level::Error => inner.level,
                        };
                        return Some(Violation {
                            kind: inner.kind,
                            level,
                            message: format!(
                                "When {} {} {}, {}{} value is invalid: {}",
                                subject, verb, is, param, labels, inner.message
                            ),
                        });
                    }
                }
                None
            }
        }
    }
}

fn reference_suffix(bound: &Bound) -> String {
    match bound {
        Bound::Value(_) => String::new(),
        other => format!(" {}", other),
    }
}
