//! Engine configuration file
//!
//! A JSON document next to the schema:
//!
//! ```json
//! {
//!   "label_to_extend": "year",
//!   "uses_extend_func": true,
//!   "index_rates": {"2013": 0.0148, "2014": 0.0159},
//!   "initial_state": {"marital_status": "single"}
//! }
//! ```
//!
//! Every key is optional. Operators set here override the schema's.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::errors::{ConfigError, ConfigResult};
use crate::extend::IndexRates;
use crate::observability::Event;
use crate::schema::{Operators, SchemaRegistry};
use crate::state::{selections_from_json, Selections};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Label along which missing values are filled
    #[serde(default)]
    pub label_to_extend: Option<String>,

    /// Index `indexed` parameters while extending
    #[serde(default)]
    pub uses_extend_func: Option<bool>,

    /// Rate per extend-label value, keyed by the value as written
    #[serde(default)]
    pub index_rates: IndexMap<String, f64>,

    /// State applied before anything else
    #[serde(default)]
    pub initial_state: Map<String, Value>,
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;

        debug!(
            event = %Event::ConfigLoaded,
            path = %path.display(),
            rates = config.index_rates.len(),
            "config loaded"
        );
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what can be checked without a schema.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(name) = &self.label_to_extend {
            if name.is_empty() {
                return Err(ConfigError::Invalid("label_to_extend must not be empty".into()));
            }
        }
        for (key, rate) in &self.index_rates {
            if !rate.is_finite() || *rate <= -1.0 {
                return Err(ConfigError::Invalid(format!(
                    "index rate for {} must be a finite number above -1, got {}",
                    key, rate
                )));
            }
        }
        Ok(())
    }

    /// The schema's operators with this file's overrides applied
    pub fn operators(&self, base: &Operators) -> Operators {
        Operators {
            label_to_extend: self
                .label_to_extend
                .clone()
                .or_else(|| base.label_to_extend.clone()),
            uses_extend_func: self.uses_extend_func.unwrap_or(base.uses_extend_func),
        }
    }

    /// Resolves `index_rates` against the registry's extend label.
    ///
    /// When indexing is on, every extend value but the last needs a rate.
    pub fn index_rates(&self, registry: &SchemaRegistry) -> ConfigResult<IndexRates> {
        let mut rates = IndexRates::new();
        let Some(label) = registry.extend_label() else {
            if !self.index_rates.is_empty() {
                return Err(ConfigError::Invalid(
                    "index_rates given but no label is extended".into(),
                ));
            }
            return Ok(rates);
        };

        for (key, rate) in &self.index_rates {
            let position = label.lookup(&Value::String(key.clone())).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "index rate key {} is not a value of label {}",
                    key,
                    label.name()
                ))
            })?;
            rates.insert(position, *rate);
        }

        if registry.operators().uses_extend_func {
            let missing: Vec<String> = rates
                .missing(label.len())
                .into_iter()
                .filter_map(|p| label.value(p).map(ToString::to_string))
                .collect();
            if !missing.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "index_rates has no rate for {}: {}",
                    label.name(),
                    missing.join(", ")
                )));
            }
        }
        Ok(rates)
    }

    /// Parses `initial_state` against the registry
    pub fn initial_state(&self, registry: &SchemaRegistry) -> ConfigResult<Selections> {
        Ok(selections_from_json(
            registry,
            &Value::Object(self.initial_state.clone()),
        )?)
    }
}
