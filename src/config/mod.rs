//! Configuration subsystem for paramgrid
//!
//! # Design Principles
//!
//! - One optional JSON file, loaded and validated once at startup
//! - Unknown keys are rejected
//! - Operators in the file override the schema's
//! - Rates and initial state are checked against the schema before use

mod errors;
mod loader;

pub use errors::{ConfigError, ConfigResult};
pub use loader::EngineConfig;
