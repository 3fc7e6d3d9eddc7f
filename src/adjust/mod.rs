//! Adjustment subsystem for paramgrid
//!
//! Validates caller-supplied updates and merges them into the store.
//!
//! # Design Principles
//!
//! - Every entry is validated before anything is written
//! - Problems are collected for the whole call, not raised one by one
//! - Invalid entries are rejected; valid entries are applied
//! - Input order decides between writes to the same record
//! - The active state is never changed by an adjustment

mod engine;
mod errors;
mod parser;

pub use engine::{AdjustOptions, AdjustReport, AdjustmentEngine};
pub use errors::{AdjustError, AdjustResult, ValidationError, ValidationErrorKind, ValidationErrors};
pub use parser::{parse_adjustments, parse_adjustments_str, Adjustment, AdjustmentMap, PartialRecord};
