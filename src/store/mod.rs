//! Value store subsystem for paramgrid
//!
//! The store is the single source of truth for parameter values.
//!
//! # Design Principles
//!
//! - One record per parameter per label tuple
//! - Records are keyed by domain position, never by raw value
//! - Iteration is in grid order
//! - Only the adjustment and extension passes mutate records

mod record;
mod values;

pub use record::{RecordKey, ValueRecord};
pub use values::{ParamRecords, ValueStore};
