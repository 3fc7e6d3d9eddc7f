//! Extension subsystem for paramgrid
//!
//! Fills every value of the extend label for every combination of a
//! parameter's other labels that has at least one record.
//!
//! # Design Principles
//!
//! - Extension never rejects data, it only fills
//! - Existing records are never rewritten
//! - Re-running over the same domain is a no-op
//! - Indexing is opt-in per schema and per parameter

mod extender;
mod rates;

pub use extender::Extender;
pub use rates::{round_cents, IndexRates, VALUE_CEILING};
