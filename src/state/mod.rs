//! Active state subsystem for paramgrid
//!
//! The state narrows each label to a selected subset of its domain. It scopes
//! queries, grid projections and the extension step of adjustments.
//!
//! # Design Principles
//!
//! - Only explicit state calls change the state
//! - Selections are validated atomically
//! - Selections are kept in domain order without duplicates

mod errors;
mod view;

pub use errors::{LabelError, LabelResult};
pub use view::{selections_from_json, Selections, StateView};
