//! Grid projection subsystem for paramgrid
//!
//! # Design Principles
//!
//! - Grid shape is decided by the active state alone
//! - Projection never fills gaps; a missing record is an error
//! - `from_grid` is the exact inverse of `to_grid` and never writes

mod errors;
mod grid;
mod projector;

pub use errors::{ProjectionError, ProjectionResult};
pub use grid::{Axis, Grid};
pub use projector::ArrayProjector;
