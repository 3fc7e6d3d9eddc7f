//! paramgrid - a schema-driven store for labeled, multi-dimensional parameters
//!
//! Parameters vary over labels (a year, a filing status, ...). The engine
//! validates values against the schema, fills them along one ordered label,
//! merges adjustments, and projects parameters to and from dense grids.

pub mod adjust;
pub mod cli;
pub mod config;
pub mod extend;
pub mod observability;
pub mod parameters;
pub mod projector;
pub mod query;
pub mod schema;
pub mod state;
pub mod store;

pub use parameters::Parameters;
