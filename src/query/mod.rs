//! Query subsystem for paramgrid
//!
//! # Execution Flow (strict order)
//!
//! 1. Resolve filters to domain positions
//! 2. Intersect with the active state (unless disabled)
//! 3. Select matching records per parameter, in declaration order
//! 4. Drop parameters without matches (unless asked to keep them)

mod executor;
mod filters;
mod spec;

pub use executor::{QueryExecutor, QueryResult};
pub use filters::LabelFilter;
pub use spec::QuerySpec;
