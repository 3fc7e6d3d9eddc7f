//! Observability subsystem for paramgrid
//!
//! Structured logging through `tracing`. Library code only emits events;
//! installing a subscriber is left to the binary.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. Every line names its [`Event`]
//!
//! # Usage
//!
//! ```ignore
//! use tracing::info;
//! use paramgrid::observability::Event;
//!
//! info!(event = %Event::QueryExecuted, records = 42, "query complete");
//! ```

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        // This just verifies no panic
        init_logging();
        init_logging();
    }
}
