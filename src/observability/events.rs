//! Observable events for paramgrid
//!
//! Every structured log line carries one of these as its `event` field.
//! Events are explicit and typed.

use std::fmt;

/// Observable events in paramgrid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Construction
    /// Schema declaration registered
    SchemaRegistered,
    /// Engine configuration loaded
    ConfigLoaded,
    /// Store populated from declared defaults
    StoreInitialized,

    // Extension
    /// Extension pass complete
    ExtendComplete,

    // State
    /// Active state updated
    StateSet,
    /// Active state reset to full domains
    StateCleared,

    // Adjustments
    /// Adjustment call begins
    AdjustBegin,
    /// Adjustment call complete
    AdjustComplete,
    /// Adjustment call surfaced validation failures
    AdjustRejected,
    /// Partial record matched no stored record
    AdjustEntrySkipped,
    /// Adjusted extend value lies outside the active state
    AdjustInactiveValue,

    // Reads
    /// Grid projection built
    ProjectionBuilt,
    /// Query executed
    QueryExecuted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreInitialized => "STORE_INITIALIZED",

            Event::ExtendComplete => "EXTEND_COMPLETE",

            Event::StateSet => "STATE_SET",
            Event::StateCleared => "STATE_CLEARED",

            Event::AdjustBegin => "ADJUST_BEGIN",
            Event::AdjustComplete => "ADJUST_COMPLETE",
            Event::AdjustRejected => "ADJUST_REJECTED",
            Event::AdjustEntrySkipped => "ADJUST_ENTRY_SKIPPED",
            Event::AdjustInactiveValue => "ADJUST_INACTIVE_VALUE",

            Event::ProjectionBuilt => "PROJECTION_BUILT",
            Event::QueryExecuted => "QUERY_EXECUTED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
