//! Query specification

use crate::schema::Scalar;
use crate::state::Selections;

/// Which records a query returns
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Allowed values per label. Unnamed labels match anything.
    pub filters: Selections,
    /// Intersect the filters with the active state
    pub use_state: bool,
    /// Keep parameters with no matching record in the result
    pub include_empty: bool,
    /// Restrict the result to these parameters
    pub params: Option<Vec<String>>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filters: Selections::new(),
            use_state: true,
            include_empty: false,
            params: None,
        }
    }
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows only `values` for `label`
    pub fn filter(mut self, label: impl Into<String>, values: impl IntoIterator<Item = Scalar>) -> Self {
        self.filters.insert(label.into(), values.into_iter().collect());
        self
    }

    pub fn with_filters(mut self, filters: Selections) -> Self {
        self.filters = filters;
        self
    }

    pub fn use_state(mut self, use_state: bool) -> Self {
        self.use_state = use_state;
        self
    }

    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }
}
