//! Configuration for a parse session.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::simd::Backend;
use crate::WINDOW;

/// Configuration for a [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParserConfig {
    /// Update statistics on every call (default: on with the `statistics` feature)
    pub collect_statistics: bool,
    /// Largest `total_skip` with its own histogram bucket (default: 16, capped at 255)
    pub max_total_skip: usize,
    /// Force a back-end instead of detecting one (default: None)
    pub backend: Option<Backend>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            collect_statistics: cfg!(feature = "statistics"),
            max_total_skip: WINDOW,
            backend: None,
        }
    }
}

impl ParserConfig {
    /// Configuration for profiling runs: statistics on.
    pub fn profiling() -> Self {
        Self {
            collect_statistics: true,
            ..Self::default()
        }
    }

    /// Turn statistics collection on or off.
    pub fn with_statistics(mut self, collect: bool) -> Self {
        self.collect_statistics = collect;
        self
    }

    /// Set the histogram bound.
    pub fn with_max_total_skip(mut self, max_total_skip: usize) -> Self {
        self.max_total_skip = max_total_skip;
        self
    }

    /// Force a back-end.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }
}
