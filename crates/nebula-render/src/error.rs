//! Error types for data loading.

use thiserror::Error;

/// Failures while loading data for a view.
///
/// Views render these as a retry-oriented empty state, never as a crash.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A page request failed.
    #[error("fetching battle page at tick {tick_start} failed: {source}")]
    Fetch {
        /// First tick requested
        tick_start: u64,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The battle has no entries.
    #[error("battle has no recorded ticks")]
    Empty,
}

impl LoadError {
    /// Returns true if retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
