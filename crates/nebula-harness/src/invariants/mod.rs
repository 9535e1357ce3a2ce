//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must hold after every event the runtime
//! processes, whatever order transports open, fail and deliver messages in.
//!
//! # Architecture
//!
//! The simulation driver extracts observable state from the dispatcher and
//! its own transport bookkeeping into a [`ClientSnapshot`], then runs every
//! registered [`Invariant`] against it on each render.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let driver = SimDriver::new().with_invariants(registry);
//! ```

mod checks;
mod snapshot;

pub use checks::{
    BoundedBuffers, ConnectedMatchesStatus, LogNewestFirst, ReconnectDelayBounded, ReplacedNeverReconnects,
    SingleLiveTransport,
};
pub use snapshot::ClientSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against client state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &ClientSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvariantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.invariants.iter().map(|inv| inv.name())).finish()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard client invariants.
    ///
    /// Includes:
    /// - [`BoundedBuffers`]: chat and log never exceed their capacity
    /// - [`LogNewestFirst`]: log ids strictly decrease front to back
    /// - [`SingleLiveTransport`]: at most one transport is open
    /// - [`ReplacedNeverReconnects`]: a replaced session has no timer armed
    /// - [`ReconnectDelayBounded`]: every scheduled delay is within the cap
    /// - [`ConnectedMatchesStatus`]: the connected flag tracks the status
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(BoundedBuffers);
        registry.add(LogNewestFirst);
        registry.add(SingleLiveTransport);
        registry.add(ReplacedNeverReconnects);
        registry.add(ReconnectDelayBounded::default());
        registry.add(ConnectedMatchesStatus);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &ClientSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    #[allow(clippy::panic, reason = "assertion helper for tests")]
    pub fn assert_all(&self, state: &ClientSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&ClientSnapshot::default()).is_ok());
    }

    #[test]
    fn all_violations_are_reported() {
        let registry = InvariantRegistry::standard();
        let snapshot =
            ClientSnapshot { chat_len: 500, log_ids: vec![1, 2], ..ClientSnapshot::default() };

        let violations = registry.check_all(&snapshot).unwrap_err();
        let names: Vec<_> = violations.iter().map(|v| v.invariant).collect();
        assert_eq!(names, ["bounded_buffers", "log_newest_first"]);
    }

    #[test]
    #[should_panic(expected = "Invariant violation after step 3")]
    fn assert_all_panics_with_context() {
        let registry = InvariantRegistry::standard();
        let snapshot = ClientSnapshot { live_transports: 2, ..ClientSnapshot::default() };
        registry.assert_all(&snapshot, "after step 3");
    }
}
