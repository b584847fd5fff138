//! Invariant checking for simulated navigation.
//!
//! Invariants are properties that must hold whenever the controller has
//! settled, whatever sequence of navigations, failures and guard redirects led
//! there. Unlike scenario tests they say WHAT must be true, not how a
//! particular journey unfolds.
//!
//! # Architecture
//!
//! [`SystemSnapshot`] combines the controller's own view with what the
//! simulated host observed (surface interactability, live screen instances).
//! Registered [`Invariant`] checks then run against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.check_all(&host.snapshot())?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    HistoryBounded, InteractableWhenSettled, LiveScreenMatchesRoute, NeverSettlesNavigating,
    SingleLiveScreen,
};
pub use snapshot::SystemSnapshot;

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

/// A property checked against a settled system.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
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

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard navigation invariants.
    ///
    /// Includes:
    /// - [`LiveScreenMatchesRoute`]: a screen is live iff a route is current
    /// - [`NeverSettlesNavigating`]: no transition is left half done
    /// - [`HistoryBounded`]: internal history respects its capacity
    /// - [`InteractableWhenSettled`]: the surface is never left locked
    /// - [`SingleLiveScreen`]: at most one screen instance exists
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(LiveScreenMatchesRoute);
        registry.add(NeverSettlesNavigating);
        registry.add(HistoryBounded);
        registry.add(InteractableWhenSettled);
        registry.add(SingleLiveScreen);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on the first report.
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
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
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn fresh_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&SystemSnapshot::fresh(10)).is_ok());
    }
}
