//! Observable navigation state.
//!
//! [`NavigationState`] is owned exclusively by the controller.
//! [`NavigationSnapshot`] is the read-only view handed to hosts and invariant
//! checks; it never exposes the live screen itself.

use std::fmt;

use stella_core::{HistoryEntry, Params, RouteId};

use crate::Screen;

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Settled; a screen is live if a route is set.
    Idle,
    /// A transition is in flight and interaction is locked.
    Navigating,
    /// The last transition failed. Normally followed at once by a corrective
    /// navigation; only remains when the safe default itself failed.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Navigating => "navigating",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Mutable controller state.
///
/// # Invariants
///
/// - When settled, `current_screen` is `Some` iff `current_route` is `Some`
///   and `phase == Phase::Idle`.
pub(crate) struct NavigationState {
    pub(crate) current_route: Option<RouteId>,
    pub(crate) current_params: Params,
    pub(crate) current_screen: Option<Box<dyn Screen>>,
    pub(crate) phase: Phase,
}

impl NavigationState {
    pub(crate) fn new() -> Self {
        Self {
            current_route: None,
            current_params: Params::new(),
            current_screen: None,
            phase: Phase::Idle,
        }
    }

    /// Forget the current position after its screen was released.
    pub(crate) fn clear_current(&mut self) {
        self.current_route = None;
        self.current_params.clear();
        self.current_screen = None;
    }
}

/// Read-only view of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSnapshot {
    /// Current route. `None` before the first transition or after a fatal
    /// failure.
    pub current_route: Option<RouteId>,
    /// Parameters of the current route.
    pub current_params: Params,
    /// Controller phase.
    pub phase: Phase,
    /// A screen instance is live.
    pub has_live_screen: bool,
    /// Internal history, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Internal history capacity.
    pub history_limit: usize,
}
