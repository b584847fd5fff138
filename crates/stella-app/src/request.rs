//! Navigation requests.
//!
//! This module defines [`NavRequest`], the set of inputs that drive the
//! [`crate::NavigationController`] when they arrive through a
//! [`crate::Navigator`] rather than a direct call.
//!
//! Requests originate from two distinct sources:
//! - Screens issuing programmatic navigation while they are live.
//! - The host translating user and platform events (link activation, native
//!   back/forward, deep links).

use stella_core::{HistoryState, Params, RouteId};

/// Requests processed by the navigation controller, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    /// Navigate to a route.
    Navigate {
        /// Target route.
        route: RouteId,
        /// Navigation parameters.
        params: Params,
        /// Record the transition in internal and native history.
        record_history: bool,
    },

    /// Go back one internal history entry.
    Back,

    /// Native back/forward event carrying the entry's state object.
    PopState(Option<HistoryState>),

    /// Externally supplied URL.
    DeepLink(String),

    /// Activated UI element tagged with a route and a `k=v&k=v` parameter
    /// string.
    Link {
        /// Target route.
        route: RouteId,
        /// Raw parameter string.
        params: String,
    },

    /// Floating action button pressed.
    ActionButton,

    /// Bottom navigation tab selected.
    Tab(RouteId),

    /// Stop serving requests.
    Shutdown,
}
