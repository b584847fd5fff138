//! Error types for the navigation controller.
//!
//! Guard redirects and recoverable transition failures are resolved inside
//! the controller and never reach callers. What does reach them is either a
//! configuration invariant violation or the safe default route failing.

use std::{fmt, time::Duration};

use stella_core::RouteId;
use thiserror::Error;

use crate::{ScreenError, SurfaceError};

/// Lifecycle step at which a transition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Releasing the outgoing screen.
    Cleanup,
    /// Building the incoming screen.
    Construct,
    /// Rendering the incoming screen.
    Render,
    /// Applying rendered output to the surface.
    Apply,
    /// Initializing the incoming screen.
    Init,
    /// Warming a screen outside any transition.
    Preload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cleanup => "cleanup",
            Self::Construct => "construct",
            Self::Render => "render",
            Self::Apply => "apply",
            Self::Init => "init",
            Self::Preload => "preload",
        };
        f.write_str(label)
    }
}

/// Why a lifecycle step failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The screen or its factory returned an error
    #[error(transparent)]
    Screen(#[from] ScreenError),

    /// The surface rejected the rendered output
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// The step did not finish within the step timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A screen transition that could not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} of route {route} failed: {cause}")]
pub struct TransitionFailure {
    /// Route being entered (or left, for [`Stage::Cleanup`]).
    pub route: RouteId,
    /// Failing step.
    pub stage: Stage,
    /// Underlying cause.
    pub cause: FailureCause,
}

impl TransitionFailure {
    /// Create a transition failure.
    pub fn new(route: RouteId, stage: Stage, cause: impl Into<FailureCause>) -> Self {
        Self { route, stage, cause: cause.into() }
    }
}

/// Errors returned by navigation entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The safe default route is not registered
    #[error("safe default route {0} is not registered")]
    MissingSafeDefault(RouteId),

    /// The login route is not registered
    #[error("login route {0} is not registered")]
    MissingLoginRoute(RouteId),

    /// Guard redirects did not settle on an admitted route
    #[error("guard redirects for {route} did not settle after {hops} hops")]
    RedirectLoop {
        /// Last redirect target
        route: RouteId,
        /// Redirects followed
        hops: usize,
    },

    /// A guard redirected to a route that is not registered
    #[error("guard redirect target {route} is not registered")]
    UnknownRedirect {
        /// Redirect target
        route: RouteId,
    },

    /// The safe default route's own screen could not be shown
    #[error("safe default route could not be shown: {0}")]
    Fatal(TransitionFailure),
}

impl NavigationError {
    /// Returns true if this error reflects a broken route table or role
    /// mapping rather than a runtime screen failure.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_stage_and_route() {
        let failure = TransitionFailure::new(
            RouteId::new("broken-route"),
            Stage::Init,
            ScreenError::new("listener exploded"),
        );
        assert_eq!(failure.to_string(), "init of route broken-route failed: listener exploded");
    }

    #[test]
    fn only_fatal_is_not_configuration() {
        let failure = TransitionFailure::new(
            RouteId::new("customer-home"),
            Stage::Render,
            FailureCause::Timeout(Duration::from_millis(5)),
        );
        assert!(!NavigationError::Fatal(failure).is_configuration());
        let missing = NavigationError::MissingSafeDefault(RouteId::new("customer-home"));
        assert!(missing.is_configuration());
        assert!(
            NavigationError::RedirectLoop { route: RouteId::new("login"), hops: 4 }
                .is_configuration()
        );
        assert!(
            NavigationError::UnknownRedirect { route: RouteId::new("shopkeeper-dashboard") }
                .is_configuration()
        );
    }

    #[test]
    fn preload_failure_names_preload_step() {
        let failure = TransitionFailure::new(
            RouteId::new("cart"),
            Stage::Preload,
            ScreenError::new("cache unavailable"),
        );
        assert_eq!(failure.to_string(), "preload of route cart failed: cache unavailable");
    }
}
