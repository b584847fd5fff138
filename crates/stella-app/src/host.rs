//! Host collaborators.
//!
//! The controller never reaches for ambient globals. Everything it drives is
//! handed to it once, at construction, through an explicit [`AppContext`].
//! Each frontend implements these traits for its platform, while the
//! simulation harness implements them with recorders.
//!
//! # Write ownership
//!
//! The rendering surface, the chrome and the native history are written only
//! by the controller. Chrome is updated after the incoming screen is live,
//! never before.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use stella_core::{ChromeSpec, Clock, Location, Role, RouteId, SessionContext};
use thiserror::Error;

use crate::RenderOutput;

/// Read-only access to the current user session.
///
/// The controller only reacts to session state, it never mutates it.
pub trait SessionProvider: Send + Sync {
    /// Session belongs to a signed-in user.
    fn is_authenticated(&self) -> bool;

    /// Role tag of the signed-in user.
    fn current_role(&self) -> Option<Role>;

    /// Landing route for a role. Signed-out sessions get their own landing
    /// route regardless of `role`.
    fn role_default_route(&self, role: Option<&Role>) -> RouteId;

    /// Snapshot of the session for guard evaluation.
    fn context(&self) -> SessionContext {
        SessionContext { authenticated: self.is_authenticated(), role: self.current_role() }
    }
}

/// Failure to apply rendered output to the surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("render surface unavailable: {0}")]
pub struct SurfaceError(pub String);

/// The single logical container screens render into.
pub trait RenderSurface: Send + Sync {
    /// Replace the surface content with `output`.
    fn apply(&self, output: RenderOutput) -> Result<(), SurfaceError>;

    /// Enable or disable user interaction (and its visual treatment).
    fn set_interactable(&self, interactable: bool);

    /// Scroll the surface back to the top.
    fn scroll_to_top(&self);
}

/// Persistent navigation chrome: bottom bar, action button and titles.
pub trait ChromeController: Send + Sync {
    /// Show or hide the bottom bar and action button.
    fn set_visibility(&self, chrome: ChromeSpec);

    /// Set the visible screen title.
    fn set_title(&self, title: &str);

    /// Set the document (window/tab) title.
    fn set_document_title(&self, _title: &str) {}

    /// Highlight `route` in the bottom bar.
    fn set_active_tab(&self, _route: &RouteId) {}
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational.
    Info,
    /// Operation succeeded.
    Success,
    /// Degraded but usable.
    Warning,
    /// Operation failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Non-blocking user-visible notifications.
pub trait Notifier: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str, severity: Severity);
}

/// The host's native history (e.g. the browser's history and address bar).
///
/// Native back/forward events must be fed back into the controller through
/// [`crate::NavigationController::handle_pop_state`]; this trait only carries
/// writes from the controller to the host.
#[async_trait]
pub trait NativeHistory: Send + Sync {
    /// Push a native history entry whose URL and state mirror `location`.
    async fn push_state(&self, location: &Location, title: &str);

    /// Location currently shown in the address bar, if it parses.
    fn current_location(&self) -> Option<Location>;
}

/// Explicit application context handed to the controller at construction.
#[derive(Clone)]
pub struct AppContext {
    /// Session the guards evaluate against.
    pub session: Arc<dyn SessionProvider>,
    /// Rendering surface.
    pub surface: Arc<dyn RenderSurface>,
    /// Navigation chrome.
    pub chrome: Arc<dyn ChromeController>,
    /// User notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Native history.
    pub history: Arc<dyn NativeHistory>,
    /// Time source for history timestamps.
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
