//! Simulated session and clock.

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use stella_app::SessionProvider;
use stella_core::{Clock, Role, RoleDefaults, RouteId, SessionContext};

/// Clock that advances by a fixed step on every read.
///
/// History timestamps stay distinct and strictly increasing without touching
/// wall-clock time.
#[derive(Debug)]
pub struct SimClock {
    now: AtomicU64,
    step: u64,
}

impl SimClock {
    /// Start at `start_ms`, advancing `step_ms` per read.
    pub fn new(start_ms: u64, step_ms: u64) -> Self {
        Self { now: AtomicU64::new(start_ms), step: step_ms }
    }

    /// Jump forward.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1_000, 1_000)
    }
}

impl Clock for SimClock {
    fn now_millis(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// Mutable session shared between a test and the controller.
#[derive(Debug)]
pub struct SimSession {
    state: Mutex<SessionContext>,
    defaults: RoleDefaults,
}

impl SimSession {
    /// Signed-out session with the standard role landing routes.
    pub fn anonymous() -> Self {
        Self::with_defaults(SessionContext::anonymous(), RoleDefaults::default())
    }

    /// Signed-in session.
    pub fn signed_in(role: impl Into<Role>) -> Self {
        Self::with_defaults(SessionContext::signed_in(role), RoleDefaults::default())
    }

    /// Session with custom landing routes.
    pub fn with_defaults(session: SessionContext, defaults: RoleDefaults) -> Self {
        Self { state: Mutex::new(session), defaults }
    }

    /// Sign in as `role`.
    pub fn sign_in(&self, role: impl Into<Role>) {
        *self.lock() = SessionContext::signed_in(role);
    }

    /// Sign out.
    pub fn sign_out(&self) {
        *self.lock() = SessionContext::anonymous();
    }

    fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionProvider for SimSession {
    fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    fn current_role(&self) -> Option<Role> {
        self.lock().role.clone()
    }

    fn role_default_route(&self, role: Option<&Role>) -> RouteId {
        if self.is_authenticated() {
            self.defaults.route_for_role(role)
        } else {
            self.defaults.unauthenticated.clone()
        }
    }

    fn context(&self) -> SessionContext {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_strictly_increasing() {
        let clock = SimClock::new(0, 5);
        let first = clock.now_millis();
        clock.advance(100);
        let second = clock.now_millis();
        assert_eq!(first, 0);
        assert_eq!(second, 105);
    }

    #[test]
    fn landing_route_follows_sign_in_state() {
        let session = SimSession::anonymous();
        assert_eq!(session.role_default_route(None), RouteId::new("splash"));

        session.sign_in("delivery_partner");
        let role = session.current_role();
        assert_eq!(session.role_default_route(role.as_ref()), RouteId::new("delivery-dashboard"));

        session.sign_out();
        assert!(!session.is_authenticated());
        assert_eq!(session.current_role(), None);
    }
}
