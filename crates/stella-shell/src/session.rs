//! Session state toggled by `login` and `logout`.

use std::sync::{Mutex, PoisonError};

use stella_app::SessionProvider;
use stella_core::{Role, RoleDefaults, RouteId, SessionContext};

/// Signed-in role, if any, plus the configured landing routes.
#[derive(Debug)]
pub struct ShellSession {
    role: Mutex<Option<Role>>,
    defaults: RoleDefaults,
}

impl ShellSession {
    /// Create a session. `None` starts signed out.
    pub fn new(role: Option<Role>, defaults: RoleDefaults) -> Self {
        Self { role: Mutex::new(role), defaults }
    }

    /// Sign in as `role`, replacing any previous user.
    pub fn login(&self, role: Role) {
        tracing::info!("Signed in as {role}");
        *self.role.lock().unwrap_or_else(PoisonError::into_inner) = Some(role);
    }

    /// Sign out.
    pub fn logout(&self) {
        tracing::info!("Signed out");
        *self.role.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionProvider for ShellSession {
    fn is_authenticated(&self) -> bool {
        self.current_role().is_some()
    }

    fn current_role(&self) -> Option<Role> {
        self.role.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn role_default_route(&self, role: Option<&Role>) -> RouteId {
        match self.current_role() {
            Some(_) => self.defaults.route_for_role(role),
            None => self.defaults.unauthenticated.clone(),
        }
    }

    fn context(&self) -> SessionContext {
        self.current_role().map_or_else(SessionContext::anonymous, SessionContext::signed_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_lands_on_fallback() {
        let session = ShellSession::new(None, RoleDefaults::default());
        assert_eq!(session.context(), SessionContext::anonymous());
        assert_eq!(session.role_default_route(None), "splash");

        session.login(Role::new("inspector"));
        let role = session.current_role();
        assert_eq!(session.role_default_route(role.as_ref()), "customer-home");

        session.login(Role::new("shopkeeper"));
        let role = session.current_role();
        assert_eq!(session.role_default_route(role.as_ref()), "shopkeeper-dashboard");
    }
}
