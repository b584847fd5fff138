//! Route guard.
//!
//! [`AuthGate`] decides whether a session may enter a route. The decision is a
//! pure function of its inputs: the same access rules and session always
//! produce the same [`Decision`], which is what makes guard behavior testable
//! without a live session store.
//!
//! Guard outcomes are not errors. A denied route is resolved by the
//! controller through a redirect and never reported to the user as a failure.

use std::collections::BTreeSet;

use crate::{Role, RouteId};

/// Access rules of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAccess {
    /// Route requires an authenticated session.
    pub requires_auth: bool,
    /// Roles allowed to enter. Empty means any role.
    pub allowed_roles: BTreeSet<Role>,
}

impl RouteAccess {
    /// Route open to everyone, authenticated or not.
    pub fn public() -> Self {
        Self::default()
    }

    /// Route requiring authentication with one of the given roles.
    ///
    /// An empty role list admits any authenticated role.
    pub fn authenticated<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self { requires_auth: true, allowed_roles: roles.into_iter().map(Into::into).collect() }
    }
}

/// Read-only view of the current session, captured per navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// Session belongs to a signed-in user.
    pub authenticated: bool,
    /// Role tag of the signed-in user. `None` when unknown or signed out.
    pub role: Option<Role>,
}

impl SessionContext {
    /// Signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signed-in session with the given role.
    pub fn signed_in(role: impl Into<Role>) -> Self {
        Self { authenticated: true, role: Some(role.into()) }
    }
}

/// Guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Transition may proceed.
    Allow,
    /// Session is not authenticated; redirect to the login route.
    RedirectToLogin,
    /// Session role is not admitted; redirect to the default route of the
    /// session's own role.
    RedirectToRoleDefault,
}

impl Decision {
    /// Redirect target for this decision. `None` for [`Decision::Allow`].
    ///
    /// `role_default` is only evaluated for [`Decision::RedirectToRoleDefault`].
    pub fn redirect_target(
        self,
        login: &RouteId,
        role_default: impl FnOnce() -> RouteId,
    ) -> Option<RouteId> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(login.clone()),
            Self::RedirectToRoleDefault => Some(role_default()),
        }
    }
}

/// Deterministic guard over route access rules and a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGate;

impl AuthGate {
    /// Evaluate access rules against a session.
    ///
    /// Authentication is checked before roles: an anonymous session hitting
    /// a role-restricted, auth-required route is sent to login, not to a role
    /// default.
    pub fn evaluate(access: &RouteAccess, session: &SessionContext) -> Decision {
        if access.requires_auth && !session.authenticated {
            return Decision::RedirectToLogin;
        }

        if !access.allowed_roles.is_empty() {
            let admitted =
                session.role.as_ref().is_some_and(|role| access.allowed_roles.contains(role));
            if !admitted {
                return Decision::RedirectToRoleDefault;
            }
        }

        Decision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_route_allows_anonymous() {
        let decision = AuthGate::evaluate(&RouteAccess::public(), &SessionContext::anonymous());
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn auth_route_redirects_anonymous_to_login() {
        let access = RouteAccess::authenticated(["customer"]);
        let decision = AuthGate::evaluate(&access, &SessionContext::anonymous());
        assert_eq!(decision, Decision::RedirectToLogin);
    }

    #[test]
    fn wrong_role_redirects_to_role_default() {
        let access = RouteAccess::authenticated(["customer"]);
        let decision = AuthGate::evaluate(&access, &SessionContext::signed_in("shopkeeper"));
        assert_eq!(decision, Decision::RedirectToRoleDefault);
    }

    #[test]
    fn empty_role_set_admits_any_authenticated_role() {
        let access = RouteAccess::authenticated(Vec::<Role>::new());
        let decision = AuthGate::evaluate(&access, &SessionContext::signed_in("delivery_partner"));
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn authenticated_session_without_role_is_not_admitted() {
        let access = RouteAccess::authenticated(["customer"]);
        let session = SessionContext { authenticated: true, role: None };
        assert_eq!(AuthGate::evaluate(&access, &session), Decision::RedirectToRoleDefault);
    }

    #[test]
    fn redirect_target_uses_role_default_only_when_asked() {
        let login = RouteId::new("login");
        let target = Decision::RedirectToLogin
            .redirect_target(&login, || RouteId::new("never-evaluated-in-practice"));
        assert_eq!(target, Some(login.clone()));

        let target = Decision::RedirectToRoleDefault
            .redirect_target(&login, || RouteId::new("shopkeeper-dashboard"));
        assert_eq!(target, Some(RouteId::new("shopkeeper-dashboard")));

        assert_eq!(Decision::Allow.redirect_target(&login, || RouteId::new("x")), None);
    }
}
