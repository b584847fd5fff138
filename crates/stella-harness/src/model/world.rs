//! Model world: the oracle the real controller is checked against.

use std::collections::{BTreeMap, VecDeque};

use stella_core::{Params, RoleDefaults, RouteConfig};

use super::operation::{Operation, OperationError, OperationResult};
use crate::Step;

/// Guard redirects the model follows before giving up.
const MAX_REDIRECTS: usize = 4;

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Current route.
    pub current_route: Option<String>,
    /// Current parameters.
    pub current_params: Params,
    /// History route ids, oldest first.
    pub history: Vec<String>,
}

/// Reference navigation model.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    routes: Vec<RouteConfig>,
    broken: BTreeMap<String, Step>,
    roles: RoleDefaults,
    safe_default: String,
    login: String,
    limit: usize,
    signed_in_as: Option<String>,
    current: Option<(String, Params)>,
    history: VecDeque<(String, Params)>,
}

impl ModelWorld {
    /// Model over `routes`, signed out, with the standard settings.
    pub fn new(routes: Vec<RouteConfig>, limit: usize) -> Self {
        Self {
            routes,
            broken: BTreeMap::new(),
            roles: RoleDefaults::default(),
            safe_default: "customer-home".to_string(),
            login: "login".to_string(),
            limit: limit.max(1),
            signed_in_as: None,
            current: None,
            history: VecDeque::new(),
        }
    }

    /// Make screens of `route` fail at `step`.
    ///
    /// A [`Step::Cleanup`] fault fails transitions leaving the route. Other
    /// steps fail transitions into it, except [`Step::Preload`], which
    /// navigation never runs.
    pub fn break_route(&mut self, route: &str, step: Step) {
        self.broken.insert(route.to_string(), step);
    }

    /// Start signed in as `role`.
    pub fn sign_in(&mut self, role: &str) {
        self.signed_in_as = Some(role.to_string());
    }

    /// Apply an operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Navigate { route, store } => {
                let mut params = Params::new();
                if let Some(store) = store {
                    params.insert("storeId".to_string(), store.to_string());
                }
                self.navigate(Operation::route(*route), params, true)
            },
            Operation::Replace { route } => {
                self.navigate(Operation::route(*route), Params::new(), false)
            },
            Operation::Back => match self.history.pop_back() {
                Some((route, params)) => self.navigate(&route, params, false),
                None => {
                    let landing = self.landing();
                    self.navigate(&landing, Params::new(), true)
                },
            },
            Operation::PopState { route: Some(route) } => {
                self.navigate(Operation::route(*route), Params::new(), false)
            },
            Operation::PopState { route: None } => {
                let landing = self.landing();
                self.navigate(&landing, Params::new(), false)
            },
            Operation::SignIn { role } => {
                self.signed_in_as = Some(Operation::role(*role).to_string());
                Ok(())
            },
            Operation::SignOut => {
                self.signed_in_as = None;
                Ok(())
            },
        }
    }

    /// Observable state.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            current_route: self.current.as_ref().map(|(route, _)| route.clone()),
            current_params: self.current.as_ref().map(|(_, p)| p.clone()).unwrap_or_default(),
            history: self.history.iter().map(|(route, _)| route.clone()).collect(),
        }
    }

    fn navigate(&mut self, route: &str, params: Params, record: bool) -> OperationResult {
        let (mut route, mut params, mut record) = (route.to_string(), params, record);
        let mut substituted = false;
        let mut recovering = false;
        let mut redirected = false;
        let mut redirects = 0;

        loop {
            let Some(config) = self.routes.iter().find(|r| r.id == route.as_str()).cloned() else {
                if substituted || redirected {
                    return Err(OperationError::Configuration);
                }
                substituted = true;
                route = self.safe_default.clone();
                params = Params::new();
                continue;
            };

            if let Some(redirect) = self.redirect_for(&config) {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    return Err(OperationError::Configuration);
                }
                route = redirect;
                params = Params::new();
                record = true;
                redirected = true;
                continue;
            }

            let current_route = self.current.as_ref().map(|(r, _)| r.clone());
            if record && current_route.as_deref() != Some(route.as_str()) {
                if let Some(previous) = self.current.clone() {
                    self.history.push_back(previous);
                    while self.history.len() > self.limit {
                        self.history.pop_front();
                    }
                }
            }

            let leaving = self.current.take().map(|(r, _)| r);
            if leaving.is_some_and(|left| self.fails_at(&left, Step::Cleanup)) {
                recovering = true;
                route = self.safe_default.clone();
                params = Params::new();
                record = true;
                continue;
            }

            let entering = [Step::Construct, Step::Render, Step::Init];
            if entering.iter().any(|step| self.fails_at(&route, *step)) {
                if route == self.safe_default || recovering {
                    return Err(OperationError::Fatal);
                }
                recovering = true;
                route = self.safe_default.clone();
                params = Params::new();
                record = true;
                continue;
            }

            self.current = Some((route, params));
            return Ok(());
        }
    }

    fn fails_at(&self, route: &str, step: Step) -> bool {
        self.broken.get(route) == Some(&step)
    }

    fn redirect_for(&self, config: &RouteConfig) -> Option<String> {
        if config.requires_auth && self.signed_in_as.is_none() {
            return Some(self.login.clone());
        }
        let admitted = config.allowed_roles.is_empty()
            || self
                .signed_in_as
                .as_deref()
                .is_some_and(|role| config.allowed_roles.iter().any(|r| r.as_str() == role));
        (!admitted).then(|| self.landing())
    }

    fn landing(&self) -> String {
        match &self.signed_in_as {
            Some(role) => self
                .roles
                .routes
                .iter()
                .find(|(r, _)| r.as_str() == role)
                .map_or_else(|| self.roles.fallback.to_string(), |(_, route)| route.to_string()),
            None => self.roles.unauthenticated.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::marketplace_routes;

    #[test]
    fn anonymous_visit_to_protected_route_lands_on_login() {
        let mut model = ModelWorld::new(marketplace_routes(), 10);
        assert_eq!(model.navigate("cart", Params::new(), true), Ok(()));
        assert_eq!(model.observable_state().current_route.as_deref(), Some("login"));
    }

    #[test]
    fn broken_route_recovers_to_safe_default() {
        let mut model = ModelWorld::new(marketplace_routes(), 10);
        model.sign_in("customer");
        model.break_route("broken-route", Step::Render);

        assert_eq!(model.navigate("cart", Params::new(), true), Ok(()));
        assert_eq!(model.navigate("broken-route", Params::new(), true), Ok(()));

        let state = model.observable_state();
        assert_eq!(state.current_route.as_deref(), Some("customer-home"));
        assert_eq!(state.history, vec!["cart".to_string()]);
    }

    #[test]
    fn failed_cleanup_recovers_even_towards_safe_default() {
        let mut model = ModelWorld::new(marketplace_routes(), 10);
        model.sign_in("customer");
        model.break_route("cart", Step::Cleanup);

        assert_eq!(model.navigate("cart", Params::new(), true), Ok(()));
        assert_eq!(model.navigate("customer-home", Params::new(), true), Ok(()));

        let state = model.observable_state();
        assert_eq!(state.current_route.as_deref(), Some("customer-home"));
        assert_eq!(state.history, vec!["cart".to_string()]);
    }

    #[test]
    fn failing_safe_default_is_fatal_only_when_entered() {
        let mut model = ModelWorld::new(marketplace_routes(), 10);
        model.sign_in("customer");
        model.break_route("customer-home", Step::Construct);

        assert_eq!(model.navigate("cart", Params::new(), true), Ok(()));
        let entered = model.navigate("customer-home", Params::new(), true);
        assert_eq!(entered, Err(OperationError::Fatal));
        assert_eq!(model.observable_state().current_route, None);
    }

    #[test]
    fn unregistered_redirect_target_is_configuration() {
        let routes = marketplace_routes()
            .into_iter()
            .filter(|route| route.id.as_str() != "shopkeeper-dashboard")
            .collect();
        let mut model = ModelWorld::new(routes, 10);
        model.sign_in("shopkeeper");

        assert_eq!(model.navigate("cart", Params::new(), true), Err(OperationError::Configuration));
    }
}
