//! Navigation configuration.
//!
//! The route table and navigation settings are loaded once at startup from
//! TOML. A loaded [`StellaConfig`] has been validated: route ids are unique
//! and every route named by a setting exists.
//!
//! ```toml
//! [navigation]
//! history_limit = 10
//! safe_default_route = "customer-home"
//! login_route = "login"
//! step_timeout_ms = 5000
//!
//! [roles]
//! unauthenticated = "splash"
//! fallback = "customer-home"
//!
//! [roles.routes]
//! customer = "customer-home"
//! shopkeeper = "shopkeeper-dashboard"
//!
//! [[routes]]
//! id = "customer-home"
//! requires_auth = true
//! allowed_roles = ["customer"]
//! show_bottom_nav = true
//! show_action_button = true
//! title = "Home"
//! ```

use std::{
    collections::{BTreeMap, HashSet},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DEFAULT_HISTORY_LIMIT, Params, Role, RouteAccess, RouteId, SessionContext};

/// Visibility of persistent navigation chrome for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeSpec {
    /// Show the bottom navigation bar.
    pub show_bottom_nav: bool,
    /// Show the floating action button.
    pub show_action_button: bool,
}

/// One route table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Unique route id.
    pub id: RouteId,
    /// Screen kind used to look up the screen factory. Defaults to the id.
    #[serde(default)]
    pub screen: Option<String>,
    /// Route requires an authenticated session.
    #[serde(default)]
    pub requires_auth: bool,
    /// Roles allowed to enter. Empty means any role.
    #[serde(default)]
    pub allowed_roles: Vec<Role>,
    /// Show the bottom navigation bar.
    #[serde(default)]
    pub show_bottom_nav: bool,
    /// Show the floating action button.
    #[serde(default)]
    pub show_action_button: bool,
    /// Display title.
    pub title: String,
    /// Props merged under navigation parameters when the screen is built.
    #[serde(default)]
    pub default_props: Params,
}

impl RouteConfig {
    /// Create an entry for a public route with hidden chrome.
    pub fn new(id: impl Into<RouteId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            screen: None,
            requires_auth: false,
            allowed_roles: Vec::new(),
            show_bottom_nav: false,
            show_action_button: false,
            title: title.into(),
            default_props: Params::new(),
        }
    }

    /// Require authentication with one of `roles` (empty admits any role).
    #[must_use]
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.requires_auth = true;
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set chrome visibility.
    #[must_use]
    pub fn with_chrome(mut self, show_bottom_nav: bool, show_action_button: bool) -> Self {
        self.show_bottom_nav = show_bottom_nav;
        self.show_action_button = show_action_button;
        self
    }

    /// Use a screen kind different from the route id.
    #[must_use]
    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    /// Add a default prop.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_props.insert(key.into(), value.into());
        self
    }

    /// Screen kind for factory lookup.
    pub fn screen_kind(&self) -> &str {
        self.screen.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    /// Guard rules of this route.
    pub fn access(&self) -> RouteAccess {
        RouteAccess {
            requires_auth: self.requires_auth,
            allowed_roles: self.allowed_roles.iter().cloned().collect(),
        }
    }

    /// Chrome visibility of this route.
    pub fn chrome(&self) -> ChromeSpec {
        ChromeSpec {
            show_bottom_nav: self.show_bottom_nav,
            show_action_button: self.show_action_button,
        }
    }
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Maximum internal history entries.
    pub history_limit: usize,
    /// Fallback route for unknown routes and failed transitions.
    pub safe_default_route: RouteId,
    /// Route unauthenticated sessions are redirected to.
    pub login_route: RouteId,
    /// Upper bound for each screen lifecycle step. `None` waits forever.
    pub step_timeout_ms: Option<u64>,
    /// Application name appended to document titles.
    pub app_name: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            safe_default_route: RouteId::new("customer-home"),
            login_route: RouteId::new("login"),
            step_timeout_ms: None,
            app_name: "Stella".to_string(),
        }
    }
}

impl NavigationConfig {
    /// Step timeout as a [`Duration`].
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_ms.map(Duration::from_millis)
    }
}

/// Landing route per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleDefaults {
    /// Landing route for signed-out sessions.
    pub unauthenticated: RouteId,
    /// Landing route for signed-in sessions whose role has no entry.
    pub fallback: RouteId,
    /// Landing route per role.
    pub routes: BTreeMap<Role, RouteId>,
}

impl Default for RoleDefaults {
    fn default() -> Self {
        let routes = [
            ("customer", "customer-home"),
            ("shopkeeper", "shopkeeper-dashboard"),
            ("delivery_partner", "delivery-dashboard"),
        ]
        .into_iter()
        .map(|(role, route)| (Role::new(role), RouteId::new(route)))
        .collect();

        Self {
            unauthenticated: RouteId::new("splash"),
            fallback: RouteId::new("customer-home"),
            routes,
        }
    }
}

impl RoleDefaults {
    /// Landing route for a signed-in role.
    pub fn route_for_role(&self, role: Option<&Role>) -> RouteId {
        role.and_then(|role| self.routes.get(role)).unwrap_or(&self.fallback).clone()
    }

    /// Landing route for a session.
    pub fn route_for(&self, session: &SessionContext) -> RouteId {
        if session.authenticated {
            self.route_for_role(session.role.as_ref())
        } else {
            self.unauthenticated.clone()
        }
    }
}

/// Complete navigation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StellaConfig {
    /// Controller settings.
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Landing routes.
    #[serde(default)]
    pub roles: RoleDefaults,
    /// Route table entries.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl StellaConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check route id uniqueness and that every referenced route exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.navigation.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }

        let mut ids = HashSet::new();
        for route in &self.routes {
            if !ids.insert(route.id.as_str()) {
                return Err(ConfigError::DuplicateRoute(route.id.to_string()));
            }
        }

        let mut references = vec![
            ("navigation.safe_default_route".to_string(), &self.navigation.safe_default_route),
            ("navigation.login_route".to_string(), &self.navigation.login_route),
            ("roles.unauthenticated".to_string(), &self.roles.unauthenticated),
            ("roles.fallback".to_string(), &self.roles.fallback),
        ];
        let role_routes =
            self.roles.routes.iter().map(|(role, route)| (format!("roles.routes.{role}"), route));
        references.extend(role_routes);

        for (setting, route) in references {
            if !ids.contains(route.as_str()) {
                return Err(ConfigError::UnknownRoute { setting, route: route.to_string() });
            }
        }

        Ok(())
    }

    /// Route entry by id.
    pub fn route(&self, id: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|route| route.id == id)
    }
}
