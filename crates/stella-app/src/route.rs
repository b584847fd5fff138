//! Route table.
//!
//! The table is assembled once through [`RouteTableBuilder`] and is immutable
//! afterwards: [`RouteTable`] exposes no way to add or replace a route, so
//! registering after the controller starts serving is unrepresentable rather
//! than a runtime condition.

use std::{collections::HashMap, fmt, sync::Arc};

use stella_core::{ChromeSpec, Params, RouteAccess, RouteConfig, RouteId, StellaConfig};
use thiserror::Error;

use crate::{Props, ScreenFactory};

/// Errors raised while building or querying the route table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route registered under this id
    #[error("route not found: {0}")]
    NotFound(RouteId),

    /// A route with this id is already registered
    #[error("duplicate route id: {0}")]
    Duplicate(RouteId),

    /// No factory registered for the route's screen kind
    #[error("route {route} uses unknown screen {screen}")]
    MissingScreen {
        /// Route declaring the screen
        route: RouteId,
        /// Screen kind that has no factory
        screen: String,
    },
}

/// Immutable description of a route.
#[derive(Clone)]
pub struct RouteDescriptor {
    config: RouteConfig,
    access: RouteAccess,
    factory: Arc<dyn ScreenFactory>,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("config", &self.config)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl RouteDescriptor {
    /// Create a descriptor from a route entry and its screen factory.
    pub fn new(config: RouteConfig, factory: Arc<dyn ScreenFactory>) -> Self {
        let access = config.access();
        Self { config, access, factory }
    }

    /// Route id.
    pub fn id(&self) -> &RouteId {
        &self.config.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Chrome visibility.
    pub fn chrome(&self) -> ChromeSpec {
        self.config.chrome()
    }

    /// Guard rules.
    pub fn access(&self) -> &RouteAccess {
        &self.access
    }

    /// Props the route contributes before navigation parameters.
    pub fn default_props(&self) -> &Params {
        &self.config.default_props
    }

    /// Screen factory.
    pub fn factory(&self) -> &dyn ScreenFactory {
        self.factory.as_ref()
    }

    /// Route defaults overlaid with `params`. Parameters win on key clashes.
    pub fn props_with(&self, params: &Params) -> Props {
        let mut props = self.config.default_props.clone();
        props.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        props
    }
}

/// Screen factories keyed by screen kind.
#[derive(Default, Clone)]
pub struct ScreenRegistry {
    factories: HashMap<String, Arc<dyn ScreenFactory>>,
}

impl ScreenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for a screen kind, replacing any previous one.
    pub fn register(&mut self, screen: impl Into<String>, factory: impl ScreenFactory + 'static) {
        self.factories.insert(screen.into(), Arc::new(factory));
    }

    /// Factory for a screen kind.
    pub fn get(&self, screen: &str) -> Option<Arc<dyn ScreenFactory>> {
        self.factories.get(screen).cloned()
    }
}

/// Collects route descriptors before the table is frozen.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<RouteId, RouteDescriptor>,
}

impl RouteTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// - `RouteError::Duplicate` if the id is already registered
    pub fn register(
        &mut self,
        config: RouteConfig,
        factory: impl ScreenFactory + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.register_shared(config, Arc::new(factory))
    }

    /// Register a route with a shared factory.
    pub fn register_shared(
        &mut self,
        config: RouteConfig,
        factory: Arc<dyn ScreenFactory>,
    ) -> Result<&mut Self, RouteError> {
        if self.routes.contains_key(&config.id) {
            return Err(RouteError::Duplicate(config.id));
        }
        self.routes.insert(config.id.clone(), RouteDescriptor::new(config, factory));
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> RouteTable {
        RouteTable { routes: self.routes }
    }
}

/// Read-only registry of route descriptors.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<RouteId, RouteDescriptor>,
}

impl RouteTable {
    /// Start building a table.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Build a table from configuration, resolving each route's screen kind
    /// through `screens`.
    pub fn from_config(
        config: &StellaConfig,
        screens: &ScreenRegistry,
    ) -> Result<Self, RouteError> {
        let mut builder = Self::builder();
        for route in &config.routes {
            let factory = screens.get(route.screen_kind()).ok_or_else(|| RouteError::MissingScreen {
                route: route.id.clone(),
                screen: route.screen_kind().to_string(),
            })?;
            builder.register_shared(route.clone(), factory)?;
        }
        Ok(builder.build())
    }

    /// Descriptor for a route id.
    ///
    /// # Errors
    ///
    /// - `RouteError::NotFound` if no route is registered under `id`
    pub fn lookup(&self, id: &str) -> Result<&RouteDescriptor, RouteError> {
        self.routes.get(id).ok_or_else(|| RouteError::NotFound(RouteId::new(id)))
    }

    /// Check if a route is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.routes.contains_key(id)
    }

    /// All registered route ids, sorted.
    pub fn ids(&self) -> Vec<RouteId> {
        let mut ids: Vec<_> = self.routes.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Screen, ScreenContext, ScreenError};

    struct Blank;

    impl Screen for Blank {}

    fn blank(_: ScreenContext) -> Result<Box<dyn Screen>, ScreenError> {
        Ok(Box::new(Blank))
    }

    #[test]
    fn lookup_unknown_route_fails() {
        let mut builder = RouteTable::builder();
        let _ = builder.register(RouteConfig::new("login", "Sign In"), blank);
        let table = builder.build();

        assert!(table.lookup("login").is_ok());
        assert_eq!(
            table.lookup("nowhere").map(|d| d.id().clone()),
            Err(RouteError::NotFound(RouteId::new("nowhere")))
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = RouteTable::builder();
        assert!(builder.register(RouteConfig::new("cart", "Cart"), blank).is_ok());
        assert!(matches!(
            builder.register(RouteConfig::new("cart", "Cart again"), blank),
            Err(RouteError::Duplicate(id)) if id == "cart"
        ));
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn params_override_default_props() {
        let config = RouteConfig::new("login", "Sign In")
            .with_prop("mode", "login")
            .with_prop("next", "home");
        let descriptor = RouteDescriptor::new(config, Arc::new(blank));

        let mut params = Params::new();
        params.insert("next".into(), "cart".into());
        let props = descriptor.props_with(&params);

        assert_eq!(props.get("mode").map(String::as_str), Some("login"));
        assert_eq!(props.get("next").map(String::as_str), Some("cart"));
    }

    #[test]
    fn from_config_requires_a_factory_per_screen_kind() {
        let config = StellaConfig {
            routes: vec![RouteConfig::new("login", "Sign In").with_screen("auth")],
            ..StellaConfig::default()
        };

        let empty = ScreenRegistry::new();
        assert!(matches!(
            RouteTable::from_config(&config, &empty),
            Err(RouteError::MissingScreen { screen, .. }) if screen == "auth"
        ));

        let mut screens = ScreenRegistry::new();
        screens.register("auth", blank);
        let table = RouteTable::from_config(&config, &screens).unwrap_or_else(|e| panic!("{e}"));
        assert!(table.contains("login"));
    }
}
