//! Fully simulated host around a real [`NavigationController`].
//!
//! Tests build a [`SimHost`], drive the controller directly or through its
//! navigator, and then inspect the shared journal, the recorders and the
//! invariant snapshot.

use std::{sync::Arc, time::Duration};

use stella_app::{
    AppContext, ControllerConfig, NavigationController, NavigationError, RouteTable,
};
use stella_core::{HistoryState, Params, Role, RoleDefaults, RouteConfig, RouteId, SessionContext};

use crate::{
    InvariantRegistry, Journal, Lifecycle, ObservableState, Operation, OperationError,
    OperationResult, RecordingChrome, RecordingNotifier, RecordingSurface, Scripts,
    ScriptedFactory, SimClock, SimHistory, SimSession, SystemSnapshot,
    fixtures::marketplace_routes,
};

/// A controller wired to recording collaborators and scripted screens.
pub struct SimHost {
    /// Controller under test.
    pub controller: NavigationController,
    /// Effect log shared by every collaborator and screen.
    pub journal: Journal,
    /// Per-route screen behaviour.
    pub scripts: Scripts,
    /// Screen instance counters.
    pub lifecycle: Arc<Lifecycle>,
    /// Session the guards read.
    pub session: Arc<SimSession>,
    /// Rendering surface.
    pub surface: Arc<RecordingSurface>,
    /// Native history.
    pub history: Arc<SimHistory>,
    /// History timestamp source.
    pub clock: Arc<SimClock>,
}

impl SimHost {
    /// Start configuring a host.
    pub fn builder() -> SimHostBuilder {
        SimHostBuilder::default()
    }

    /// Navigate with history recording.
    pub async fn go(&mut self, route: &str) -> Result<(), NavigationError> {
        self.controller.navigate(route, Params::new(), true).await
    }

    /// Navigate with parameters and history recording.
    pub async fn go_with(
        &mut self,
        route: &str,
        params: &[(&str, &str)],
    ) -> Result<(), NavigationError> {
        let params = params.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        self.controller.navigate(route, params, true).await
    }

    /// Serve everything queued through the controller's navigator.
    pub async fn settle(&mut self) -> Result<bool, NavigationError> {
        self.controller.drain_pending().await
    }

    /// Apply a model operation to the real controller.
    pub async fn apply(&mut self, op: &Operation) -> OperationResult {
        let outcome = match op {
            Operation::Navigate { route, store } => {
                let mut params = Params::new();
                if let Some(store) = store {
                    params.insert("storeId".to_string(), store.to_string());
                }
                self.controller.navigate(Operation::route(*route), params, true).await
            },
            Operation::Replace { route } => {
                self.controller.navigate(Operation::route(*route), Params::new(), false).await
            },
            Operation::Back => self.controller.go_back().await,
            Operation::PopState { route } => {
                let state = route.map(|slot| HistoryState {
                    route_id: RouteId::new(Operation::route(slot)),
                    params: Params::new(),
                });
                self.controller.handle_pop_state(state).await
            },
            Operation::SignIn { role } => {
                self.session.sign_in(Operation::role(*role));
                Ok(())
            },
            Operation::SignOut => {
                self.session.sign_out();
                Ok(())
            },
        };

        outcome.map_err(|e| {
            if e.is_configuration() { OperationError::Configuration } else { OperationError::Fatal }
        })
    }

    /// State comparable with [`crate::ModelWorld::observable_state`].
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            current_route: self.controller.current_route().map(ToString::to_string),
            current_params: self.controller.current_params().clone(),
            history: self
                .controller
                .history()
                .into_iter()
                .map(|e| e.route_id.to_string())
                .collect(),
        }
    }

    /// Observable state for invariant checks.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            navigation: self.controller.snapshot(),
            interactable: self.surface.is_interactable(),
            live_screens: self.lifecycle.alive(),
            native_entries: self.history.entries().len(),
        }
    }

    /// Panic with context if any standard invariant is violated.
    pub fn assert_invariants(&self, context: &str) {
        InvariantRegistry::standard().assert_all(&self.snapshot(), context);
    }
}

/// Configures a [`SimHost`].
#[derive(Debug, Clone)]
pub struct SimHostBuilder {
    session: SessionContext,
    config: ControllerConfig,
    routes: Vec<RouteConfig>,
    address: Option<String>,
}

impl Default for SimHostBuilder {
    fn default() -> Self {
        Self {
            session: SessionContext::anonymous(),
            config: ControllerConfig::default(),
            routes: marketplace_routes(),
            address: None,
        }
    }
}

impl SimHostBuilder {
    /// Start signed in as `role`.
    #[must_use]
    pub fn signed_in(mut self, role: impl Into<Role>) -> Self {
        self.session = SessionContext::signed_in(role);
        self
    }

    /// Start signed out.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.session = SessionContext::anonymous();
        self
    }

    /// Internal history capacity.
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Bound every screen lifecycle step.
    #[must_use]
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.config.step_timeout = Some(timeout);
        self
    }

    /// Override the safe default route.
    #[must_use]
    pub fn safe_default(mut self, route: impl Into<RouteId>) -> Self {
        self.config.safe_default_route = route.into();
        self
    }

    /// Replace the route table.
    #[must_use]
    pub fn routes(mut self, routes: Vec<RouteConfig>) -> Self {
        self.routes = routes;
        self
    }

    /// Open the app with `fragment` in the address bar.
    #[must_use]
    pub fn open_at(mut self, fragment: impl Into<String>) -> Self {
        self.address = Some(fragment.into());
        self
    }

    /// Wire the host.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`NavigationController::new`].
    pub fn build(self) -> Result<SimHost, NavigationError> {
        let journal = Journal::new();
        let scripts = Scripts::default();
        let lifecycle = Arc::new(Lifecycle::default());
        let factory =
            ScriptedFactory::new(journal.clone(), scripts.clone(), Arc::clone(&lifecycle));

        let mut table = RouteTable::builder();
        for route in self.routes {
            if let Err(e) = table.register(route, factory.clone()) {
                tracing::warn!("Skipping fixture route: {e}");
            }
        }

        let session = Arc::new(SimSession::with_defaults(self.session, RoleDefaults::default()));
        let surface = Arc::new(RecordingSurface::new(journal.clone()));
        let history = Arc::new(SimHistory::new(journal.clone()));
        let clock = Arc::new(SimClock::default());
        if let Some(fragment) = &self.address {
            history.open_at(fragment);
        }

        let ctx = AppContext {
            session: session.clone(),
            surface: surface.clone(),
            chrome: Arc::new(RecordingChrome::new(journal.clone())),
            notifier: Arc::new(RecordingNotifier::new(journal.clone())),
            history: history.clone(),
            clock: clock.clone(),
        };
        let controller = NavigationController::new(Arc::new(table.build()), ctx, self.config)?;

        Ok(SimHost { controller, journal, scripts, lifecycle, session, surface, history, clock })
    }
}

/// Single-threaded runtime with a paused clock, for driving a host from
/// synchronous code such as property tests and fuzz targets.
///
/// Hanging screen steps resolve through the step timeout as soon as the
/// runtime has nothing else to do.
pub fn paused_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_time().start_paused(true).build()
}
