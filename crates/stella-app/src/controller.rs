//! Navigation controller.
//!
//! [`NavigationController`] is the only component with mutable "current"
//! state. It resolves routes, evaluates guards, keeps the internal and native
//! histories in lockstep, drives the screen lifecycle and updates chrome.
//!
//! # State Machine
//!
//! ```text
//!            navigate()                    screen live
//! ┌──────┐ ───────────> ┌────────────┐ ─────────────────> ┌──────┐
//! │ Idle │              │ Navigating │                    │ Idle │
//! └──────┘              └────────────┘                    └──────┘
//!                             │ cleanup/construct/render/init failed
//!                             ↓
//!                        ┌────────┐  navigate(safe default)
//!                        │ Failed │ ─────────────────────────> Navigating
//!                        └────────┘
//! ```
//!
//! # Serialization
//!
//! Transitions never overlap. Direct calls borrow the controller mutably, and
//! everything else goes through a [`Navigator`] whose requests are queued and
//! served first-in first-out, one settled transition at a time.

use std::{future::Future, sync::Arc, time::Duration};

use stella_core::{
    AuthGate, Decision, DeepLink, HistoryEntry, HistoryStack, HistoryState, Location,
    NavigationConfig, Params, RouteId, SessionContext, location::parse_query,
};
use tokio::sync::mpsc;

use crate::{
    AppContext, FailureCause, NavRequest, NavigationError, NavigationSnapshot, Navigator, Phase,
    RouteDescriptor, RouteTable, Screen, ScreenContext, ScreenError, Severity, Stage,
    TransitionFailure,
    navigator::{order_params, product_params, store_params},
    state::NavigationState,
};

/// Guard redirects followed before giving up on a navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 4;

/// Routes warmed by [`NavigationController::preload_common_routes`].
pub const COMMON_ROUTES: [&str; 4] = ["customer-home", "store-list", "cart", "profile"];

/// Where the floating action button leads from each route that has one.
pub const ACTION_ROUTES: [(&str, &str); 3] = [
    ("customer-home", "search"),
    ("store-list", "search"),
    ("shopkeeper-dashboard", "add-product"),
];

/// Message shown when a transition fails.
const FAILURE_MESSAGE: &str = "Navigation failed";

/// Message shown when the action button has nothing to do.
const NO_ACTION_MESSAGE: &str = "Quick action not available for this screen";

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Internal history capacity.
    pub history_limit: usize,
    /// Fallback route for unknown routes and failed transitions.
    pub safe_default_route: RouteId,
    /// Redirect target for unauthenticated sessions.
    pub login_route: RouteId,
    /// Upper bound for each screen lifecycle step. `None` waits forever.
    pub step_timeout: Option<Duration>,
    /// Application name appended to document titles.
    pub app_name: String,
    /// Guard redirects followed before a navigation is abandoned.
    pub max_redirects: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&NavigationConfig::default())
    }
}

impl From<&NavigationConfig> for ControllerConfig {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            safe_default_route: config.safe_default_route.clone(),
            login_route: config.login_route.clone(),
            step_timeout: config.step_timeout(),
            app_name: config.app_name.clone(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// A navigation target as it moves through resolution.
#[derive(Debug, Clone)]
struct Target {
    route: RouteId,
    params: Params,
    record_history: bool,
    /// Chosen by a guard rather than the caller.
    redirected: bool,
}

impl Target {
    fn new(route: RouteId, params: Params, record_history: bool) -> Self {
        Self { route, params, record_history, redirected: false }
    }

    fn redirect(route: RouteId) -> Self {
        Self { route, params: Params::new(), record_history: true, redirected: true }
    }
}

/// Navigation and screen-lifecycle state machine.
pub struct NavigationController {
    routes: Arc<RouteTable>,
    ctx: AppContext,
    config: ControllerConfig,
    state: NavigationState,
    history: HistoryStack,
    navigator: Navigator,
    requests: mpsc::UnboundedReceiver<NavRequest>,
}

impl NavigationController {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// - `NavigationError::MissingSafeDefault` if the safe default route is
    ///   not in `routes`
    /// - `NavigationError::MissingLoginRoute` if the login route is not in
    ///   `routes`
    pub fn new(
        routes: Arc<RouteTable>,
        ctx: AppContext,
        config: ControllerConfig,
    ) -> Result<Self, NavigationError> {
        if !routes.contains(config.safe_default_route.as_str()) {
            return Err(NavigationError::MissingSafeDefault(config.safe_default_route));
        }
        if !routes.contains(config.login_route.as_str()) {
            return Err(NavigationError::MissingLoginRoute(config.login_route));
        }

        let (navigator, requests) = Navigator::channel();
        Ok(Self {
            routes,
            ctx,
            history: HistoryStack::new(config.history_limit),
            config,
            state: NavigationState::new(),
            navigator,
            requests,
        })
    }

    /// Navigate to the route named by the native location, or to the
    /// session's landing route. Neither is recorded in history.
    pub async fn start(&mut self) -> Result<(), NavigationError> {
        match self.ctx.history.current_location() {
            Some(location) if self.routes.contains(location.route_id.as_str()) => {
                self.navigate(location.route_id, location.params, false).await
            },
            _ => {
                let route = self.default_route();
                self.navigate(route, Params::new(), false).await
            },
        }
    }

    /// Navigate to `route`.
    ///
    /// Unknown routes fall back to the safe default once, denied routes are
    /// redirected, and a failed transition is followed by a corrective
    /// navigation to the safe default. None of these surface as errors.
    ///
    /// # Errors
    ///
    /// - Configuration errors (see [`NavigationError::is_configuration`])
    /// - `NavigationError::Fatal` if the safe default route's own screen fails
    ///   to construct, render, apply or initialize
    pub async fn navigate(
        &mut self,
        route: impl Into<RouteId>,
        params: Params,
        record_history: bool,
    ) -> Result<(), NavigationError> {
        let mut target = Target::new(route.into(), params, record_history);
        let mut substituted = false;
        let mut recovering = false;
        let mut redirects = 0usize;
        let routes = Arc::clone(&self.routes);

        loop {
            tracing::debug!(
                "Navigating to {} {:?} (record: {})",
                target.route,
                target.params,
                target.record_history
            );

            let descriptor = match routes.lookup(target.route.as_str()) {
                Ok(descriptor) => descriptor,
                Err(_) if target.redirected => {
                    return Err(NavigationError::UnknownRedirect { route: target.route });
                },
                Err(e) if !substituted => {
                    tracing::warn!("{e}, falling back to {}", self.config.safe_default_route);
                    substituted = true;
                    target = Target::new(
                        self.config.safe_default_route.clone(),
                        Params::new(),
                        target.record_history,
                    );
                    continue;
                },
                Err(_) => {
                    return Err(NavigationError::MissingSafeDefault(
                        self.config.safe_default_route.clone(),
                    ));
                },
            };

            let session = self.ctx.session.context();
            let decision = AuthGate::evaluate(descriptor.access(), &session);
            if let Some(redirect) = decision
                .redirect_target(&self.config.login_route, || self.role_default_route(&session))
            {
                redirects += 1;
                if redirects > self.config.max_redirects {
                    return Err(NavigationError::RedirectLoop { route: redirect, hops: redirects });
                }
                match decision {
                    Decision::RedirectToLogin => {
                        tracing::info!("Authentication required for {}, redirecting", target.route);
                    },
                    _ => tracing::info!(
                        "Access to {} denied for role {:?}, redirecting to {redirect}",
                        target.route,
                        session.role
                    ),
                }
                target = Target::redirect(redirect);
                continue;
            }

            match self.transition(descriptor, &target).await {
                Ok(()) => {
                    tracing::debug!("Navigated to {}", target.route);
                    return Ok(());
                },
                Err(failure) => {
                    self.settle_failed(&failure);

                    // A failed cleanup belongs to the screen being left, which is gone now.
                    let entering_failed = failure.stage != Stage::Cleanup;
                    let is_safe_default = target.route == self.config.safe_default_route;
                    if entering_failed && (is_safe_default || recovering) {
                        tracing::error!("Recovery is not possible: {failure}");
                        return Err(NavigationError::Fatal(failure));
                    }

                    recovering = true;
                    target =
                        Target::new(self.config.safe_default_route.clone(), Params::new(), true);
                },
            }
        }
    }

    /// Go back one internal history entry, or to the session's landing route
    /// when there is none.
    pub async fn go_back(&mut self) -> Result<(), NavigationError> {
        match self.history.pop() {
            Some(entry) => self.navigate(entry.route_id, entry.params, false).await,
            None => {
                let route = self.default_route();
                self.navigate(route, Params::new(), true).await
            },
        }
    }

    /// Replay a native back/forward event through the normal navigation
    /// path without recording it again.
    pub async fn handle_pop_state(
        &mut self,
        state: Option<HistoryState>,
    ) -> Result<(), NavigationError> {
        match state {
            Some(state) => self.navigate(state.route_id, state.params, false).await,
            None => {
                let route = self.default_route();
                self.navigate(route, Params::new(), false).await
            },
        }
    }

    /// Resolve an external URL. Unknown or malformed links land on the
    /// session's landing route.
    pub async fn open_deep_link(&mut self, url: &str) -> Result<(), NavigationError> {
        match DeepLink::parse(url) {
            Ok(link) if self.routes.contains(link.route_id.as_str()) => {
                self.navigate(link.route_id, link.params, true).await
            },
            Ok(link) => {
                tracing::warn!("Deep link not found: {}", link.route_id);
                let route = self.default_route();
                self.navigate(route, Params::new(), true).await
            },
            Err(e) => {
                tracing::warn!("Invalid deep link: {e}");
                let route = self.default_route();
                self.navigate(route, Params::new(), true).await
            },
        }
    }

    /// Follow an activated link tagged with a route and a `k=v&k=v` string.
    pub async fn handle_link(
        &mut self,
        route: impl Into<RouteId>,
        raw_params: &str,
    ) -> Result<(), NavigationError> {
        self.navigate(route, parse_query(raw_params), true).await
    }

    /// Open a store's product grid.
    pub async fn navigate_to_store(&mut self, store_id: &str) -> Result<(), NavigationError> {
        self.navigate("product-grid", store_params(store_id), true).await
    }

    /// Open a product's detail page.
    pub async fn navigate_to_product(
        &mut self,
        product_id: &str,
        store_id: &str,
    ) -> Result<(), NavigationError> {
        self.navigate("product-detail", product_params(product_id, store_id), true).await
    }

    /// Open an order's tracking page.
    pub async fn navigate_to_order(&mut self, order_id: &str) -> Result<(), NavigationError> {
        self.navigate("order-tracking", order_params(order_id), true).await
    }

    /// Run the floating action button for the current route.
    ///
    /// Returns `true` if it led somewhere. Routes without an entry in
    /// [`ACTION_ROUTES`] get an informational notice instead.
    pub async fn activate_action_button(&mut self) -> Result<bool, NavigationError> {
        let action = self.state.current_route.as_ref().and_then(|current| {
            ACTION_ROUTES.iter().find(|(from, _)| *from == current.as_str()).map(|(_, to)| *to)
        });
        match action {
            Some(target) => {
                self.navigate(target, Params::new(), true).await?;
                Ok(true)
            },
            None => {
                tracing::debug!("No quick action for {:?}", self.state.current_route);
                self.ctx.notifier.notify(NO_ACTION_MESSAGE, Severity::Info);
                Ok(false)
            },
        }
    }

    /// Follow a bottom navigation tab.
    ///
    /// Returns `false` without navigating if `route` is not a route that
    /// shows the bottom navigation bar.
    pub async fn select_tab(&mut self, route: impl Into<RouteId>) -> Result<bool, NavigationError> {
        let route = route.into();
        let is_tab = self
            .routes
            .lookup(route.as_str())
            .is_ok_and(|descriptor| descriptor.chrome().show_bottom_nav);
        if !is_tab {
            tracing::warn!("Ignoring tab for {route}, which has no bottom navigation");
            return Ok(false);
        }
        self.navigate(route, Params::new(), true).await?;
        Ok(true)
    }

    /// Check whether the current session may enter `route`. No side effects.
    pub fn can_navigate(&self, route: &str) -> bool {
        self.routes.lookup(route).is_ok_and(|descriptor| {
            AuthGate::evaluate(descriptor.access(), &self.ctx.session.context()) == Decision::Allow
        })
    }

    /// Warm up a route's screen without rendering it.
    ///
    /// Returns `true` on success. Failures are logged, never surfaced.
    pub async fn preload_route(&self, route: &str) -> bool {
        let Ok(descriptor) = self.routes.lookup(route) else {
            tracing::warn!("Cannot preload unknown route: {route}");
            return false;
        };

        let ctx = ScreenContext {
            route_id: descriptor.id().clone(),
            props: descriptor.props_with(&Params::new()),
            navigator: self.navigator.clone(),
        };
        let mut screen = match descriptor.factory().create(ctx) {
            Ok(screen) => screen,
            Err(e) => {
                tracing::warn!("Failed to preload route {route}: {e}");
                return false;
            },
        };

        let id = descriptor.id();
        let limit = self.config.step_timeout;
        let outcome = bounded(limit, id, Stage::Preload, screen.preload()).await;
        if let Err(e) = bounded(limit, id, Stage::Cleanup, screen.cleanup()).await {
            tracing::warn!("Failed to release preloaded screen: {e}");
        }

        match outcome {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to preload route {route}: {e}");
                false
            },
        }
    }

    /// Warm up several routes one after another. Returns how many succeeded.
    pub async fn preload_routes<I, S>(&self, routes: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut loaded = 0;
        for route in routes {
            if self.preload_route(route.as_ref()).await {
                loaded += 1;
            }
        }
        tracing::debug!("Preloaded {loaded} routes");
        loaded
    }

    /// Warm up the routes most sessions visit first.
    pub async fn preload_common_routes(&self) -> usize {
        self.preload_routes(COMMON_ROUTES).await
    }

    /// Dispatch one request.
    ///
    /// Returns `true` if the request asked the controller to stop.
    pub async fn handle(&mut self, request: NavRequest) -> Result<bool, NavigationError> {
        match request {
            NavRequest::Navigate { route, params, record_history } => {
                self.navigate(route, params, record_history).await?;
            },
            NavRequest::Back => self.go_back().await?,
            NavRequest::PopState(state) => self.handle_pop_state(state).await?,
            NavRequest::DeepLink(url) => self.open_deep_link(&url).await?,
            NavRequest::Link { route, params } => self.handle_link(route, &params).await?,
            NavRequest::ActionButton => {
                self.activate_action_button().await?;
            },
            NavRequest::Tab(route) => {
                self.select_tab(route).await?;
            },
            NavRequest::Shutdown => return Ok(true),
        }
        Ok(false)
    }

    /// Serve every request already queued, in arrival order.
    ///
    /// Requests queued while serving are served too. Returns `true` if a
    /// shutdown request was reached.
    pub async fn drain_pending(&mut self) -> Result<bool, NavigationError> {
        while let Ok(request) = self.requests.try_recv() {
            if self.handle(request).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Serve queued requests until a shutdown request arrives.
    pub async fn serve(&mut self) -> Result<(), NavigationError> {
        while let Some(request) = self.requests.recv().await {
            if self.handle(request).await? {
                break;
            }
        }
        Ok(())
    }

    /// Handle for queuing requests to this controller.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// Current route.
    pub fn current_route(&self) -> Option<&RouteId> {
        self.state.current_route.as_ref()
    }

    /// Parameters of the current route.
    pub fn current_params(&self) -> &Params {
        &self.state.current_params
    }

    /// Controller phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// A screen instance is live.
    pub fn has_live_screen(&self) -> bool {
        self.state.current_screen.is_some()
    }

    /// Internal history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.peek_all()
    }

    /// Route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Read-only view of the controller.
    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            current_route: self.state.current_route.clone(),
            current_params: self.state.current_params.clone(),
            phase: self.state.phase,
            has_live_screen: self.state.current_screen.is_some(),
            history: self.history.peek_all(),
            history_limit: self.history.limit(),
        }
    }

    /// Landing route for the current session.
    pub fn default_route(&self) -> RouteId {
        self.role_default_route(&self.ctx.session.context())
    }

    fn role_default_route(&self, session: &SessionContext) -> RouteId {
        self.ctx.session.role_default_route(session.role.as_ref())
    }

    /// Run one transition to an admitted route.
    ///
    /// On failure the outgoing screen has already been released and the
    /// caller must settle the controller.
    async fn transition(
        &mut self,
        descriptor: &RouteDescriptor,
        target: &Target,
    ) -> Result<(), TransitionFailure> {
        let route = &target.route;

        if target.record_history && self.state.current_route.as_ref() != Some(route) {
            if let Some(previous) = self.state.current_route.clone() {
                let entry = HistoryEntry::new(
                    previous,
                    self.state.current_params.clone(),
                    self.ctx.clock.now_millis(),
                );
                self.history.record(entry, route);
            }
            let location = Location::new(route.clone(), target.params.clone());
            self.ctx.history.push_state(&location, descriptor.title()).await;
        }

        self.state.phase = Phase::Navigating;
        self.ctx.surface.set_interactable(false);

        if let Some(mut outgoing) = self.state.current_screen.take() {
            let left = self.state.current_route.clone().unwrap_or_else(|| route.clone());
            let released =
                bounded(self.config.step_timeout, &left, Stage::Cleanup, outgoing.cleanup()).await;
            drop(outgoing);
            self.state.clear_current();
            released?;
        }

        let props = descriptor.props_with(&target.params);
        let ctx = ScreenContext {
            route_id: route.clone(),
            props: props.clone(),
            navigator: self.navigator.clone(),
        };
        let mut incoming = descriptor
            .factory()
            .create(ctx)
            .map_err(|e| TransitionFailure::new(route.clone(), Stage::Construct, e))?;

        let rendered =
            bounded(self.config.step_timeout, route, Stage::Render, incoming.render(&props)).await;
        let output = match rendered {
            Ok(output) => output,
            Err(failure) => {
                release_failed(incoming, route, self.config.step_timeout).await;
                return Err(failure);
            },
        };

        if let Err(e) = self.ctx.surface.apply(output) {
            release_failed(incoming, route, self.config.step_timeout).await;
            return Err(TransitionFailure::new(route.clone(), Stage::Apply, e));
        }
        self.ctx.surface.scroll_to_top();

        let initialized =
            bounded(self.config.step_timeout, route, Stage::Init, incoming.init()).await;
        if let Err(failure) = initialized {
            release_failed(incoming, route, self.config.step_timeout).await;
            return Err(failure);
        }

        let chrome = descriptor.chrome();
        self.ctx.chrome.set_visibility(chrome);
        self.ctx.chrome.set_title(descriptor.title());
        self.ctx
            .chrome
            .set_document_title(&format!("{} - {}", descriptor.title(), self.config.app_name));
        if chrome.show_bottom_nav {
            self.ctx.chrome.set_active_tab(route);
        }

        self.state.current_route = Some(route.clone());
        self.state.current_params = target.params.clone();
        self.state.current_screen = Some(incoming);
        self.state.phase = Phase::Idle;
        self.ctx.surface.set_interactable(true);

        Ok(())
    }

    fn settle_failed(&mut self, failure: &TransitionFailure) {
        tracing::error!("Navigation failed: {failure}");
        self.state.clear_current();
        self.state.phase = Phase::Failed;
        self.ctx.surface.set_interactable(true);
        self.ctx.notifier.notify(FAILURE_MESSAGE, Severity::Error);
    }
}

/// Release a screen whose render, apply or init failed.
async fn release_failed(mut screen: Box<dyn Screen>, route: &RouteId, limit: Option<Duration>) {
    if let Err(e) = bounded(limit, route, Stage::Cleanup, screen.cleanup()).await {
        tracing::warn!("Failed to release screen after failed transition: {e}");
    }
}

/// Await a lifecycle step, bounded by `limit` when set.
async fn bounded<T, F>(
    limit: Option<Duration>,
    route: &RouteId,
    stage: Stage,
    step: F,
) -> Result<T, TransitionFailure>
where
    F: Future<Output = Result<T, ScreenError>>,
{
    let outcome = match limit {
        Some(limit) => match tokio::time::timeout(limit, step).await {
            Ok(outcome) => outcome.map_err(FailureCause::from),
            Err(_) => Err(FailureCause::Timeout(limit)),
        },
        None => step.await.map_err(FailureCause::from),
    };
    outcome.map_err(|cause| TransitionFailure::new(route.clone(), stage, cause))
}
