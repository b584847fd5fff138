//! Scripted screens with fault injection.
//!
//! A [`ScriptedFactory`] backs every route of a simulated host. What each
//! screen does is decided per route by the shared [`Scripts`]: fail or hang
//! at a chosen lifecycle step, and queue navigation requests from `init`.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use stella_app::{
    NavRequest, Navigator, Props, RenderOutput, Screen, ScreenContext, ScreenError, ScreenFactory,
};
use stella_core::RouteId;

use crate::{Effect, Journal};

/// Screen lifecycle step a fault can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Factory construction. Hangs are treated as failures.
    Construct,
    /// `render`.
    Render,
    /// `init`.
    Init,
    /// `cleanup`.
    Cleanup,
    /// `preload`.
    Preload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Construct => "construct",
            Self::Render => "render",
            Self::Init => "init",
            Self::Cleanup => "cleanup",
            Self::Preload => "preload",
        };
        f.write_str(label)
    }
}

/// Injected misbehaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Return an error from the step.
    Fail(Step),
    /// Never complete the step.
    Hang(Step),
}

impl Fault {
    fn step(self) -> Step {
        match self {
            Self::Fail(step) | Self::Hang(step) => step,
        }
    }
}

/// Behaviour of the screens built for one route.
#[derive(Debug, Clone, Default)]
pub struct ScreenScript {
    /// Injected fault, if any.
    pub fault: Option<Fault>,
    /// Requests queued through the screen's navigator when `init` completes.
    pub on_init: Vec<NavRequest>,
}

/// Per-route scripts shared by all factories of a host.
#[derive(Debug, Clone, Default)]
pub struct Scripts {
    inner: Arc<Mutex<HashMap<RouteId, ScreenScript>>>,
}

impl Scripts {
    /// Make screens of `route` fail at `step`.
    pub fn fail(&self, route: impl Into<RouteId>, step: Step) {
        self.lock().entry(route.into()).or_default().fault = Some(Fault::Fail(step));
    }

    /// Make screens of `route` hang at `step`.
    pub fn hang(&self, route: impl Into<RouteId>, step: Step) {
        self.lock().entry(route.into()).or_default().fault = Some(Fault::Hang(step));
    }

    /// Queue `request` whenever a screen of `route` finishes `init`.
    pub fn on_init(&self, route: impl Into<RouteId>, request: NavRequest) {
        self.lock().entry(route.into()).or_default().on_init.push(request);
    }

    /// Restore default behaviour for `route`.
    pub fn reset(&self, route: &RouteId) {
        self.lock().remove(route);
    }

    /// Script currently in force for `route`.
    pub fn get(&self, route: &RouteId) -> ScreenScript {
        self.lock().get(route).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RouteId, ScreenScript>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instance counters shared by all scripted screens of a host.
#[derive(Debug, Default)]
pub struct Lifecycle {
    created: AtomicU64,
    alive: AtomicUsize,
}

impl Lifecycle {
    /// Screens constructed so far.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Screens constructed and not yet dropped.
    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }

    fn spawn(&self) -> u64 {
        self.alive.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) {
        self.alive.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Factory producing [`ScriptedScreen`]s.
#[derive(Debug, Clone)]
pub struct ScriptedFactory {
    journal: Journal,
    scripts: Scripts,
    lifecycle: Arc<Lifecycle>,
}

impl ScriptedFactory {
    /// Create a factory.
    pub fn new(journal: Journal, scripts: Scripts, lifecycle: Arc<Lifecycle>) -> Self {
        Self { journal, scripts, lifecycle }
    }
}

impl ScreenFactory for ScriptedFactory {
    fn create(&self, ctx: ScreenContext) -> Result<Box<dyn Screen>, ScreenError> {
        let script = self.scripts.get(&ctx.route_id);
        if script.fault.is_some_and(|fault| fault.step() == Step::Construct) {
            return Err(ScreenError::new(format!("construct failed on {}", ctx.route_id)));
        }

        let instance = self.lifecycle.spawn();
        self.journal.record(Effect::Created { route: ctx.route_id.to_string(), instance });

        Ok(Box::new(ScriptedScreen {
            route: ctx.route_id,
            instance,
            props: ctx.props,
            navigator: ctx.navigator,
            script,
            journal: self.journal.clone(),
            lifecycle: Arc::clone(&self.lifecycle),
        }))
    }
}

/// Screen that follows its route's script and journals every call.
#[derive(Debug)]
pub struct ScriptedScreen {
    route: RouteId,
    instance: u64,
    props: Props,
    navigator: Navigator,
    script: ScreenScript,
    journal: Journal,
    lifecycle: Arc<Lifecycle>,
}

impl ScriptedScreen {
    async fn step(&self, step: Step) -> Result<(), ScreenError> {
        match self.script.fault {
            Some(Fault::Fail(target)) if target == step => {
                Err(ScreenError::new(format!("{step} failed on {}", self.route)))
            },
            Some(Fault::Hang(target)) if target == step => {
                std::future::pending::<()>().await;
                Ok(())
            },
            _ => Ok(()),
        }
    }

    fn route(&self) -> String {
        self.route.to_string()
    }
}

#[async_trait]
impl Screen for ScriptedScreen {
    async fn render(&mut self, props: &Props) -> Result<RenderOutput, ScreenError> {
        self.step(Step::Render).await?;
        self.journal.record(Effect::Rendered { route: self.route(), instance: self.instance });

        let mut markup = format!("{}#{}", self.route, self.instance);
        for (key, value) in props {
            markup.push_str(&format!(" {key}={value}"));
        }
        Ok(RenderOutput::Markup(markup))
    }

    async fn init(&mut self) -> Result<(), ScreenError> {
        self.step(Step::Init).await?;
        self.journal.record(Effect::Initialized { route: self.route(), instance: self.instance });

        for request in self.script.on_init.drain(..) {
            self.navigator.send(request);
        }
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), ScreenError> {
        self.journal.record(Effect::CleanedUp { route: self.route(), instance: self.instance });
        self.step(Step::Cleanup).await
    }

    async fn preload(&mut self) -> Result<(), ScreenError> {
        self.step(Step::Preload).await?;
        self.journal.record(Effect::Preloaded { route: self.route(), instance: self.instance });
        tracing::trace!("preloaded {} with {:?}", self.route, self.props);
        Ok(())
    }
}

impl Drop for ScriptedScreen {
    fn drop(&mut self) {
        self.lifecycle.release();
    }
}
