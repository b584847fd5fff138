//! Screen lifecycle contract.
//!
//! Every screen is polymorphic over the same four capabilities, each with a
//! no-op default so a screen only implements what it needs:
//!
//! - [`Screen::render`]: produce visual content, no side effects on shared
//!   state
//! - [`Screen::init`]: bind handlers and start per-screen async work
//! - [`Screen::cleanup`]: release what `init` acquired
//! - [`Screen::preload`]: warm caches ahead of a likely transition
//!
//! # Ordering
//!
//! For every transition away from a screen, its `cleanup` completes before the
//! incoming screen is constructed, rendered or initialized. `cleanup` must be
//! idempotent and safe to call when `init` never ran (a screen whose `render`
//! failed is still cleaned up).

use async_trait::async_trait;
use stella_core::{Params, RouteId};
use thiserror::Error;

use crate::Navigator;

/// Props a screen is constructed with: route defaults overlaid with
/// navigation parameters.
pub type Props = Params;

/// Host-side node reference. Opaque to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// Visual content produced by [`Screen::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    /// Markup text to replace the surface content with.
    Markup(String),
    /// Pre-built host node to mount in place of the surface content.
    Node(NodeHandle),
}

impl RenderOutput {
    /// Empty markup.
    pub fn empty() -> Self {
        Self::Markup(String::new())
    }
}

/// Failure raised by a screen or its factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ScreenError {
    message: String,
}

impl ScreenError {
    /// Create a screen error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A unit of UI content driven by the navigation controller.
#[async_trait]
pub trait Screen: Send {
    /// Produce the screen's visual content.
    async fn render(&mut self, _props: &Props) -> Result<RenderOutput, ScreenError> {
        Ok(RenderOutput::empty())
    }

    /// Bind handlers and start per-screen work. Runs after the rendered output
    /// is applied to the surface.
    async fn init(&mut self) -> Result<(), ScreenError> {
        Ok(())
    }

    /// Release handlers, timers and subscriptions created by `init`.
    async fn cleanup(&mut self) -> Result<(), ScreenError> {
        Ok(())
    }

    /// Warm up ahead of a likely transition. Never rendered or initialized.
    async fn preload(&mut self) -> Result<(), ScreenError> {
        Ok(())
    }
}

/// Everything a factory may use to build a screen.
#[derive(Debug, Clone)]
pub struct ScreenContext {
    /// Route the screen is built for.
    pub route_id: RouteId,
    /// Route defaults overlaid with navigation parameters.
    pub props: Props,
    /// Handle for queuing further navigation from inside the screen.
    pub navigator: Navigator,
}

/// Constructs screens for a route.
pub trait ScreenFactory: Send + Sync {
    /// Build a fresh screen instance.
    fn create(&self, ctx: ScreenContext) -> Result<Box<dyn Screen>, ScreenError>;
}

impl<F> ScreenFactory for F
where
    F: Fn(ScreenContext) -> Result<Box<dyn Screen>, ScreenError> + Send + Sync,
{
    fn create(&self, ctx: ScreenContext) -> Result<Box<dyn Screen>, ScreenError> {
        self(ctx)
    }
}
