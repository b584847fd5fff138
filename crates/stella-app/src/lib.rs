//! Navigation and screen lifecycle for Stella
//!
//! A single controller owns "where the user is": it resolves route ids,
//! evaluates auth/role guards, keeps a bounded back stack in lockstep with the
//! host's native history, drives screen lifecycles and updates navigation
//! chrome. Every host effect goes through an explicit [`AppContext`], so the
//! same code runs under the simulation harness and in production frontends.
//!
//! # Components
//!
//! - [`NavigationController`]: transition state machine
//! - [`RouteTable`]: immutable route descriptors and screen factories
//! - [`Screen`]: render/init/cleanup/preload lifecycle contract
//! - [`Navigator`]: queued navigation requests, served first-in first-out
//! - [`AppContext`]: session, surface, chrome, notifier, history and clock

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod controller;
mod error;
mod host;
mod navigator;
mod request;
mod route;
mod screen;
mod state;

pub use controller::{
    ACTION_ROUTES, COMMON_ROUTES, ControllerConfig, DEFAULT_MAX_REDIRECTS, NavigationController,
};
pub use error::{FailureCause, NavigationError, Stage, TransitionFailure};
pub use host::{
    AppContext, ChromeController, NativeHistory, Notifier, RenderSurface, SessionProvider,
    Severity, SurfaceError,
};
pub use navigator::Navigator;
pub use request::NavRequest;
pub use route::{RouteDescriptor, RouteError, RouteTable, RouteTableBuilder, ScreenRegistry};
pub use screen::{
    NodeHandle, Props, RenderOutput, Screen, ScreenContext, ScreenError, ScreenFactory,
};
pub use state::{NavigationSnapshot, Phase};
