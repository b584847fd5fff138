//! Deterministic simulation harness for Stella navigation.
//!
//! Recording implementations of every host collaborator, scripted screens with
//! fault injection, and a marketplace route fixture, wired around the real
//! [`stella_app::NavigationController`].
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the navigation
//! rules. Operations are applied to both the model and a [`SimHost`], and
//! their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold whenever the
//! controller has settled. Use [`InvariantRegistry::standard()`] for the
//! common set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collaborators;
pub mod fixtures;
pub mod invariants;
pub mod journal;
pub mod model;
pub mod screens;
pub mod sim_env;
pub mod sim_host;

pub use collaborators::{RecordingChrome, RecordingNotifier, RecordingSurface, SimHistory};
pub use fixtures::{BROKEN_ROUTE, marketplace_routes};
pub use invariants::{
    HistoryBounded, InteractableWhenSettled, Invariant, InvariantRegistry, InvariantResult,
    LiveScreenMatchesRoute, NeverSettlesNavigating, SingleLiveScreen, SystemSnapshot, Violation,
};
pub use journal::{Effect, Journal};
pub use model::{ModelWorld, ObservableState, Operation, OperationError, OperationResult};
pub use screens::{Fault, Lifecycle, ScreenScript, ScriptedFactory, ScriptedScreen, Scripts, Step};
pub use sim_env::{SimClock, SimSession};
pub use sim_host::{SimHost, SimHostBuilder, paused_runtime};
