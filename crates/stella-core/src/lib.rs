//! Core navigation building blocks for Stella
//!
//! Pure, I/O-free types shared by the navigation controller, the simulation
//! harness and every host. Nothing in this crate suspends, logs or touches a
//! rendering surface.
//!
//! # Components
//!
//! - [`AuthGate`]: deterministic guard decision for a route and a session
//! - [`HistoryStack`]: bounded internal back stack
//! - [`Location`]: URL fragment, native history state and deep-link parsing
//! - [`StellaConfig`]: route table and navigation configuration loaded from
//!   TOML
//! - [`Clock`]: time source for history timestamps

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod guard;
pub mod history;
pub mod ids;
pub mod location;

pub use config::{ChromeSpec, NavigationConfig, RoleDefaults, RouteConfig, StellaConfig};
pub use env::{Clock, SystemClock};
pub use error::{ConfigError, LocationError};
pub use guard::{AuthGate, Decision, RouteAccess, SessionContext};
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryEntry, HistoryStack};
pub use ids::{Params, Role, RouteId};
pub use location::{DeepLink, HistoryState, Location};
