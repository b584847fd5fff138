//! Headless shell for Stella
//!
//! A line-oriented host for [`stella_app::NavigationController`]. Screens
//! render as markup and every host effect prints as a tagged line, so a
//! route table can be walked through from a terminal or a script.
//!
//! All navigation logic lives in `stella-app`; this crate only handles
//! terminal I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod runtime;
pub mod screens;
pub mod session;
pub mod terminal;

pub use command::{Command, CommandError};
pub use runtime::{Shell, ShellError, ShellOptions};
pub use terminal::{Capture, Console};

/// Marketplace route table used when no `--routes` file is given.
pub const DEFAULT_ROUTES: &str = include_str!("../routes.toml");
