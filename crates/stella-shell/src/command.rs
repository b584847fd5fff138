//! Shell command parsing.
//!
//! One command per line:
//!
//! ```text
//! go <route> [key=value ...]   navigate, recorded in history
//! tap <route> [a=1&b=2]        activate a link tagged with a route
//! tab <route>                  select a bottom navigation tab
//! fab                          press the floating action button
//! back                         go back one history entry
//! pop [#fragment]              replay a native back/forward event
//! link <url>                   open a deep link
//! login <role> | logout        change the session and land on its route
//! state | history              inspect the controller
//! preload                      warm the common routes
//! help | quit
//! ```

use stella_core::{HistoryState, Location, Params, Role, RouteId};
use thiserror::Error;

/// Errors raised while parsing a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a command
    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),

    /// A required argument is missing
    #[error("usage: {0}")]
    Usage(&'static str),

    /// A `go` parameter is not `key=value`
    #[error("parameter must be key=value: {0}")]
    BadParam(String),
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// Recorded navigation.
    Go {
        /// Target route.
        route: RouteId,
        /// Navigation parameters.
        params: Params,
    },
    /// Link activation with a raw `k=v&k=v` string.
    Tap {
        /// Target route.
        route: RouteId,
        /// Raw parameter string.
        params: String,
    },
    /// Bottom navigation tab selection.
    Tab(RouteId),
    /// Floating action button press.
    Fab,
    /// Go back one entry.
    Back,
    /// Native back/forward event.
    Pop(Option<HistoryState>),
    /// Deep link.
    Link(String),
    /// Sign in.
    Login(Role),
    /// Sign out.
    Logout,
    /// Print the current state.
    State,
    /// Print the internal history.
    History,
    /// Preload the common routes.
    Preload,
    /// Print the command list.
    Help,
    /// Stop the shell.
    Quit,
}

/// Command list printed by `help`.
pub const HELP: &str = "commands: go <route> [k=v ...] | tap <route> [a=1&b=2] | \
tab <route> | fab | back | pop [#fragment] | link <url> | login <role> | logout | state | \
history | preload | help | quit";

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return Ok(Self::Empty);
        };

        match command {
            "go" => {
                let (route, rest) =
                    args.split_first().ok_or(CommandError::Usage("go <route> [k=v ...]"))?;
                let params = rest
                    .iter()
                    .map(|pair| match pair.split_once('=') {
                        Some((key, value)) if !key.is_empty() => {
                            Ok((key.to_string(), value.to_string()))
                        },
                        _ => Err(CommandError::BadParam((*pair).to_string())),
                    })
                    .collect::<Result<Params, _>>()?;
                Ok(Self::Go { route: RouteId::new(*route), params })
            },
            "tap" => {
                let route = args.first().ok_or(CommandError::Usage("tap <route> [a=1&b=2]"))?;
                let params = args.get(1).copied().unwrap_or_default().to_string();
                Ok(Self::Tap { route: RouteId::new(*route), params })
            },
            "tab" => {
                let route = args.first().ok_or(CommandError::Usage("tab <route>"))?;
                Ok(Self::Tab(RouteId::new(*route)))
            },
            "fab" => Ok(Self::Fab),
            "back" => Ok(Self::Back),
            "pop" => {
                let state =
                    args.first().and_then(|f| Location::from_fragment(f)).map(|l| l.state());
                Ok(Self::Pop(state))
            },
            "link" => {
                let url = args.first().ok_or(CommandError::Usage("link <url>"))?;
                Ok(Self::Link((*url).to_string()))
            },
            "login" => {
                let role = args.first().ok_or(CommandError::Usage("login <role>"))?;
                Ok(Self::Login(Role::new(*role)))
            },
            "logout" => Ok(Self::Logout),
            "state" => Ok(Self::State),
            "history" => Ok(Self::History),
            "preload" => Ok(Self::Preload),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
