//! Shell runtime.
//!
//! Wires the terminal collaborators and marketplace screens into a
//! [`NavigationController`] and feeds it one command per input line. Requests
//! that screens queue while a command runs are served before the next line is
//! read.

use std::{io, sync::Arc};

use stella_app::{
    AppContext, COMMON_ROUTES, ControllerConfig, NavigationController, NavigationError, RouteError,
    RouteTable,
};
use stella_core::{ConfigError, Location, Params, Role, StellaConfig, SystemClock};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    command::{Command, HELP},
    screens,
    session::ShellSession,
    terminal::{Console, TerminalChrome, TerminalHistory, TerminalNotifier, TerminalSurface},
};

/// Shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Route configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Route table could not be built.
    #[error("route table error: {0}")]
    Routes(#[from] RouteError),

    /// Controller could not start.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

/// Command-line overrides applied on top of the route configuration.
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    /// Replaces `navigation.history_limit`.
    pub history_limit: Option<usize>,
    /// Replaces `navigation.step_timeout_ms`.
    pub step_timeout_ms: Option<u64>,
    /// Start signed in with this role.
    pub role: Option<String>,
    /// Address bar content at startup, e.g. `#cart`.
    pub open: Option<String>,
}

/// A controller driven by text commands.
pub struct Shell {
    controller: NavigationController,
    session: Arc<ShellSession>,
    history: Arc<TerminalHistory>,
    console: Console,
}

impl Shell {
    /// Build a shell from a configuration document.
    pub fn from_toml(
        text: &str,
        options: ShellOptions,
        console: Console,
    ) -> Result<Self, ShellError> {
        Self::new(StellaConfig::from_toml_str(text)?, options, console)
    }

    /// Build a shell.
    ///
    /// # Errors
    ///
    /// - `ShellError::Config` if the overrides make the configuration invalid
    /// - `ShellError::Routes` if a route names a screen the shell lacks
    /// - `ShellError::Navigation` if the safe default or login route is
    ///   missing
    pub fn new(
        mut config: StellaConfig,
        options: ShellOptions,
        console: Console,
    ) -> Result<Self, ShellError> {
        if let Some(limit) = options.history_limit {
            config.navigation.history_limit = limit;
        }
        if let Some(timeout) = options.step_timeout_ms {
            config.navigation.step_timeout_ms = Some(timeout);
        }
        config.validate()?;

        let table = RouteTable::from_config(&config, &screens::registry())?;
        tracing::info!("Loaded {} routes", table.len());

        let session =
            Arc::new(ShellSession::new(options.role.map(Role::new), config.roles.clone()));
        let history = Arc::new(TerminalHistory::new(console.clone(), options.open));

        let ctx = AppContext {
            session: session.clone(),
            surface: Arc::new(TerminalSurface::new(console.clone())),
            chrome: Arc::new(TerminalChrome::new(
                console.clone(),
                config.navigation.app_name.clone(),
            )),
            notifier: Arc::new(TerminalNotifier::new(console.clone())),
            history: history.clone(),
            clock: Arc::new(SystemClock::new()),
        };
        let controller = NavigationController::new(
            Arc::new(table),
            ctx,
            ControllerConfig::from(&config.navigation),
        )?;

        Ok(Self { controller, session, history, console })
    }

    /// Controller driven by this shell.
    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Show the initial screen.
    pub async fn start(&mut self) -> Result<(), ShellError> {
        self.controller.start().await?;
        self.controller.drain_pending().await?;
        Ok(())
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> Result<(), ShellError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.execute_line(&line).await {
                break;
            }
        }
        tracing::info!("Shell stopped");
        Ok(())
    }

    /// Run one command line. Returns `true` when the shell should stop.
    ///
    /// Errors are printed, never returned, so a bad command does not end the
    /// session.
    pub async fn execute_line(&mut self, line: &str) -> bool {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.console.line(format!("[error] {e}"));
                return false;
            },
        };
        tracing::debug!("Command: {command:?}");

        match self.execute(command).await {
            Ok(quit) => quit,
            Err(e) => {
                tracing::error!("Command failed: {e}");
                self.console.line(format!("[error] {e}"));
                false
            },
        }
    }

    async fn execute(&mut self, command: Command) -> Result<bool, NavigationError> {
        match command {
            Command::Empty => return Ok(false),
            Command::Quit => return Ok(true),
            Command::Help => {
                self.console.line(HELP);
                return Ok(false);
            },
            Command::State => {
                self.print_state();
                return Ok(false);
            },
            Command::History => {
                self.print_history();
                return Ok(false);
            },
            Command::Preload => {
                let warmed = self.controller.preload_common_routes().await;
                let total = COMMON_ROUTES.len();
                self.console.line(format!("[preload] {warmed}/{total} routes warmed"));
                return Ok(false);
            },
            Command::Go { route, params } => self.controller.navigate(route, params, true).await?,
            Command::Tap { route, params } => self.controller.handle_link(route, &params).await?,
            Command::Tab(route) => {
                if !self.controller.select_tab(route.clone()).await? {
                    self.console.line(format!("[error] {route} is not a tab"));
                }
            },
            Command::Fab => {
                self.controller.activate_action_button().await?;
            },
            Command::Back => self.controller.go_back().await?,
            Command::Pop(state) => {
                if let Some(state) = &state {
                    self.history.set_address(Location::from(state.clone()).to_fragment());
                }
                self.controller.handle_pop_state(state).await?;
            },
            Command::Link(url) => self.controller.open_deep_link(&url).await?,
            Command::Login(role) => {
                self.session.login(role);
                let landing = self.controller.default_route();
                self.controller.navigate(landing, Params::new(), true).await?;
            },
            Command::Logout => {
                self.session.logout();
                let landing = self.controller.default_route();
                self.controller.navigate(landing, Params::new(), true).await?;
            },
        }

        self.controller.drain_pending().await
    }

    fn print_state(&self) {
        let route = self.controller.current_route().map_or("-", |route| route.as_str());
        let params = self.controller.current_params();
        let params = if params.is_empty() {
            "-".to_string()
        } else {
            params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
        };
        self.console.line(format!(
            "[state] route={route} phase={} params={params}",
            self.controller.phase()
        ));
    }

    fn print_history(&self) {
        let entries = self.controller.history();
        if entries.is_empty() {
            self.console.line("[history] empty");
        }
        for (i, entry) in entries.into_iter().enumerate() {
            let location = Location::new(entry.route_id, entry.params);
            self.console.line(format!("[history] {i} {}", location.to_fragment()));
        }
    }
}
