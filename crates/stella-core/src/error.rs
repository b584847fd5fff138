//! Error types for the navigation core.
//!
//! Configuration errors are build-time invariant violations: a table that
//! fails validation must never serve a navigation. Location errors only
//! concern externally supplied deep links, fragments are parsed leniently.

use thiserror::Error;

/// Errors raised while loading or validating navigation configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration text is not valid TOML for the expected shape
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// Two route entries share the same id
    #[error("duplicate route id: {0}")]
    DuplicateRoute(String),

    /// A navigation or role setting names a route missing from the table
    #[error("{setting} refers to unknown route {route}")]
    UnknownRoute {
        /// Setting that holds the reference
        setting: String,
        /// Route id that could not be found
        route: String,
    },

    /// History limit must allow at least one entry
    #[error("history limit must be at least 1")]
    ZeroHistoryLimit,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors raised while resolving an external URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// URL has no `scheme://` prefix
    #[error("deep link has no scheme: {0}")]
    MissingScheme(String),

    /// URL has an empty path, so no route id can be derived
    #[error("deep link has no route path: {0}")]
    EmptyPath(String),
}
