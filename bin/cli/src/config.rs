//! Client configuration.
//!
//! Loaded from `TIMECLOCK_`-prefixed environment variables via the `config`
//! crate. Only the service origin is required; everything else carries a
//! sensible default.

use std::path::PathBuf;

use serde::Deserialize;
use timeclock_session::RoutePaths;

/// Configuration for the command-line client.
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Origin of the tracking service, e.g. `http://localhost:8000`.
    pub api_url: String,

    /// Where the bearer token is persisted. Defaults to a token file under
    /// the user's configuration directory.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Route paths used for navigation decisions.
    #[serde(default)]
    pub routes: RoutePaths,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `TIMECLOCK_ROUTES__LOGIN`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("TIMECLOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the credential file path, applying the default when unset.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(default_token_path)
    }
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timeclock")
        .join("token")
}
