//! Application context assembly.
//!
//! The context is the single owner of the session core's collaborators:
//! credential store, HTTP client, route guard, and session manager. It is
//! built once at startup and passed by reference to whatever needs the
//! session; no ambient globals.

use std::sync::Arc;

use timeclock_api::{ApiClient, ApiError};
use timeclock_core::Result;
use timeclock_session::{
    CredentialStore, FileCredentialStore, Navigator, RouteGuard, SessionManager,
};

use crate::config::ClientConfig;

/// Prints where the application would move, the command-line stand-in for
/// a browser location change.
pub struct ShellNavigator;

impl Navigator for ShellNavigator {
    fn navigate(&self, path: &str) {
        println!("navigating to {path}");
    }
}

/// The application's root object graph.
pub struct AppContext {
    /// Guarded request surface for everything beyond authentication.
    pub client: Arc<ApiClient>,
    /// Session lifecycle owner.
    pub manager: Arc<SessionManager>,
    /// Access-control checkpoint for navigation targets.
    pub guard: Arc<RouteGuard>,
}

impl AppContext {
    /// Assembles the context, wiring the 401 teardown hook exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be constructed.
    pub fn build(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.token_path()));
        let client = Arc::new(ApiClient::new(&config.api_url, store.clone())?);
        let guard = Arc::new(RouteGuard::new(config.routes.clone()));
        let manager = Arc::new(SessionManager::new(
            client.clone(),
            store,
            navigator,
            guard.clone(),
        ));
        client.register_teardown(manager.clone());

        Ok(Self {
            client,
            manager,
            guard,
        })
    }
}
