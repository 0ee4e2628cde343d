//! Session lifecycle owner.
//!
//! The manager wraps the pure state machine in [`crate::session`] with its
//! effects: credential persistence, backend calls, and navigation. All
//! mutations are serialized through one operation lock; that single choice
//! coalesces concurrent restores, makes 401 teardown idempotent, and gives
//! a logout the last word over any login still in flight.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::backend::AuthBackend;
use crate::credential::CredentialStore;
use crate::error::AuthError;
use crate::guard::{Navigator, RouteGuard};
use crate::session::{Session, SessionEvent, SessionStatus};
use crate::user::User;

/// Teardown entry point for the response guard.
///
/// Implemented by [`SessionManager`] and registered once with the HTTP
/// client at application start; the client feeds every observed 401 on the
/// guarded request surface through it.
#[async_trait]
pub trait SessionTeardown: Send + Sync {
    /// Reacts to an authenticated call being rejected with 401.
    ///
    /// Safe to invoke from any number of concurrent callers; the side
    /// effects run at most once per established session.
    async fn handle_unauthorized(&self);
}

/// Owns the session state machine and its effects.
///
/// One instance lives for the whole application, held by the root context
/// and shared by reference with every caller that needs `login`, `logout`,
/// or the current session snapshot.
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    guard: Arc<RouteGuard>,
    state: watch::Sender<Session>,
    ops: Mutex<()>,
}

impl SessionManager {
    /// Creates a manager with a session in the initial unresolved state.
    #[must_use]
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        guard: Arc<RouteGuard>,
    ) -> Self {
        let (state, _) = watch::channel(Session::unknown());
        Self {
            backend,
            store,
            navigator,
            guard,
            state,
            ops: Mutex::new(()),
        }
    }

    /// Returns the current session snapshot.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribes to session snapshots.
    ///
    /// The receiver always observes the latest settled state; intermediate
    /// states may be skipped under fast transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Returns the authenticated user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Returns true once an identity has been confirmed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns true for an established admin session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Returns true for an established manager session.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.state.borrow().is_manager()
    }

    /// Returns true for an established employee session.
    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.state.borrow().is_employee()
    }

    /// Resolves the session from any previously stored credential.
    ///
    /// Invoked once at process start, before the first route decision. With
    /// no stored token the session settles unauthenticated without a
    /// network call. Concurrent calls coalesce: whichever caller enters
    /// first performs the verification, the rest observe the settled state.
    pub async fn restore(&self) -> Session {
        let _ops = self.ops.lock().await;
        if self.session().status() != SessionStatus::Unknown {
            return self.session();
        }

        if self.store.load().is_none() {
            debug!("no stored credential, session settles unauthenticated");
            self.apply(SessionEvent::AuthenticationFailed);
            return self.session();
        }

        self.apply(SessionEvent::AuthenticationStarted);
        match self.backend.current_user().await {
            Ok(user) => {
                debug!(username = %user.username(), "stored credential verified");
                self.apply(SessionEvent::AuthenticationSucceeded(user));
            }
            Err(error) => {
                // Expired, revoked, or unreachable: degrade silently to
                // logged out rather than surfacing an error at startup.
                debug!(error = %error, "stored credential rejected, discarding");
                self.store.clear();
                self.apply(SessionEvent::AuthenticationFailed);
            }
        }
        self.session()
    }

    /// Submits credentials and establishes the session.
    ///
    /// On success the stored credential is replaced, the user snapshot is
    /// set, and navigation proceeds to the pending intent or home. On
    /// failure the session is left as it was (an earlier established
    /// session survives a failed re-login) and the typed error is returned
    /// for inline display. No automatic retry.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let _ops = self.ops.lock().await;
        let previous = self.session();
        self.apply(SessionEvent::AuthenticationStarted);

        match self.backend.login(username, password).await {
            Ok(response) => {
                self.store.save(&response.token);
                let user = response.user;
                self.apply(SessionEvent::AuthenticationSucceeded(user.clone()));
                let target = self.guard.post_login_target();
                debug!(username = %user.username(), target = %target, "login succeeded");
                self.navigator.navigate(&target);
                Ok(user)
            }
            Err(error) => {
                debug!(error = %error, "login failed");
                if previous.status() != SessionStatus::Authenticated {
                    self.apply(SessionEvent::AuthenticationFailed);
                }
                Err(error)
            }
        }
    }

    /// Ends the session.
    ///
    /// The remote call is best-effort: a failure is logged and local
    /// teardown proceeds regardless. The credential is discarded, the user
    /// cleared, and navigation moves to the login destination.
    pub async fn logout(&self) {
        let _ops = self.ops.lock().await;

        if self.store.load().is_some() {
            if let Err(error) = self.backend.logout().await {
                warn!(error = %error, "remote logout failed, proceeding with local teardown");
            }
        }

        self.store.clear();
        self.apply(SessionEvent::LoggedOut);
        self.navigator.navigate(&self.guard.paths().login);
    }

    /// Rotates the account password.
    ///
    /// A wrong current password surfaces as
    /// [`AuthError::InvalidCredentials`] and leaves the session standing.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::SessionExpired);
        }
        self.backend.change_password(current, new).await
    }

    fn apply(&self, event: SessionEvent) {
        self.state.send_modify(|session| *session = session.apply(event));
    }
}

#[async_trait]
impl SessionTeardown for SessionManager {
    async fn handle_unauthorized(&self) {
        let _ops = self.ops.lock().await;
        if self.session().status() == SessionStatus::Unauthenticated {
            // A concurrent 401 already tore the session down.
            return;
        }

        warn!("authenticated call rejected, tearing down session");
        self.store.clear();
        self.apply(SessionEvent::UnauthorizedObserved);
        self.navigator.navigate(&self.guard.paths().login);
    }
}
