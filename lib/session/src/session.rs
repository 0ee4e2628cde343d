//! Session state machine.
//!
//! A session is the client's belief about whether, and as whom, the user is
//! currently authenticated. The lifecycle is driven by named events fed into
//! one transition function; the session manager supplies the effects around
//! it (storage, network, navigation), so the machine itself stays
//! independent of any rendering or I/O concern.

use crate::user::User;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Process start; no decision has been made yet.
    Unknown,
    /// A stored credential is being verified or submitted credentials are
    /// in flight.
    Authenticating,
    /// The backend confirmed an identity; `user` is populated.
    Authenticated,
    /// Logged out; no credential is trusted.
    Unauthenticated,
}

/// Named transition triggers for the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Verification of a stored credential, or a login submission, started.
    AuthenticationStarted,
    /// The backend confirmed the identity behind the credential.
    AuthenticationSucceeded(User),
    /// Verification or login settled without an identity.
    AuthenticationFailed,
    /// The user ended the session.
    LoggedOut,
    /// An authenticated call was rejected with 401.
    UnauthorizedObserved,
}

/// Session snapshot: the lifecycle status plus the user it was established
/// for.
///
/// The constructors are the only way to build a snapshot, which is what
/// keeps `user` populated exactly when the status is
/// [`SessionStatus::Authenticated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    user: Option<User>,
}

impl Session {
    /// Initial state at process start.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
        }
    }

    /// Verification or login in flight.
    #[must_use]
    pub fn authenticating() -> Self {
        Self {
            status: SessionStatus::Authenticating,
            user: None,
        }
    }

    /// Established session for the given user.
    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
        }
    }

    /// Settled logged-out state.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
        }
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the authenticated user, if the session is established.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns true once an identity has been confirmed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Returns true for an established admin session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role().is_admin())
    }

    /// Returns true for an established manager session.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role().is_manager())
    }

    /// Returns true for an established employee session.
    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role().is_employee())
    }

    /// Applies a transition event, returning the resulting session.
    ///
    /// An established session stays visible while a re-authentication
    /// attempt is in flight; it never passes back through
    /// [`SessionStatus::Authenticating`]. Every terminal event
    /// (failure, logout, observed 401) settles to
    /// [`SessionStatus::Unauthenticated`] with the user cleared.
    #[must_use]
    pub fn apply(&self, event: SessionEvent) -> Session {
        match (self.status, event) {
            (SessionStatus::Authenticated, SessionEvent::AuthenticationStarted) => self.clone(),
            (_, SessionEvent::AuthenticationStarted) => Self::authenticating(),
            (_, SessionEvent::AuthenticationSucceeded(user)) => Self::authenticated(user),
            (
                _,
                SessionEvent::AuthenticationFailed
                | SessionEvent::LoggedOut
                | SessionEvent::UnauthorizedObserved,
            ) => Self::unauthenticated(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unknown()
    }
}
