//! Route gating and post-login redirect bookkeeping.
//!
//! The guard is the access-control checkpoint evaluated before rendering
//! any protected view. Evaluation is pure with respect to session state and
//! is never cached, so role and session changes take effect on the very
//! next navigation. The only state the guard keeps is the pending
//! post-login intent, held for a single redirect round-trip.

use std::sync::{Mutex, PoisonError};

use serde::Deserialize;

use crate::role::Role;
use crate::session::{Session, SessionStatus};
use crate::user::User;

/// Navigation sink driven by the session core.
///
/// The application root supplies the implementation: a browser shell would
/// change the location, the command-line shell reports where the
/// application would go.
pub trait Navigator: Send + Sync {
    /// Moves the application to the given path.
    fn navigate(&self, path: &str);
}

/// Well-known navigation targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoutePaths {
    /// Login destination for unauthenticated redirects.
    #[serde(default = "default_login_path")]
    pub login: String,
    /// Post-login destination when no intent is pending.
    #[serde(default = "default_home_path")]
    pub home: String,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: default_login_path(),
            home: default_home_path(),
        }
    }
}

/// The destination a user was trying to reach before being sent to login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    /// The originally requested path.
    pub target_path: String,
}

/// Outcome of a route-guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session status is not settled yet; render a neutral placeholder and
    /// re-evaluate once it is. No redirect: deciding now would flash the
    /// login page at users whose stored credential is still being verified.
    Loading,
    /// Not authenticated; the caller should move to the login path. The
    /// requested destination has been remembered for after login.
    RedirectToLogin,
    /// Authenticated, but the target requires a different role. Terminal:
    /// no automatic redirect away from the denial.
    Denied {
        /// The role the target requires.
        required: Role,
    },
    /// Render the protected content.
    Allow,
}

/// Access-control checkpoint for navigation targets.
pub struct RouteGuard {
    paths: RoutePaths,
    pending: Mutex<Option<NavigationIntent>>,
}

impl RouteGuard {
    /// Creates a guard for the given route paths.
    #[must_use]
    pub fn new(paths: RoutePaths) -> Self {
        Self {
            paths,
            pending: Mutex::new(None),
        }
    }

    /// Returns the configured route paths.
    #[must_use]
    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }

    /// Decides whether `target_path` may render for the given session.
    pub fn evaluate(
        &self,
        session: &Session,
        target_path: &str,
        required_role: Option<Role>,
    ) -> RouteDecision {
        match session.status() {
            SessionStatus::Unknown | SessionStatus::Authenticating => RouteDecision::Loading,
            SessionStatus::Unauthenticated => {
                if target_path == self.paths.login {
                    // A fresh visit to the login page abandons any stale intent.
                    self.pending_slot().take();
                    return RouteDecision::Allow;
                }
                *self.pending_slot() = Some(NavigationIntent {
                    target_path: target_path.to_string(),
                });
                RouteDecision::RedirectToLogin
            }
            SessionStatus::Authenticated => match required_role {
                Some(required) if session.user().map(User::role) != Some(required) => {
                    RouteDecision::Denied { required }
                }
                _ => RouteDecision::Allow,
            },
        }
    }

    /// Returns the pending intent without consuming it.
    #[must_use]
    pub fn pending_intent(&self) -> Option<NavigationIntent> {
        self.pending_slot().clone()
    }

    /// Consumes the pending intent, if any.
    pub fn take_intent(&self) -> Option<NavigationIntent> {
        self.pending_slot().take()
    }

    /// Consumes the pending intent and returns the path to navigate to
    /// after a successful login, defaulting to home.
    pub fn post_login_target(&self) -> String {
        self.take_intent()
            .map_or_else(|| self.paths.home.clone(), |intent| intent.target_path)
    }

    fn pending_slot(&self) -> std::sync::MutexGuard<'_, Option<NavigationIntent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeclock_core::UserId;

    fn guard() -> RouteGuard {
        RouteGuard::new(RoutePaths::default())
    }

    fn session_for(role: Role) -> Session {
        Session::authenticated(User::new(UserId::new(1), "alice", role, None))
    }

    #[test]
    fn unsettled_session_suspends_the_decision() {
        let guard = guard();
        assert_eq!(
            guard.evaluate(&Session::unknown(), "/employees", None),
            RouteDecision::Loading
        );
        assert_eq!(
            guard.evaluate(&Session::authenticating(), "/employees", None),
            RouteDecision::Loading
        );
        // No intent is captured while the decision is suspended.
        assert!(guard.pending_intent().is_none());
    }

    #[test]
    fn unauthenticated_visit_captures_intent_and_redirects() {
        let guard = guard();
        let decision = guard.evaluate(&Session::unauthenticated(), "/employees", None);
        assert_eq!(decision, RouteDecision::RedirectToLogin);
        assert_eq!(
            guard.pending_intent(),
            Some(NavigationIntent {
                target_path: "/employees".to_string()
            })
        );
    }

    #[test]
    fn login_page_is_reachable_while_unauthenticated() {
        let guard = guard();
        guard.evaluate(&Session::unauthenticated(), "/reports", None);
        assert!(guard.pending_intent().is_some());

        // Arriving at the login page directly discards the stale intent.
        let decision = guard.evaluate(&Session::unauthenticated(), "/login", None);
        assert_eq!(decision, RouteDecision::Allow);
        assert!(guard.pending_intent().is_none());
    }

    #[test]
    fn matching_role_allows() {
        let guard = guard();
        let decision = guard.evaluate(&session_for(Role::Manager), "/reports", Some(Role::Manager));
        assert_eq!(decision, RouteDecision::Allow);
    }

    #[test]
    fn mismatched_role_is_denied_not_redirected() {
        let guard = guard();
        let decision = guard.evaluate(&session_for(Role::Admin), "/reports", Some(Role::Manager));
        assert_eq!(
            decision,
            RouteDecision::Denied {
                required: Role::Manager
            }
        );
        assert!(guard.pending_intent().is_none());
    }

    #[test]
    fn authenticated_without_role_requirement_allows() {
        let guard = guard();
        let decision = guard.evaluate(&session_for(Role::Employee), "/dashboard", None);
        assert_eq!(decision, RouteDecision::Allow);
    }

    #[test]
    fn post_login_target_consumes_the_intent_once() {
        let guard = guard();
        guard.evaluate(&Session::unauthenticated(), "/employees", None);

        assert_eq!(guard.post_login_target(), "/employees");
        // Consumed: the next login lands on home.
        assert_eq!(guard.post_login_target(), "/");
    }

    #[test]
    fn route_paths_defaults() {
        let paths = RoutePaths::default();
        assert_eq!(paths.login, "/login");
        assert_eq!(paths.home, "/");
    }
}
