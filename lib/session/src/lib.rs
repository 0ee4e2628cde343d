//! Session and authorization core for the timeclock client.
//!
//! This crate provides:
//! - Credential persistence (`CredentialStore` and its file/memory stores)
//! - The user and role model (`User`, `Role`)
//! - The session state machine (`Session`, `SessionEvent`)
//! - The session lifecycle owner (`SessionManager`)
//! - Route gating with post-login redirect (`RouteGuard`)
//!
//! # Lifecycle
//!
//! A session starts unresolved, is restored from any persisted credential
//! at process start, and settles authenticated or unauthenticated. Every
//! later transition (login, logout, an observed 401) is a named event
//! fed through one transition function, so the lifecycle is testable
//! without a UI or a network.
//!
//! # Example
//!
//! ```
//! use timeclock_core::UserId;
//! use timeclock_session::{Role, RouteDecision, RouteGuard, RoutePaths, Session, User};
//!
//! let guard = RouteGuard::new(RoutePaths::default());
//!
//! // Before sign-in a protected page redirects and remembers the target.
//! let decision = guard.evaluate(&Session::unauthenticated(), "/employees", None);
//! assert_eq!(decision, RouteDecision::RedirectToLogin);
//! assert_eq!(guard.post_login_target(), "/employees");
//!
//! // Once authenticated, the same evaluation renders the page, unless the
//! // target demands a role the account does not carry.
//! let user = User::new(UserId::new(1), "alice", Role::Manager, None);
//! let session = Session::authenticated(user);
//! assert_eq!(guard.evaluate(&session, "/employees", None), RouteDecision::Allow);
//! assert_eq!(
//!     guard.evaluate(&session, "/users", Some(Role::Admin)),
//!     RouteDecision::Denied { required: Role::Admin }
//! );
//! ```

pub mod backend;
pub mod credential;
pub mod error;
pub mod guard;
pub mod manager;
pub mod role;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use backend::{AuthBackend, LoginResponse};
pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::AuthError;
pub use guard::{NavigationIntent, Navigator, RouteDecision, RouteGuard, RoutePaths};
pub use manager::{SessionManager, SessionTeardown};
pub use role::{ParseRoleError, Role};
pub use session::{Session, SessionEvent, SessionStatus};
pub use user::User;
