//! Port trait for the authentication endpoints of the tracking service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::user::User;

/// Successful login payload: the bearer token plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token; the client never inspects its structure.
    pub token: String,
    /// Snapshot of the account that logged in.
    pub user: User,
}

/// Authentication endpoints of the tracking service.
///
/// The session manager talks to the backend exclusively through this trait;
/// the HTTP adapter lives in the api crate. Credential attachment for the
/// authenticated calls is the adapter's concern; it reads the store fresh
/// at send time rather than taking a token parameter here.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /api/auth/login`: exchanges credentials for a token and user
    /// snapshot.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError>;

    /// `GET /api/auth/me`: verifies the stored credential and returns the
    /// identity behind it.
    async fn current_user(&self) -> Result<User, AuthError>;

    /// `POST /api/auth/logout`: remote invalidation. Callers treat this as
    /// best-effort.
    async fn logout(&self) -> Result<(), AuthError>;

    /// `POST /api/auth/change-password`: rotates the account password.
    async fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError>;
}
