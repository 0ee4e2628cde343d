//! HTTP client for the tracking service.
//!
//! One [`ApiClient`] is created at application start and shared by every
//! caller. It carries the two interception points of the session core:
//! outgoing requests pick up the stored bearer token at send time, and 401
//! responses on the guarded surface feed the registered session teardown
//! before the error is returned to the caller.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use rootcause::prelude::Report;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use timeclock_session::{
    AuthBackend, AuthError, CredentialStore, LoginResponse, SessionTeardown, User,
};

use crate::error::ApiError;

/// Timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the tracking service.
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    teardown: OnceLock<Arc<dyn SessionTeardown>>,
}

impl ApiClient {
    /// Creates a client rooted at the service origin, e.g.
    /// `http://localhost:8000`. Request paths carry the `/api` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be parsed or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, Report<ApiError>> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            details: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network {
                details: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            http,
            store,
            teardown: OnceLock::new(),
        })
    }

    /// Registers the session teardown hook.
    ///
    /// Wired exactly once when the application context is assembled; a
    /// second registration is rejected and logged so re-initialization
    /// cannot double the response guard.
    pub fn register_teardown(&self, teardown: Arc<dyn SessionTeardown>) {
        if self.teardown.set(teardown).is_err() {
            warn!("session teardown hook already registered, ignoring");
        }
    }

    /// Fetches a resource on the guarded surface.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; a 401 additionally tears down the session.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.get(url)).await
    }

    /// Creates a resource on the guarded surface.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; a 401 additionally tears down the session.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    /// Replaces a resource on the guarded surface.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; a 401 additionally tears down the session.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.put(url).json(body)).await
    }

    /// Deletes a resource on the guarded surface, discarding any body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; a 401 additionally tears down the session.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.checked(self.http.delete(url)).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                details: e.to_string(),
            })
    }

    /// Attaches the stored bearer token, if any.
    ///
    /// The store is read at send time rather than cached so a credential
    /// swapped by a concurrent login or teardown is always the one sent.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.load() {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Sends a guarded request and decodes the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.checked(request).await?;
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            details: e.to_string(),
        })
    }

    /// Sends a guarded request, feeding any 401 into the session teardown
    /// and mapping other failures, leaving the body untouched.
    async fn checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                details: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("guarded request rejected with 401, notifying session teardown");
            self.notify_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn notify_unauthorized(&self) {
        match self.teardown.get() {
            Some(teardown) => teardown.handle_unauthorized().await,
            None => warn!("401 observed before a session teardown was registered"),
        }
    }

    fn auth_endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.endpoint(path).map_err(|e| AuthError::RequestFailed {
            details: e.to_string(),
        })
    }
}

fn transport_failed(e: reqwest::Error) -> AuthError {
    AuthError::RequestFailed {
        details: e.to_string(),
    }
}

/// The authentication endpoints bypass the response guard: their 401s are
/// answers (wrong credentials, failed verification, wrong current password)
/// that the session manager handles itself, not session-expiry signals.
#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let url = self.auth_endpoint("/api/auth/login")?;
        let body = serde_json::json!({ "username": username, "password": password });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_failed)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthError::RateLimited);
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AuthError::RequestFailed {
                details: format!("status {status}: {details}"),
            });
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| AuthError::RequestFailed {
                details: e.to_string(),
            })
    }

    async fn current_user(&self) -> Result<User, AuthError> {
        let url = self.auth_endpoint("/api/auth/me")?;

        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(transport_failed)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::SessionExpired);
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AuthError::RequestFailed {
                details: format!("status {status}: {details}"),
            });
        }

        response.json::<User>().await.map_err(|e| AuthError::RequestFailed {
            details: e.to_string(),
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let url = self.auth_endpoint("/api/auth/logout")?;

        let response = self
            .authorize(self.http.post(url))
            .send()
            .await
            .map_err(transport_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RequestFailed {
                details: format!("status {status}"),
            });
        }
        Ok(())
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        let url = self.auth_endpoint("/api/auth/change-password")?;
        let body = serde_json::json!({ "currentPassword": current, "newPassword": new });

        let response = self
            .authorize(self.http.post(url).json(&body))
            .send()
            .await
            .map_err(transport_failed)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AuthError::RequestFailed {
                details: format!("status {status}: {details}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use timeclock_core::UserId;
    use timeclock_session::{
        MemoryCredentialStore, Navigator, Role, RouteGuard, RoutePaths, SessionManager,
        SessionStatus,
    };

    const VALID_TOKEN: &str = "tok_valid";

    fn admin() -> User {
        User::new(UserId::new(1), "admin", Role::Admin, None)
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    fn authorized(headers: &HeaderMap) -> bool {
        bearer(headers).as_deref() == Some(VALID_TOKEN)
    }

    async fn login_handler(
        Json(body): Json<serde_json::Value>,
    ) -> (axum::http::StatusCode, Json<serde_json::Value>) {
        let username = body["username"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        if username == "throttled" {
            return (
                axum::http::StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({"detail": "Too many attempts"})),
            );
        }
        if username == "admin" && password == "admin123" {
            let response = LoginResponse {
                token: VALID_TOKEN.to_string(),
                user: admin(),
            };
            return (
                axum::http::StatusCode::OK,
                Json(serde_json::to_value(&response).expect("serialize")),
            );
        }
        (
            axum::http::StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"detail": "Invalid credentials"})),
        )
    }

    async fn me_handler(headers: HeaderMap) -> (axum::http::StatusCode, Json<serde_json::Value>) {
        if authorized(&headers) {
            (
                axum::http::StatusCode::OK,
                Json(serde_json::to_value(admin()).expect("serialize")),
            )
        } else {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Invalid or expired token"})),
            )
        }
    }

    async fn change_password_handler(
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (axum::http::StatusCode, Json<serde_json::Value>) {
        if !authorized(&headers) || body["currentPassword"].as_str() != Some("admin123") {
            return (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Current password is incorrect"})),
            );
        }
        (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"message": "Password changed successfully"})),
        )
    }

    async fn employees_handler(
        headers: HeaderMap,
    ) -> (axum::http::StatusCode, Json<serde_json::Value>) {
        if authorized(&headers) {
            (
                axum::http::StatusCode::OK,
                Json(serde_json::json!([{"id": 1, "name": "Alice Johnson"}])),
            )
        } else {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Invalid or expired token"})),
            )
        }
    }

    async fn echo_auth_handler(headers: HeaderMap) -> Json<serde_json::Value> {
        Json(serde_json::json!({"authorization": bearer(&headers)}))
    }

    /// Spawns a loopback stub speaking the tracking service's wire contract
    /// and returns its origin.
    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/api/auth/login", post(login_handler))
            .route("/api/auth/me", get(me_handler))
            .route(
                "/api/auth/logout",
                post(|| async {
                    Json(serde_json::json!({"message": "Logged out successfully"}))
                }),
            )
            .route("/api/auth/change-password", post(change_password_handler))
            .route("/api/employees", get(employees_handler))
            .route(
                "/api/reports",
                get(|| async {
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(serde_json::json!({"detail": "Invalid or expired token"})),
                    )
                }),
            )
            .route("/api/echo-auth", get(echo_auth_handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        format!("http://{addr}")
    }

    fn client_with_store(base: &str) -> (Arc<ApiClient>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = Arc::new(ApiClient::new(base, store.clone()).expect("client"));
        (client, store)
    }

    #[derive(Default)]
    struct CountingTeardown {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionTeardown for CountingTeardown {
        async fn handle_unauthorized(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: StdMutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn recorded(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    #[tokio::test]
    async fn login_success_decodes_token_and_user() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);

        let response = client.login("admin", "admin123").await.expect("login");

        assert_eq!(response.token, VALID_TOKEN);
        assert_eq!(response.user.username(), "admin");
        assert_eq!(response.user.role(), Role::Admin);
    }

    #[tokio::test]
    async fn login_rejection_maps_to_invalid_credentials() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);

        let error = client.login("admin", "wrong").await.unwrap_err();
        assert_eq!(error, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_throttle_maps_to_rate_limited() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);

        let error = client.login("throttled", "admin123").await.unwrap_err();
        assert_eq!(error, AuthError::RateLimited);
    }

    #[tokio::test]
    async fn unreachable_backend_maps_to_request_failed() {
        // Nothing listens on this port.
        let (client, _store) = client_with_store("http://127.0.0.1:9");

        let error = client.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(error, AuthError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn verification_attaches_the_stored_token() {
        let base = spawn_stub().await;
        let (client, store) = client_with_store(&base);
        store.save(VALID_TOKEN);

        let user = client.current_user().await.expect("current user");
        assert_eq!(user.username(), "admin");
    }

    #[tokio::test]
    async fn verification_with_stale_token_is_session_expired() {
        let base = spawn_stub().await;
        let (client, store) = client_with_store(&base);
        store.save("tok_stale");

        let error = client.current_user().await.unwrap_err();
        assert_eq!(error, AuthError::SessionExpired);
    }

    #[tokio::test]
    async fn requests_without_token_carry_no_authorization_header() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);

        let echoed: serde_json::Value = client.get("/api/echo-auth").await.expect("echo");
        assert_eq!(echoed["authorization"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn token_is_read_fresh_for_each_request() {
        let base = spawn_stub().await;
        let (client, store) = client_with_store(&base);

        store.save("tok_first");
        let echoed: serde_json::Value = client.get("/api/echo-auth").await.expect("echo");
        assert_eq!(echoed["authorization"], "tok_first");

        store.save("tok_second");
        let echoed: serde_json::Value = client.get("/api/echo-auth").await.expect("echo");
        assert_eq!(echoed["authorization"], "tok_second");
    }

    #[tokio::test]
    async fn guarded_success_passes_through() {
        let base = spawn_stub().await;
        let (client, store) = client_with_store(&base);
        store.save(VALID_TOKEN);

        let employees: serde_json::Value = client.get("/api/employees").await.expect("employees");
        assert_eq!(employees[0]["name"], "Alice Johnson");
    }

    #[tokio::test]
    async fn guarded_401_notifies_teardown_and_rereturns() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);
        let teardown = Arc::new(CountingTeardown::default());
        client.register_teardown(teardown.clone());

        let error = client
            .get::<serde_json::Value>("/api/employees")
            .await
            .unwrap_err();

        assert_eq!(error, ApiError::Unauthorized);
        assert_eq!(teardown.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_401_failures_do_not_touch_the_session() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);
        let teardown = Arc::new(CountingTeardown::default());
        client.register_teardown(teardown.clone());

        let error = client
            .get::<serde_json::Value>("/api/missing")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Status { status: 404, .. }));
        assert_eq!(teardown.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_teardown_registration_is_ignored() {
        let base = spawn_stub().await;
        let (client, _store) = client_with_store(&base);
        let first = Arc::new(CountingTeardown::default());
        let second = Arc::new(CountingTeardown::default());
        client.register_teardown(first.clone());
        client.register_teardown(second.clone());

        let _ = client.get::<serde_json::Value>("/api/employees").await;

        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn change_password_with_wrong_current_maps_to_invalid_credentials() {
        let base = spawn_stub().await;
        let (client, store) = client_with_store(&base);
        store.save(VALID_TOKEN);

        let error = client.change_password("typo", "n3w").await.unwrap_err();
        assert_eq!(error, AuthError::InvalidCredentials);

        client
            .change_password("admin123", "n3w")
            .await
            .expect("change password");
    }

    #[tokio::test]
    async fn concurrent_401s_tear_down_the_session_once() {
        let base = spawn_stub().await;
        let store = Arc::new(MemoryCredentialStore::new());
        store.save(VALID_TOKEN);
        let client = Arc::new(ApiClient::new(&base, store.clone()).expect("client"));
        let guard = Arc::new(RouteGuard::new(RoutePaths::default()));
        let navigator = Arc::new(RecordingNavigator::default());
        let manager = Arc::new(SessionManager::new(
            client.clone(),
            store.clone(),
            navigator.clone(),
            guard,
        ));
        client.register_teardown(manager.clone());

        let session = manager.restore().await;
        assert!(session.is_authenticated());

        // The reports endpoint rejects every credential, as an expired
        // token would be rejected everywhere.
        let (a, b, c) = tokio::join!(
            client.get::<serde_json::Value>("/api/reports"),
            client.get::<serde_json::Value>("/api/reports"),
            client.get::<serde_json::Value>("/api/reports"),
        );

        assert_eq!(a.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(b.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(c.unwrap_err(), ApiError::Unauthorized);
        assert_eq!(manager.session().status(), SessionStatus::Unauthenticated);
        assert!(store.load().is_none());
        assert_eq!(navigator.recorded(), vec!["/login".to_string()]);
    }
}
