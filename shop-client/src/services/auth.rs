//! `/auth/*`

use serde::de::IgnoredAny;
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, User};

use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::session::LogoutReason;

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sign in and persist the session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .api
            .post_with("/auth/login", &request, credentials_options())
            .await?;
        self.api.session().start(&auth).await?;
        tracing::info!(user_id = %auth.user.id, "Logged in");
        Ok(auth.user)
    }

    /// Create an account; the backend signs the new user in
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let auth: AuthResponse = self
            .api
            .post_with("/auth/register", request, credentials_options())
            .await?;
        self.api.session().start(&auth).await?;
        tracing::info!(user_id = %auth.user.id, "Registered");
        Ok(auth.user)
    }

    /// Best-effort server logout; the local session is always cleared
    pub async fn logout(&self) -> ClientResult<()> {
        let options = RequestOptions::new().skip_retry().skip_dedup();
        if let Err(e) = self
            .api
            .post_with::<IgnoredAny, _>("/auth/logout", &serde_json::json!({}), options)
            .await
        {
            tracing::warn!("Server logout failed, clearing local session anyway: {e}");
        }
        self.api.session().clear(LogoutReason::UserRequested).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Current user, refreshed from the backend
    pub async fn me(&self) -> ClientResult<User> {
        let user: User = self.api.get("/auth/me").await?;
        self.api.session().set_user(&user).await?;
        Ok(user)
    }
}

/// Credential exchanges never carry a stale token and are never merged
fn credentials_options() -> RequestOptions {
    RequestOptions::new().skip_auth().skip_dedup()
}
