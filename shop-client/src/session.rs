//! Session store
//!
//! Bearer token, refresh token and the signed-in user, persisted through a
//! [`Storage`] backend. Every token read/write in the crate goes through
//! [`SessionStore`]; session changes are broadcast as [`SessionEvent`]s.

use std::sync::Arc;

use shared::models::{AuthResponse, AuthTokens, User};
use tokio::sync::broadcast;

use crate::error::ClientResult;
use crate::storage::{Storage, load_json, save_json};

pub const TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

const EVENT_CAPACITY: usize = 64;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// Explicit sign out
    UserRequested,
    /// Token refresh failed
    SessionExpired,
}

/// Session lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: String },
    TokenRefreshed,
    LoggedOut { reason: LogoutReason },
}

/// Persisted auth session
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Current bearer token
    pub async fn token(&self) -> ClientResult<Option<String>> {
        self.storage.get(TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> ClientResult<Option<String>> {
        self.storage.get(REFRESH_TOKEN_KEY).await
    }

    pub async fn user(&self) -> ClientResult<Option<User>> {
        load_json(self.storage.as_ref(), USER_KEY).await
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.token().await, Ok(Some(_)))
    }

    /// Persist a fresh login/register result
    pub async fn start(&self, auth: &AuthResponse) -> ClientResult<()> {
        self.storage.set(TOKEN_KEY, &auth.token).await?;
        self.storage
            .set(REFRESH_TOKEN_KEY, &auth.refresh_token)
            .await?;
        save_json(self.storage.as_ref(), USER_KEY, &auth.user).await?;
        tracing::info!(user_id = %auth.user.id, "Session started");
        self.emit(SessionEvent::LoggedIn {
            user_id: auth.user.id.clone(),
        });
        Ok(())
    }

    /// Store a refreshed token pair (refresh token kept when not rotated)
    pub async fn update_tokens(&self, tokens: &AuthTokens) -> ClientResult<()> {
        self.storage.set(TOKEN_KEY, &tokens.token).await?;
        if let Some(refresh) = &tokens.refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh).await?;
        }
        tracing::debug!("Session tokens refreshed");
        self.emit(SessionEvent::TokenRefreshed);
        Ok(())
    }

    pub async fn set_user(&self, user: &User) -> ClientResult<()> {
        save_json(self.storage.as_ref(), USER_KEY, user).await
    }

    /// Remove tokens and user.
    ///
    /// Returns `true` when a session existed; `LoggedOut` is only broadcast
    /// in that case.
    pub async fn clear(&self, reason: LogoutReason) -> ClientResult<bool> {
        let had_session =
            self.token().await?.is_some() || self.refresh_token().await?.is_some();

        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await?;
        self.storage.remove(USER_KEY).await?;

        if had_session {
            tracing::info!(?reason, "Session cleared");
            self.emit(SessionEvent::LoggedOut { reason });
        }
        Ok(had_session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use shared::models::Role;

    fn auth_response() -> AuthResponse {
        AuthResponse {
            token: "access-1".into(),
            refresh_token: "refresh-1".into(),
            user: User {
                id: "u-1".into(),
                name: "Mai".into(),
                email: "mai@example.com".into(),
                role: Role::Customer,
                phone: None,
            },
        }
    }

    #[tokio::test]
    async fn test_start_persists_and_notifies() {
        let session = SessionStore::new(Arc::new(MemoryStorage::new()));
        let mut events = session.subscribe();

        session.start(&auth_response()).await.unwrap();

        assert_eq!(session.token().await.unwrap().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
        assert_eq!(session.user().await.unwrap().unwrap().id, "u-1");
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn { user_id: "u-1".into() }
        );
    }

    #[tokio::test]
    async fn test_update_tokens_keeps_unrotated_refresh_token() {
        let session = SessionStore::new(Arc::new(MemoryStorage::new()));
        session.start(&auth_response()).await.unwrap();

        session
            .update_tokens(&AuthTokens { token: "access-2".into(), refresh_token: None })
            .await
            .unwrap();

        assert_eq!(session.token().await.unwrap().as_deref(), Some("access-2"));
        assert_eq!(session.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_clear_only_notifies_when_session_existed() {
        let session = SessionStore::new(Arc::new(MemoryStorage::new()));
        let mut events = session.subscribe();

        assert!(!session.clear(LogoutReason::SessionExpired).await.unwrap());
        assert!(events.try_recv().is_err());

        session.start(&auth_response()).await.unwrap();
        let _ = events.recv().await;
        assert!(session.clear(LogoutReason::UserRequested).await.unwrap());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedOut { reason: LogoutReason::UserRequested }
        );
        assert!(!session.is_authenticated().await);
        assert!(session.user().await.unwrap().is_none());
    }
}
