//! Session persistence in the key-value store

use common::{LuminError, LuminResult, cache::KeyValueStore, models::UserProfile};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::SessionTokens;

pub const CURRENT_USER_KEY: &str = "lumin:current_user";
pub const ACCESS_TOKEN_KEY: &str = "lumin:access_token";
pub const REFRESH_TOKEN_KEY: &str = "lumin:refresh_token";

/// Persisted snapshot read at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSession {
    pub user: UserProfile,
    pub tokens: SessionTokens,
}

/// Session manager for the signed-in user's snapshot
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a fresh session
    pub async fn create_session(&self, user: &UserProfile, tokens: &SessionTokens) -> LuminResult<()> {
        info!("Creating session for user: {}", user.id);

        self.store
            .set(ACCESS_TOKEN_KEY, &tokens.access_token, None)
            .await?;
        match &tokens.refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh, None).await?,
            None => self.store.delete(REFRESH_TOKEN_KEY).await?,
        }
        self.update_user(user).await
    }

    /// Replace the persisted profile, keeping the tokens
    pub async fn update_user(&self, user: &UserProfile) -> LuminResult<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(CURRENT_USER_KEY, &json, None).await
    }

    /// Read the snapshot
    ///
    /// Both the profile and the access token must be present; a partial or
    /// unreadable snapshot reads as no session.
    pub async fn get_session(&self) -> LuminResult<Option<PersistedSession>> {
        let Some(user_json) = self.store.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };
        let Some(access_token) = self.store.get(ACCESS_TOKEN_KEY).await? else {
            return Ok(None);
        };

        let user: UserProfile = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                warn!("Discarding unreadable persisted user: {}", e);
                return Ok(None);
            }
        };
        let refresh_token = self.store.get(REFRESH_TOKEN_KEY).await?;

        Ok(Some(PersistedSession {
            user,
            tokens: SessionTokens {
                access_token,
                refresh_token,
            },
        }))
    }

    /// Remove every persisted key
    ///
    /// All deletes are attempted; the first failure is reported.
    pub async fn delete_session(&self) -> LuminResult<()> {
        info!("Deleting persisted session");

        let mut first_error: Option<LuminError> = None;
        for key in [CURRENT_USER_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.delete(key).await {
                warn!("Failed to delete {}: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
