//! Authentication payloads and session state

use common::models::UserProfile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-in credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST auth/v1/signup`
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: UserMetadata,
}

/// Body of `POST auth/v1/token?grant_type=refresh_token`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Session issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Account record of the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    /// Profile row for an account that has none yet
    ///
    /// The username comes from sign-up metadata, else the local part of the
    /// e-mail address.
    pub fn to_profile(&self) -> UserProfile {
        let email = self.email.clone().unwrap_or_default();
        let username = self
            .user_metadata
            .username
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        UserProfile::new(self.id, username, email)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub username: Option<String>,
}

/// Sign-up answer: a session, or a bare user when e-mail confirmation is on
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(AuthResponse),
    Pending(AuthUser),
}

/// Result of a successful sign-up call
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(UserProfile),
    /// The account exists but must be confirmed by e-mail before sign-in
    ConfirmationRequired { email: String },
}

/// Tokens persisted between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl From<&AuthResponse> for SessionTokens {
    fn from(response: &AuthResponse) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: Some(response.refresh_token.clone()),
        }
    }
}

/// Observable authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub current_user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            current_user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_up_response_shapes() {
        let id = Uuid::new_v4();
        let session = json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": id, "email": "nesty@example.com", "user_metadata": { "username": "nesty__" } }
        });
        match serde_json::from_value::<SignUpResponse>(session).unwrap() {
            SignUpResponse::Session(auth) => {
                assert_eq!(auth.user.id, id);
                assert_eq!(auth.expires_in, Some(3600));
            }
            other => panic!("unexpected shape: {other:?}"),
        }

        let pending = json!({ "id": id, "email": "nesty@example.com", "confirmation_sent_at": "2025-06-29T10:00:00Z" });
        assert!(matches!(
            serde_json::from_value::<SignUpResponse>(pending).unwrap(),
            SignUpResponse::Pending(user) if user.id == id
        ));
    }

    #[test]
    fn test_profile_from_auth_user() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some("zelda@example.com".to_string()),
            user_metadata: UserMetadata::default(),
        };
        let profile = user.to_profile();
        assert_eq!(profile.username, "zelda");
        assert_eq!(profile.email, "zelda@example.com");
        assert!(profile.favorite_outfit_ids.is_empty());

        let named = AuthUser {
            user_metadata: UserMetadata {
                username: Some("@zelda".to_string()),
            },
            ..user
        };
        assert_eq!(named.to_profile().username, "@zelda");
    }
}
