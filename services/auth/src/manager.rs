//! Signed-in user lifecycle
//!
//! [`AuthManager`] owns the observable [`AuthState`]. It signs users up, in and
//! out through the identity service, keeps the profile row in the `users`
//! table current, persists the session snapshot, and shares the access token
//! with the backend gateway through [`BearerToken`].

use api::{BackendGateway, BearerToken};
use common::{
    LuminError, LuminResult,
    cache::KeyValueStore,
    identity::CurrentUser,
    models::{SocialLink, UserProfile},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    client::IdentityClient,
    jwt,
    models::{AuthResponse, AuthState, SessionTokens, SignUpOutcome, SignUpResponse},
    session::SessionManager,
    validation::{validate_email, validate_password, validate_social_url, validate_username},
};

fn invalid(message: String) -> LuminError {
    LuminError::Validation(message)
}

/// Keeps `is_loading` set while alive
struct Loading<'a>(&'a watch::Sender<AuthState>);

impl<'a> Loading<'a> {
    fn start(state: &'a watch::Sender<AuthState>) -> Self {
        state.send_modify(|s| s.is_loading = true);
        Self(state)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.is_loading = false);
    }
}

#[derive(Clone)]
pub struct AuthManager {
    client: Arc<dyn IdentityClient>,
    gateway: Arc<dyn BackendGateway>,
    sessions: SessionManager,
    token: BearerToken,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthManager {
    /// `token` must be the handle the gateway reads its bearer from
    pub fn new(
        client: Arc<dyn IdentityClient>,
        gateway: Arc<dyn BackendGateway>,
        store: Arc<dyn KeyValueStore>,
        token: BearerToken,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            client,
            gateway,
            sessions: SessionManager::new(store),
            token,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Restore the persisted session at startup
    ///
    /// An expired access token is refreshed first; if that is impossible the
    /// snapshot is discarded. Returns whether a user is signed in afterwards.
    pub async fn restore(&self) -> LuminResult<bool> {
        let Some(session) = self.sessions.get_session().await? else {
            info!("No persisted session");
            return Ok(false);
        };

        let mut user = session.user;
        let mut tokens = session.tokens;

        if jwt::is_expired(&tokens.access_token) {
            let Some(refresh_token) = tokens.refresh_token.clone() else {
                warn!("Persisted session expired without a refresh token");
                self.discard_session().await?;
                return Ok(false);
            };

            match self.client.refresh(&refresh_token).await {
                Ok(auth) => {
                    info!("Refreshed session for user: {}", auth.user.id);
                    tokens = SessionTokens::from(&auth);
                }
                Err(e) => {
                    warn!("Session refresh failed: {}", e);
                    self.discard_session().await?;
                    return Ok(false);
                }
            }
        }

        self.token.set(tokens.access_token.clone());

        // The persisted profile may be stale (favorites changed elsewhere)
        match self.gateway.get_user(user.id).await {
            Ok(Some(fresh)) => user = fresh,
            Ok(None) => warn!("No profile row for restored user {}", user.id),
            Err(e) => warn!("Using persisted profile for {}: {}", user.id, e),
        }

        self.sessions.create_session(&user, &tokens).await?;
        info!("Restored session for {}", user.username);
        self.state.send_replace(AuthState::signed_in(user));
        Ok(true)
    }

    /// Create an account and, when the service returns a session, sign in
    pub async fn sign_up(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> LuminResult<SignUpOutcome> {
        let email = email.trim();
        let username = username.trim();
        validate_email(email).map_err(invalid)?;
        validate_username(username).map_err(invalid)?;
        validate_password(password).map_err(invalid)?;

        let _loading = Loading::start(&self.state);

        match self.client.sign_up(email, password, username).await? {
            SignUpResponse::Session(auth) => {
                self.token.set(auth.access_token.clone());
                let profile = UserProfile::new(auth.user.id, username, email);
                if let Err(e) = self.gateway.create_user(&profile).await {
                    self.token.clear();
                    return Err(e);
                }
                self.establish(profile.clone(), &auth).await?;
                Ok(SignUpOutcome::SignedIn(profile))
            }
            SignUpResponse::Pending(user) => {
                info!("Sign-up of {} awaits e-mail confirmation", user.id);
                Ok(SignUpOutcome::ConfirmationRequired {
                    email: email.to_string(),
                })
            }
        }
    }

    /// Sign in with e-mail and password, loading or creating the profile row
    pub async fn sign_in(&self, email: &str, password: &str) -> LuminResult<UserProfile> {
        let email = email.trim();
        validate_email(email).map_err(invalid)?;
        if password.is_empty() {
            return Err(invalid("Password is required".to_string()));
        }

        let _loading = Loading::start(&self.state);

        let auth = self.client.sign_in(email, password).await?;
        self.token.set(auth.access_token.clone());

        let profile = match self.load_or_create_profile(&auth).await {
            Ok(profile) => profile,
            Err(e) => {
                self.token.clear();
                return Err(e);
            }
        };

        self.establish(profile.clone(), &auth).await?;
        Ok(profile)
    }

    async fn load_or_create_profile(&self, auth: &AuthResponse) -> LuminResult<UserProfile> {
        if let Some(profile) = self.gateway.get_user(auth.user.id).await? {
            return Ok(profile);
        }

        info!("Creating missing profile row for {}", auth.user.id);
        let profile = auth.user.to_profile();
        self.gateway.create_user(&profile).await?;
        Ok(profile)
    }

    async fn establish(&self, user: UserProfile, auth: &AuthResponse) -> LuminResult<()> {
        if let Err(e) = self
            .sessions
            .create_session(&user, &SessionTokens::from(auth))
            .await
        {
            self.token.clear();
            return Err(e);
        }

        info!("Signed in as {}", user.username);
        self.state.send_modify(|s| {
            s.current_user = Some(user);
            s.is_authenticated = true;
        });
        Ok(())
    }

    /// Sign out locally; remote revocation is best-effort
    pub async fn sign_out(&self) -> LuminResult<()> {
        if let Some(access_token) = self.token.get() {
            if let Err(e) = self.client.logout(&access_token).await {
                warn!("Remote logout failed: {}", e);
            }
        }
        self.discard_session().await?;
        info!("Signed out");
        Ok(())
    }

    async fn discard_session(&self) -> LuminResult<()> {
        self.token.clear();
        self.state.send_modify(|s| {
            s.current_user = None;
            s.is_authenticated = false;
        });
        self.sessions.delete_session().await
    }

    fn require_user(&self) -> LuminResult<UserProfile> {
        self.state
            .borrow()
            .current_user
            .clone()
            .ok_or(LuminError::AuthenticationRequired)
    }

    /// Write the profile remotely, then locally
    async fn save_profile(&self, profile: UserProfile) -> LuminResult<UserProfile> {
        self.gateway.update_user(&profile).await?;
        self.sessions.update_user(&profile).await?;
        self.state
            .send_modify(|s| s.current_user = Some(profile.clone()));
        Ok(profile)
    }

    pub async fn update_username(&self, username: &str) -> LuminResult<UserProfile> {
        let username = username.trim();
        validate_username(username).map_err(invalid)?;

        let mut profile = self.require_user()?;
        profile.username = username.to_string();
        self.save_profile(profile).await
    }

    pub async fn add_social_link(&self, link: SocialLink) -> LuminResult<UserProfile> {
        validate_social_url(&link.url).map_err(invalid)?;

        let mut profile = self.require_user()?;
        profile.social_links.push(link);
        self.save_profile(profile).await
    }

    pub async fn remove_social_link(&self, link_id: Uuid) -> LuminResult<UserProfile> {
        let mut profile = self.require_user()?;
        let index = profile
            .social_links
            .iter()
            .position(|l| l.id == link_id)
            .ok_or_else(|| LuminError::NotFound(format!("social link {}", link_id)))?;
        profile.social_links.remove(index);
        self.save_profile(profile).await
    }
}

impl CurrentUser for AuthManager {
    fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().current_user.clone()
    }

    fn sync_favorites(&self, favorite_outfit_ids: &[Uuid]) {
        let mut updated = None;
        self.state.send_if_modified(|s| match s.current_user.as_mut() {
            Some(user) if user.favorite_outfit_ids != favorite_outfit_ids => {
                user.favorite_outfit_ids = favorite_outfit_ids.to_vec();
                updated = Some(user.clone());
                true
            }
            _ => false,
        });

        let Some(user) = updated else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let sessions = self.sessions.clone();
            handle.spawn(async move {
                if let Err(e) = sessions.update_user(&user).await {
                    warn!("Failed to persist favorites of {}: {}", user.id, e);
                }
            });
        }
    }
}
