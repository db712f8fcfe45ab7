//! Identity service client

use api::error::ensure_success;
use async_trait::async_trait;
use common::{LuminResult, config::LuminConfig};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use crate::models::{
    AuthResponse, Credentials, RefreshRequest, SignUpRequest, SignUpResponse, UserMetadata,
};

/// Account operations of the identity service
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str, username: &str)
    -> LuminResult<SignUpResponse>;
    async fn sign_in(&self, email: &str, password: &str) -> LuminResult<AuthResponse>;
    async fn refresh(&self, refresh_token: &str) -> LuminResult<AuthResponse>;
    /// Revoke the session behind `access_token`
    async fn logout(&self, access_token: &str) -> LuminResult<()>;
}

/// Client for the GoTrue endpoints under `auth/v1`
#[derive(Clone)]
pub struct GoTrueClient {
    client: Client,
    auth_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(config: &LuminConfig) -> LuminResult<Self> {
        config.require_remote()?;

        let client = Client::builder().timeout(config.timeout()).build()?;
        info!("Identity client initialized for {}", config.auth_url());

        Ok(Self {
            client,
            auth_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn post(&self, path: &str, bearer: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl IdentityClient for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> LuminResult<SignUpResponse> {
        debug!("Signing up {}", email);

        let body = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: UserMetadata {
                username: Some(username.to_string()),
            },
        };
        let response = self.post("signup", &self.anon_key).json(&body).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> LuminResult<AuthResponse> {
        debug!("Signing in {}", email);

        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .post("token", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn refresh(&self, refresh_token: &str) -> LuminResult<AuthResponse> {
        debug!("Refreshing session");

        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self
            .post("token", &self.anon_key)
            .query(&[("grant_type", "refresh_token")])
            .json(&body)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn logout(&self, access_token: &str) -> LuminResult<()> {
        let response = self.post("logout", access_token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
