//! Backend gateway over the Supabase REST and storage APIs

use async_trait::async_trait;
use common::{
    LuminError, LuminResult,
    config::LuminConfig,
    models::{OutfitPost, UserProfile},
};
use reqwest::{Client, Method, RequestBuilder, header::CONTENT_TYPE};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::ensure_success,
    gateway::BackendGateway,
    models::{FavoriteFlagPatch, FavoritesRow, SignedUploadResponse, UserPatch},
    token::BearerToken,
};

const OUTFITS: &str = "outfits";
const USERS: &str = "users";

/// Gateway talking to PostgREST (`/rest/v1`) and storage (`/storage/v1`)
#[derive(Clone)]
pub struct SupabaseGateway {
    client: Client,
    rest_url: String,
    storage_url: String,
    bucket: String,
    anon_key: String,
    token: BearerToken,
}

impl SupabaseGateway {
    /// Create a gateway for the configured project
    ///
    /// Requests carry the user's access token from `token` when one is set and
    /// fall back to the anonymous key otherwise.
    pub fn new(config: &LuminConfig, token: BearerToken) -> LuminResult<Self> {
        config.require_remote()?;

        let client = Client::builder().timeout(config.timeout()).build()?;
        info!("REST gateway initialized for {}", config.base_url());

        Ok(Self {
            client,
            rest_url: config.rest_url(),
            storage_url: config.storage_url(),
            bucket: config.storage_bucket.clone(),
            anon_key: config.anon_key.clone(),
            token,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self.token.get().unwrap_or_else(|| self.anon_key.clone());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, format!("{}/{}", self.rest_url, table))
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/object/{}/{}", self.storage_url, self.bucket, name)
    }

    /// Public URL of a stored photo
    pub fn public_url(&self, name: &str) -> String {
        format!("{}{}", self.public_image_prefix(), name)
    }

    async fn upload_direct(&self, bytes: Vec<u8>, name: &str) -> LuminResult<()> {
        let response = self
            .request(Method::POST, self.object_url(name))
            .header(CONTENT_TYPE, "image/jpeg")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload_signed(&self, bytes: Vec<u8>, name: &str) -> LuminResult<()> {
        let sign_url = format!(
            "{}/object/upload/sign/{}/{}",
            self.storage_url, self.bucket, name
        );
        let response = self
            .request(Method::POST, sign_url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let signed: SignedUploadResponse = ensure_success(response).await?.json().await?;

        let response = self
            .client
            .put(format!("{}{}", self.storage_url, signed.url))
            .header(CONTENT_TYPE, "image/jpeg")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

fn eq(id: Uuid) -> String {
    format!("eq.{}", id)
}

#[async_trait]
impl BackendGateway for SupabaseGateway {
    async fn list_posts(&self, page: u32, page_size: u32) -> LuminResult<Vec<OutfitPost>> {
        let offset = u64::from(page) * u64::from(page_size);
        debug!("Fetching outfits page {} (limit {}, offset {})", page, page_size, offset);

        let response = self
            .table(Method::GET, OUTFITS)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .query(&[("limit", u64::from(page_size)), ("offset", offset)])
            .send()
            .await?;

        let posts: Vec<OutfitPost> = ensure_success(response).await?.json().await?;
        Ok(posts)
    }

    async fn create_post(&self, post: &OutfitPost) -> LuminResult<()> {
        info!("Creating outfit {}", post.id);

        let response = self
            .table(Method::POST, OUTFITS)
            .header("Prefer", "return=minimal")
            .json(post)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> LuminResult<()> {
        info!("Deleting outfit {}", id);

        let response = self
            .table(Method::DELETE, OUTFITS)
            .query(&[("id", eq(id))])
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_favorite_flag(&self, id: Uuid, is_favorite: bool) -> LuminResult<()> {
        let response = self
            .table(Method::PATCH, OUTFITS)
            .query(&[("id", eq(id))])
            .header("Prefer", "return=minimal")
            .json(&FavoriteFlagPatch { is_favorite })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn get_user_favorites(&self, user_id: Uuid) -> LuminResult<Vec<Uuid>> {
        let response = self
            .table(Method::GET, USERS)
            .query(&[("id", eq(user_id))])
            .query(&[("select", "favorite_outfit_ids")])
            .send()
            .await?;

        let rows: Vec<FavoritesRow> = ensure_success(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(|row| row.favorite_outfit_ids)
            .ok_or_else(|| LuminError::NotFound(format!("user {}", user_id)))
    }

    async fn set_user_favorites(&self, user_id: Uuid, outfit_ids: &[Uuid]) -> LuminResult<()> {
        let response = self
            .table(Method::PATCH, USERS)
            .query(&[("id", eq(user_id))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "favorite_outfit_ids": outfit_ids }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload_image(&self, bytes: Vec<u8>, name: &str) -> LuminResult<String> {
        info!("Uploading {} ({} bytes)", name, bytes.len());

        if let Err(direct) = self.upload_direct(bytes.clone(), name).await {
            warn!("Direct upload of {} failed: {}", name, direct);
            self.upload_signed(bytes, name).await.map_err(|signed| {
                LuminError::UploadFailed(format!("{}: {}", name, signed))
            })?;
        }

        Ok(self.public_url(name))
    }

    async fn delete_image(&self, name: &str) -> LuminResult<()> {
        let response = self
            .request(Method::DELETE, self.object_url(name))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn public_image_prefix(&self) -> String {
        format!("{}/object/public/{}/", self.storage_url, self.bucket)
    }

    async fn get_user(&self, id: Uuid) -> LuminResult<Option<UserProfile>> {
        let response = self
            .table(Method::GET, USERS)
            .query(&[("id", eq(id))])
            .query(&[("select", "*")])
            .send()
            .await?;

        let users: Vec<UserProfile> = ensure_success(response).await?.json().await?;
        Ok(users.into_iter().next())
    }

    async fn create_user(&self, user: &UserProfile) -> LuminResult<()> {
        info!("Creating user row for {}", user.id);

        let response = self
            .table(Method::POST, USERS)
            .header("Prefer", "return=minimal")
            .json(user)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_user(&self, user: &UserProfile) -> LuminResult<()> {
        let response = self
            .table(Method::PATCH, USERS)
            .query(&[("id", eq(user.id))])
            .header("Prefer", "return=minimal")
            .json(&UserPatch::from(user))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
