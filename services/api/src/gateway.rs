//! Backend gateway contract
//!
//! Everything the client needs from the backend-as-a-service goes through
//! [`BackendGateway`]. The remote implementation lives in [`crate::rest`];
//! an in-memory one is available behind the `test-util` feature.

use async_trait::async_trait;
use common::{
    LuminResult,
    models::{OutfitPost, UserProfile},
};
use uuid::Uuid;

#[async_trait]
pub trait BackendGateway: Send + Sync {
    // Outfit posts

    /// One page of posts, newest first. `page` is zero-based.
    async fn list_posts(&self, page: u32, page_size: u32) -> LuminResult<Vec<OutfitPost>>;
    async fn create_post(&self, post: &OutfitPost) -> LuminResult<()>;
    async fn delete_post(&self, id: Uuid) -> LuminResult<()>;
    async fn update_favorite_flag(&self, id: Uuid, is_favorite: bool) -> LuminResult<()>;

    // Per-user favorites

    async fn get_user_favorites(&self, user_id: Uuid) -> LuminResult<Vec<Uuid>>;
    async fn set_user_favorites(&self, user_id: Uuid, outfit_ids: &[Uuid]) -> LuminResult<()>;

    // Photo storage

    /// Store a JPEG under `name` and return its public URL
    async fn upload_image(&self, bytes: Vec<u8>, name: &str) -> LuminResult<String>;
    async fn delete_image(&self, name: &str) -> LuminResult<()>;
    /// Public URL prefix of stored photos; object name follows it
    fn public_image_prefix(&self) -> String;

    // User profiles

    async fn get_user(&self, id: Uuid) -> LuminResult<Option<UserProfile>>;
    async fn create_user(&self, user: &UserProfile) -> LuminResult<()>;
    /// Write the editable profile fields (username, photo, social links)
    async fn update_user(&self, user: &UserProfile) -> LuminResult<()>;
}
