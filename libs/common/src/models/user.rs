//! User profile model and related functionality

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in account, stored as a row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "profile_image", default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub favorite_outfit_ids: Vec<Uuid>,
}

impl UserProfile {
    pub fn new(id: Uuid, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            profile_image_url: None,
            social_links: Vec::new(),
            favorite_outfit_ids: Vec::new(),
        }
    }

    pub fn is_favorite(&self, outfit_id: Uuid) -> bool {
        self.favorite_outfit_ids.contains(&outfit_id)
    }
}

/// Link to one of the user's social accounts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: Uuid,
    pub platform: SocialPlatform,
    pub url: String,
    pub username: String,
}

impl SocialLink {
    pub fn new(platform: SocialPlatform, url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform,
            url: url.into(),
            username: username.into(),
        }
    }
}

/// Supported social platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Instagram,
    TikTok,
    YouTube,
    Twitter,
    Telegram,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::TikTok => "TikTok",
            SocialPlatform::YouTube => "YouTube",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Telegram => "Telegram",
        }
    }
}
