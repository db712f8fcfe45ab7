//! Request and response payloads of the REST backend

use common::models::{SocialLink, UserProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `PATCH outfits?id=eq.<id>`
#[derive(Debug, Serialize)]
pub struct FavoriteFlagPatch {
    pub is_favorite: bool,
}

/// Row projection of `users?select=favorite_outfit_ids`
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesRow {
    #[serde(default)]
    pub favorite_outfit_ids: Vec<Uuid>,
}

/// Editable columns of a user row
#[derive(Debug, Serialize)]
pub struct UserPatch<'a> {
    pub username: &'a str,
    pub profile_image: Option<&'a str>,
    pub social_links: &'a [SocialLink],
}

impl<'a> From<&'a UserProfile> for UserPatch<'a> {
    fn from(user: &'a UserProfile) -> Self {
        Self {
            username: &user.username,
            profile_image: user.profile_image_url.as_deref(),
            social_links: &user.social_links,
        }
    }
}

/// Response of `POST storage/v1/object/upload/sign/<bucket>/<name>`
#[derive(Debug, Deserialize)]
pub struct SignedUploadResponse {
    /// Path relative to the storage root, including the upload token
    pub url: String,
}

/// Error body shapes returned by the backend services
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// Most specific message present
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}
