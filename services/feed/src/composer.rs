//! Outfit composer
//!
//! Turns a draft (photos, items and tags) into a published post: photos are
//! uploaded first, then the post is created through the feed store.

use common::{
    LuminError, LuminResult,
    identity::CurrentUser,
    models::{AgeGroup, FashionItem, Gender, OutfitPost, Season},
};
use media::MediaUploader;
use std::sync::Arc;
use tracing::{info, warn};

use crate::store::FeedStore;

/// Author used when nobody is signed in
pub const FALLBACK_AUTHOR: &str = "@user";

/// A post being composed
#[derive(Debug, Clone)]
pub struct OutfitDraft {
    /// Encoded JPEG photos, in display order
    pub photos: Vec<Vec<u8>>,
    pub items: Vec<FashionItem>,
    pub season: Season,
    pub gender: Gender,
    pub age_group: AgeGroup,
}

impl OutfitDraft {
    pub fn new(season: Season, gender: Gender, age_group: AgeGroup) -> Self {
        Self {
            photos: Vec::new(),
            items: Vec::new(),
            season,
            gender,
            age_group,
        }
    }

    pub fn photo(mut self, bytes: Vec<u8>) -> Self {
        self.photos.push(bytes);
        self
    }

    pub fn item(mut self, item: FashionItem) -> Self {
        self.items.push(item);
        self
    }

    /// Check everything that does not need the network
    pub fn validate(&self) -> LuminResult<()> {
        if self.items.is_empty() {
            return Err(LuminError::Validation(
                "Add at least one item to the outfit".to_string(),
            ));
        }
        if self.items.iter().any(|item| item.name.trim().is_empty()) {
            return Err(LuminError::Validation("Every item needs a name".to_string()));
        }
        if self.season == Season::All || self.gender == Gender::All || self.age_group == AgeGroup::All
        {
            return Err(LuminError::Validation(
                "Pick a season, gender and age group".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct OutfitComposer {
    store: Arc<FeedStore>,
    media: MediaUploader,
    user: Arc<dyn CurrentUser>,
}

impl OutfitComposer {
    pub fn new(store: Arc<FeedStore>, media: MediaUploader, user: Arc<dyn CurrentUser>) -> Self {
        Self { store, media, user }
    }

    /// Upload the draft's photos and publish it
    ///
    /// When the post cannot be created, its uploaded photos are removed again.
    pub async fn publish(&self, draft: OutfitDraft) -> LuminResult<OutfitPost> {
        draft.validate()?;

        let uploaded = self.media.upload_photos(draft.photos).await?;
        let photos: Vec<String> = uploaded.into_iter().map(|p| p.url).collect();

        let author = self
            .user
            .current_user()
            .map(|u| u.username)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

        let post = OutfitPost::new(
            author,
            photos,
            draft.items,
            draft.season,
            draft.gender,
            draft.age_group,
        );

        if let Err(e) = self.store.create(post.clone()).await {
            warn!("Publishing outfit {} failed, removing its photos", post.id);
            self.media.delete_photos(&post.photos).await;
            return Err(e);
        }

        info!("Published outfit {} by {}", post.id, post.author);
        Ok(post)
    }
}
