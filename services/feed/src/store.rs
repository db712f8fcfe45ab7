//! Feed store
//!
//! Holds the ordered outfit collection and publishes a [`FeedState`] snapshot
//! through a watch channel after every mutation. Loads are paginated and
//! guarded by the `is_loading` flag; favorite toggles are optimistic and
//! rolled back when either backend write fails.

use api::BackendGateway;
use chrono::{Duration as ChronoDuration, Utc};
use common::{
    LuminError, LuminResult,
    config::LuminConfig,
    identity::CurrentUser,
    models::{OutfitPost, UserProfile},
};
use media::MediaUploader;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::demo;
use crate::filter::OutfitFilter;
use crate::state::{FavoriteState, FeedState};

/// Paging and retention policy of the feed
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: u32,
    /// Local posts younger than this survive a refresh
    pub recency_window: ChronoDuration,
    /// Distance from the end of the collection that triggers the next page
    pub prefetch_distance: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&LuminConfig::default())
    }
}

impl From<&LuminConfig> for FeedSettings {
    fn from(config: &LuminConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            recency_window: config.recency_window(),
            prefetch_distance: config.prefetch_distance,
        }
    }
}

/// What a call to [`FeedStore::load`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Another load was in flight, or the last page was already reached
    Skipped,
    Loaded { fetched: usize },
    /// The fetch failed; the message is in `FeedState::last_error`
    Failed,
}

/// Clears `is_loading` when dropped, whichever way the load ends
struct LoadingGuard<'a>(&'a watch::Sender<FeedState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.is_loading = false);
    }
}

/// An optimistic favorite flip awaiting its backend writes
///
/// Dropped without being committed, it restores the previous flag.
struct PendingToggle<'a> {
    state: &'a watch::Sender<FeedState>,
    id: Uuid,
    previous: bool,
    settled: bool,
}

impl PendingToggle<'_> {
    fn commit(mut self) {
        self.settled = true;
        let id = self.id;
        self.state.send_modify(|s| {
            s.pending_favorites.remove(&id);
        });
    }

    fn rollback(mut self) {
        self.settled = true;
        self.restore();
    }

    fn restore(&self) {
        let (id, previous) = (self.id, self.previous);
        self.state.send_modify(|s| {
            s.pending_favorites.remove(&id);
            if let Some(post) = s.post_mut(id) {
                post.is_favorite = previous;
            }
        });
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Favorite toggle of {} abandoned, restoring", self.id);
            self.restore();
        }
    }
}

pub struct FeedStore {
    gateway: Arc<dyn BackendGateway>,
    media: MediaUploader,
    user: Arc<dyn CurrentUser>,
    settings: FeedSettings,
    state: watch::Sender<FeedState>,
    /// Serializes read-modify-write of the user's favorites list
    favorites_write: Mutex<()>,
}

impl FeedStore {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        media: MediaUploader,
        user: Arc<dyn CurrentUser>,
        settings: FeedSettings,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            gateway,
            media,
            user,
            settings,
            state,
            favorites_write: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    /// Receiver of every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn posts(&self) -> Vec<OutfitPost> {
        self.state.borrow().posts.clone()
    }

    pub fn favorites(&self) -> Vec<OutfitPost> {
        self.state.borrow().favorites()
    }

    pub fn filtered(&self, filter: &OutfitFilter) -> Vec<OutfitPost> {
        self.state.borrow().filtered(filter)
    }

    pub fn search_by_author(&self, query: &str) -> Vec<OutfitPost> {
        self.state.borrow().search_by_author(query)
    }

    pub fn posts_by_author(&self, username: &str) -> Vec<OutfitPost> {
        self.state.borrow().posts_by_author(username)
    }

    pub fn favorite_state(&self, id: Uuid) -> Option<FavoriteState> {
        self.state.borrow().favorite_state(id)
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    fn record_error(&self, err: &LuminError) {
        let message = err.user_message();
        self.state.send_modify(|s| s.last_error = Some(message));
    }

    /// Fetch a page and merge it into the collection
    ///
    /// Skipped while another load is in flight, and when the last page was
    /// reached unless `refresh` is set. A refresh starts over at the first
    /// page and keeps local posts created within the recency window; other
    /// loads append the next page. The refresh reset happens before the
    /// fetch, so it holds even when the fetch fails. Failures are recorded in
    /// `last_error`, and an empty feed falls back to the built-in outfits.
    pub async fn load(&self, refresh: bool) -> LoadOutcome {
        let cutoff = Utc::now() - self.settings.recency_window;
        let mut page = 0;
        let started = self.state.send_if_modified(|s| {
            if s.is_loading || (!refresh && !s.has_more) {
                return false;
            }
            if refresh {
                if s.is_demo {
                    s.posts.clear();
                    s.is_demo = false;
                } else {
                    s.posts.retain(|p| p.created_at > cutoff);
                }
                s.page = 0;
                s.has_more = true;
            }
            s.is_loading = true;
            s.last_error = None;
            page = s.page;
            true
        });
        if !started {
            debug!("Load skipped (refresh: {})", refresh);
            return LoadOutcome::Skipped;
        }
        let _loading = LoadingGuard(&self.state);

        let page_size = self.settings.page_size;
        debug!("Loading outfits page {} (refresh: {})", page, refresh);

        let fetched = match self.gateway.list_posts(page, page_size).await {
            Ok(posts) => self.with_user_favorites(posts),
            Err(e) => {
                self.fail_load(&e);
                return LoadOutcome::Failed;
            }
        };

        let count = fetched.len();
        let has_more = count == page_size as usize;

        self.state.send_modify(|s| {
            let mut seen: HashSet<Uuid> = s.posts.iter().map(|p| p.id).collect();
            if refresh {
                // Recent posts kept by the reset, plus any created during the fetch
                let retained = std::mem::take(&mut s.posts);
                let mut merged: Vec<OutfitPost> =
                    fetched.into_iter().filter(|p| seen.insert(p.id)).collect();
                merged.extend(retained);
                s.posts = merged;
                s.page = 1;
            } else {
                s.posts
                    .extend(fetched.into_iter().filter(|p| seen.insert(p.id)));
                s.page += 1;
            }

            // An in-flight toggle wins over the fetched flag
            for (&id, &target) in &s.pending_favorites {
                if let Some(post) = s.posts.iter_mut().find(|p| p.id == id) {
                    post.is_favorite = target;
                }
            }

            s.has_more = has_more;
            s.is_demo = false;
        });

        info!("Loaded {} outfits from page {}", count, page);
        LoadOutcome::Loaded { fetched: count }
    }

    fn fail_load(&self, err: &LuminError) {
        error!("Failed to load outfits: {}", err);
        let message = err.user_message();
        self.state.send_modify(|s| {
            s.last_error = Some(message);
            if s.posts.is_empty() {
                warn!("Feed is empty, showing built-in outfits");
                s.posts = demo::outfits();
                s.is_demo = true;
                s.has_more = false;
            }
        });
    }

    /// Derive `is_favorite` from the signed-in user's favorites
    fn with_user_favorites(&self, mut posts: Vec<OutfitPost>) -> Vec<OutfitPost> {
        if let Some(user) = self.user.current_user() {
            for post in &mut posts {
                post.is_favorite = user.is_favorite(post.id);
            }
        }
        posts
    }

    /// Load the next page when `visible_id` is near the end of the collection
    pub async fn load_more_if_needed(&self, visible_id: Uuid) -> LoadOutcome {
        let near_end = {
            let s = self.state.borrow();
            s.posts
                .iter()
                .position(|p| p.id == visible_id)
                .is_some_and(|index| index + self.settings.prefetch_distance >= s.posts.len())
        };
        if !near_end {
            return LoadOutcome::Skipped;
        }
        self.load(false).await
    }

    /// Publish a post and put it at the front of the collection
    ///
    /// Nothing changes locally unless the backend accepted the post. A post
    /// already present under the same id is replaced, and built-in outfits
    /// make way for real content.
    pub async fn create(&self, post: OutfitPost) -> LuminResult<()> {
        if let Err(e) = self.gateway.create_post(&post).await {
            error!("Failed to create outfit {}: {}", post.id, e);
            self.record_error(&e);
            return Err(e);
        }

        info!("Created outfit {}", post.id);
        self.state.send_modify(|s| {
            if s.is_demo {
                s.posts.clear();
                s.is_demo = false;
            }
            s.posts.retain(|p| p.id != post.id);
            s.posts.insert(0, post);
        });
        Ok(())
    }

    /// Flip the favorite flag of a post and return the new value
    ///
    /// The flag flips locally at once and the post stays `Pending` while the
    /// post flag and the user's favorites are written, in that order. If
    /// either write fails the flag is restored; a failed second write also
    /// undoes the first, best-effort. A toggle on a post that is already
    /// pending is rejected with `Conflict`.
    pub async fn toggle_favorite(&self, id: Uuid) -> LuminResult<bool> {
        let Some(user) = self.user.current_user() else {
            let err = LuminError::AuthenticationRequired;
            self.record_error(&err);
            return Err(err);
        };

        let mut begun = Err(LuminError::NotFound(format!("outfit {}", id)));
        self.state.send_if_modified(|s| {
            if s.pending_favorites.contains_key(&id) {
                begun = Err(LuminError::Conflict(format!(
                    "favorite toggle of {} in progress",
                    id
                )));
                return false;
            }
            let Some(post) = s.post_mut(id) else {
                return false;
            };
            let previous = post.is_favorite;
            post.is_favorite = !previous;
            s.pending_favorites.insert(id, !previous);
            begun = Ok(previous);
            true
        });

        let previous = match begun {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Favorite toggle rejected: {}", e);
                self.record_error(&e);
                return Err(e);
            }
        };
        let target = !previous;
        let toggle = PendingToggle {
            state: &self.state,
            id,
            previous,
            settled: false,
        };

        info!("Toggling favorite for outfit {}: {}", id, target);
        match self.write_favorite(&user, id, target).await {
            Ok(favorite_ids) => {
                toggle.commit();
                self.user.sync_favorites(&favorite_ids);
                Ok(target)
            }
            Err(e) => {
                toggle.rollback();
                error!("Failed to update favorite of {}: {}", id, e);
                self.record_error(&e);
                Err(e)
            }
        }
    }

    async fn write_favorite(
        &self,
        user: &UserProfile,
        id: Uuid,
        target: bool,
    ) -> LuminResult<Vec<Uuid>> {
        self.gateway.update_favorite_flag(id, target).await?;

        match self.write_user_favorites(user.id, id, target).await {
            Ok(ids) => Ok(ids),
            Err(e) => {
                if let Err(undo) = self.gateway.update_favorite_flag(id, !target).await {
                    warn!("Failed to restore favorite flag of {}: {}", id, undo);
                }
                Err(e)
            }
        }
    }

    async fn write_user_favorites(
        &self,
        user_id: Uuid,
        id: Uuid,
        target: bool,
    ) -> LuminResult<Vec<Uuid>> {
        let _guard = self.favorites_write.lock().await;
        let mut ids = self.gateway.get_user_favorites(user_id).await?;
        ids.retain(|f| *f != id);
        if target {
            ids.push(id);
        }
        self.gateway.set_user_favorites(user_id, &ids).await?;
        Ok(ids)
    }

    /// Delete a post and its photos
    ///
    /// Photo deletion is best-effort. The post leaves the collection only
    /// after the backend deleted its record.
    pub async fn delete(&self, post: &OutfitPost) -> LuminResult<()> {
        self.media.delete_photos(&post.photos).await;

        if let Err(e) = self.gateway.delete_post(post.id).await {
            error!("Failed to delete outfit {}: {}", post.id, e);
            self.record_error(&e);
            return Err(e);
        }

        info!("Deleted outfit {}", post.id);
        let id = post.id;
        self.state.send_modify(|s| {
            s.posts.retain(|p| p.id != id);
            s.pending_favorites.remove(&id);
        });
        Ok(())
    }
}
