//! Observable feed state

use common::models::OutfitPost;
use std::collections::HashMap;
use uuid::Uuid;

use crate::filter::{self, OutfitFilter};

/// Favorite flag of one post, including an in-flight toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    NotFavorited,
    Favorited,
    /// Flipped locally, backend writes not settled; `target` is the new value
    Pending { target: bool },
}

/// Snapshot published after every feed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// Posts in display order, unique by id
    pub posts: Vec<OutfitPost>,
    pub is_loading: bool,
    /// Whether the last fetched page was full
    pub has_more: bool,
    /// Next page to fetch, zero-based
    pub page: u32,
    /// User-facing message of the last failed operation
    pub last_error: Option<String>,
    /// The built-in dataset is shown because nothing could be fetched
    pub is_demo: bool,
    /// Posts with a favorite toggle in flight, with the target value
    pub pending_favorites: HashMap<Uuid, bool>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            is_loading: false,
            has_more: true,
            page: 0,
            last_error: None,
            is_demo: false,
            pending_favorites: HashMap::new(),
        }
    }
}

impl FeedState {
    pub fn post(&self, id: Uuid) -> Option<&OutfitPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub(crate) fn post_mut(&mut self, id: Uuid) -> Option<&mut OutfitPost> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    pub fn favorite_state(&self, id: Uuid) -> Option<FavoriteState> {
        let post = self.post(id)?;
        Some(match self.pending_favorites.get(&id) {
            Some(&target) => FavoriteState::Pending { target },
            None if post.is_favorite => FavoriteState::Favorited,
            None => FavoriteState::NotFavorited,
        })
    }

    pub fn favorites(&self) -> Vec<OutfitPost> {
        self.posts.iter().filter(|p| p.is_favorite).cloned().collect()
    }

    pub fn filtered(&self, filter: &OutfitFilter) -> Vec<OutfitPost> {
        filter.apply(&self.posts)
    }

    pub fn search_by_author(&self, query: &str) -> Vec<OutfitPost> {
        filter::search_by_author(&self.posts, query)
    }

    pub fn posts_by_author(&self, username: &str) -> Vec<OutfitPost> {
        filter::posts_by_author(&self.posts, username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_favorite_state_reflects_pending() {
        let mut state = FeedState {
            posts: demo::outfits(),
            ..FeedState::default()
        };
        let id = state.posts[0].id;

        assert_eq!(state.favorite_state(id), Some(FavoriteState::NotFavorited));

        state.pending_favorites.insert(id, true);
        if let Some(post) = state.post_mut(id) {
            post.is_favorite = true;
        }
        assert_eq!(
            state.favorite_state(id),
            Some(FavoriteState::Pending { target: true })
        );
        assert_eq!(state.favorites().len(), 1);

        state.pending_favorites.remove(&id);
        assert_eq!(state.favorite_state(id), Some(FavoriteState::Favorited));
        assert_eq!(state.favorite_state(Uuid::new_v4()), None);
    }
}
