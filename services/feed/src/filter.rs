//! Feed filters and author search

use common::models::{AgeGroup, Gender, OutfitPost, Season};
use serde::{Deserialize, Serialize};

/// Season, gender and age-group filter; an `All` value matches everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitFilter {
    pub season: Season,
    pub gender: Gender,
    pub age_group: AgeGroup,
}

impl Default for OutfitFilter {
    fn default() -> Self {
        Self {
            season: Season::All,
            gender: Gender::All,
            age_group: AgeGroup::All,
        }
    }
}

impl OutfitFilter {
    pub fn season(mut self, season: Season) -> Self {
        self.season = season;
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = age_group;
        self
    }

    /// Whether any of the three filters narrows the feed
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    pub fn matches(&self, post: &OutfitPost) -> bool {
        (self.season == Season::All || post.season == self.season)
            && (self.gender == Gender::All || post.gender == self.gender)
            && (self.age_group == AgeGroup::All || post.age_group == self.age_group)
    }

    /// Matching posts, in collection order
    pub fn apply(&self, posts: &[OutfitPost]) -> Vec<OutfitPost> {
        posts.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

/// Posts whose author contains `query`, ignoring case and a leading `@`
///
/// An empty query returns every post.
pub fn search_by_author(posts: &[OutfitPost], query: &str) -> Vec<OutfitPost> {
    let needle = normalize_handle(query);
    if needle.is_empty() {
        return posts.to_vec();
    }
    posts
        .iter()
        .filter(|p| normalize_handle(&p.author).contains(&needle))
        .cloned()
        .collect()
}

/// Posts published by `username`, ignoring case and a leading `@`
pub fn posts_by_author(posts: &[OutfitPost], username: &str) -> Vec<OutfitPost> {
    let wanted = normalize_handle(username);
    posts
        .iter()
        .filter(|p| normalize_handle(&p.author) == wanted)
        .cloned()
        .collect()
}
