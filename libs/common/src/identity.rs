//! Seam between the feed and whoever knows the signed-in user

use uuid::Uuid;

use crate::models::UserProfile;

/// Read access to the signed-in user
pub trait CurrentUser: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<UserProfile>;

    /// Called after the backend accepted a new favorites set for the user
    fn sync_favorites(&self, _favorite_outfit_ids: &[Uuid]) {}
}

/// Nobody is signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CurrentUser for Anonymous {
    fn current_user(&self) -> Option<UserProfile> {
        None
    }
}

/// A fixed user, for headless tools and tests
#[derive(Debug, Clone)]
pub struct FixedUser(pub UserProfile);

impl CurrentUser for FixedUser {
    fn current_user(&self) -> Option<UserProfile> {
        Some(self.0.clone())
    }
}
