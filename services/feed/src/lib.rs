//! Outfit feed for the Lumin client
//!
//! [`FeedStore`] owns the paginated outfit collection and its favorite
//! toggles, [`OutfitComposer`] publishes new posts into it, and [`filter`]
//! derives the filtered and per-author views.

pub mod composer;
pub mod demo;
pub mod filter;
pub mod state;
pub mod store;

pub use composer::{OutfitComposer, OutfitDraft};
pub use filter::OutfitFilter;
pub use state::{FavoriteState, FeedState};
pub use store::{FeedSettings, FeedStore, LoadOutcome};
