//! Domain models shared by every Lumin crate

pub mod outfit;
pub mod user;

// Re-export for convenience
pub use outfit::{AgeGroup, FashionItem, Gender, OutfitPost, Season};
pub use user::{SocialLink, SocialPlatform, UserProfile};
