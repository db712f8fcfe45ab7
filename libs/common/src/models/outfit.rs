//! Outfit post model and its filter tags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One shared outfit, stored as a row of the `outfits` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitPost {
    pub id: Uuid,
    /// Username or display handle of the creator
    pub author: String,
    /// Image references, usually one or two public URLs
    pub photos: Vec<String>,
    pub items: Vec<FashionItem>,
    #[serde(default)]
    pub is_favorite: bool,
    pub season: Season,
    pub gender: Gender,
    pub age_group: AgeGroup,
    pub created_at: DateTime<Utc>,
}

impl OutfitPost {
    /// Create a post with a fresh id, stamped with the current time
    pub fn new(
        author: impl Into<String>,
        photos: Vec<String>,
        items: Vec<FashionItem>,
        season: Season,
        gender: Gender,
        age_group: AgeGroup,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            photos,
            items,
            is_favorite: false,
            season,
            gender,
            age_group,
            created_at: Utc::now(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// One clothing entry inside a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FashionItem {
    pub id: Uuid,
    pub name: String,
    /// Article number in the external product catalog
    pub external_article_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl FashionItem {
    pub fn new(
        name: impl Into<String>,
        external_article_id: u64,
        price: Option<f64>,
        brand: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            external_article_id,
            price,
            brand: brand.map(str::to_string),
        }
    }
}

/// Season tag; `All` is the "match everything" filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    All,
}

impl Season {
    pub const ALL_VALUES: [Season; 5] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
        Season::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::All => "All seasons",
        }
    }
}

/// Gender tag; `All` is the "match everything" filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unisex,
    All,
}

impl Gender {
    pub const ALL_VALUES: [Gender; 4] = [Gender::Male, Gender::Female, Gender::Unisex, Gender::All];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Men",
            Gender::Female => "Women",
            Gender::Unisex => "Unisex",
            Gender::All => "Everyone",
        }
    }
}

/// Age bracket tag; `All` is the "match everything" filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Teen,
    Young,
    Adult,
    Mature,
    Senior,
    All,
}

impl AgeGroup {
    pub const ALL_VALUES: [AgeGroup; 6] = [
        AgeGroup::Teen,
        AgeGroup::Young,
        AgeGroup::Adult,
        AgeGroup::Mature,
        AgeGroup::Senior,
        AgeGroup::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Teen => "13-17",
            AgeGroup::Young => "18-25",
            AgeGroup::Adult => "26-35",
            AgeGroup::Mature => "36-50",
            AgeGroup::Senior => "50+",
            AgeGroup::All => "All ages",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
