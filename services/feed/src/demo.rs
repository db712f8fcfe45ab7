//! Built-in outfits shown when the feed cannot be fetched
//!
//! Photos are bundled asset names rather than storage URLs. Posts are dated a
//! day apart, starting a day ago, so a later refresh never retains them.

use chrono::{Duration, Utc};
use common::models::{AgeGroup, FashionItem, Gender, OutfitPost, Season};

const ART_A: u64 = 8234339;
const ART_B: u64 = 2234532;
const ART_C: u64 = 7334531;

type Item = (&'static str, u64, f64, &'static str);

fn post(
    author: &str,
    photos: &[&str],
    items: &[Item],
    season: Season,
    gender: Gender,
    age_group: AgeGroup,
) -> OutfitPost {
    OutfitPost::new(
        author,
        photos.iter().map(|p| p.to_string()).collect(),
        items
            .iter()
            .map(|&(name, article, price, brand)| {
                FashionItem::new(name, article, Some(price), Some(brand))
            })
            .collect(),
        season,
        gender,
        age_group,
    )
}

/// The demo dataset, newest first
pub fn outfits() -> Vec<OutfitPost> {
    let mut posts = vec![
        post(
            "@awentodor_Italy",
            &["Summer_outfit_1", "Summer_outfit_2"],
            &[
                ("Blazer", ART_A, 9499.0, "Levi's"),
                ("Shirt", ART_B, 2599.0, "Nike"),
                ("Tie", ART_B, 899.0, "Nike"),
                ("Trousers", ART_A, 6599.0, "Levi's"),
                ("Belt", ART_A, 1399.0, "Levi's"),
                ("Bag", ART_A, 11599.0, "Levi's"),
                ("Shoes", ART_C, 5999.0, "Adidas"),
            ],
            Season::Spring,
            Gender::Female,
            AgeGroup::Adult,
        ),
        post(
            "@nesty__",
            &["sw_1"],
            &[
                ("Jacket", ART_B, 7499.0, "Zara"),
                ("Shirt", ART_A, 2599.0, "H&M"),
                ("Skirt", ART_C, 1899.0, "Massimo Dutti"),
                ("Bag", ART_A, 5299.0, "Levi's"),
                ("Sunglasses", ART_A, 2399.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Female,
            AgeGroup::Young,
        ),
        post(
            "@andrew",
            &["male_car"],
            &[
                ("Sunglasses", ART_A, 1599.0, "Levi's"),
                ("Shirt", ART_B, 2999.0, "Uniqlo"),
                ("Trousers", ART_A, 6599.0, "COS"),
                ("Belt", ART_A, 1599.0, "Levi's"),
                ("Loafers", ART_C, 5999.0, "Clarks"),
                ("Watch", ART_A, 6599.0, "Levi's"),
                ("Bag", ART_A, 7899.0, "Levi's"),
            ],
            Season::Summer,
            Gender::Male,
            AgeGroup::Adult,
        ),
        post(
            "@sofaa",
            &["sea_female"],
            &[
                ("Sweater", ART_B, 12999.0, "The North Face"),
                ("Jeans", ART_A, 15799.0, "Levi's"),
                ("Sandals", ART_C, 7999.0, "Dr. Martens"),
            ],
            Season::Spring,
            Gender::Female,
            AgeGroup::Young,
        ),
        post(
            "@nikita_kuznetsov",
            &["cantry_man"],
            &[
                ("Hat", ART_B, 2999.0, "The North Face"),
                ("Shirt", ART_A, 3799.0, "Levi's"),
                ("Jeans", ART_C, 4999.0, "Dr. Martens"),
                ("Boots", ART_A, 8799.0, "Levi's"),
            ],
            Season::Spring,
            Gender::Male,
            AgeGroup::Adult,
        ),
        post(
            "@awentodor_Italy",
            &["cantry_women"],
            &[
                ("Plaid", ART_B, 2999.0, "The North Face"),
                ("Dress", ART_A, 8799.0, "Levi's"),
                ("Bracelet", ART_C, 2399.0, "Dr. Martens"),
                ("Boots", ART_A, 11799.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Female,
            AgeGroup::Adult,
        ),
        post(
            "@manilov",
            &["chicago"],
            &[
                ("Hat", ART_B, 2999.0, "The North Face"),
                ("Sunglasses", ART_A, 2799.0, "Levi's"),
                ("Shirt", ART_A, 3799.0, "Levi's"),
                ("Tie", ART_C, 2399.0, "Dr. Martens"),
                ("Waistcoat", ART_A, 3799.0, "Levi's"),
                ("Watch", ART_C, 2399.0, "Shelby Ltd."),
                ("Blazer", ART_C, 8399.0, "Dr. Martens"),
                ("Trousers", ART_A, 7799.0, "Levi's"),
                ("Shoes", ART_A, 9799.0, "Levi's"),
                ("Socks", ART_A, 1199.0, "Levi's"),
                ("Blue blazer", ART_A, 10799.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Male,
            AgeGroup::Adult,
        ),
        post(
            "@sofaa",
            &["city_style"],
            &[
                ("Top", ART_B, 3999.0, "Levi's"),
                ("Waistcoat", ART_A, 2799.0, "Levi's"),
                ("Skirt", ART_A, 5799.0, "Levi's"),
                ("Coat", ART_C, 8399.0, "Dr. Martens"),
                ("Shoes", ART_A, 3799.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Female,
            AgeGroup::Young,
        ),
        post(
            "@sofaa",
            &["style_white"],
            &[
                ("Dress", ART_B, 7999.0, "Levi's"),
                ("Bag", ART_A, 3799.0, "Levi's"),
                ("Sunglasses", ART_A, 4799.0, "Levi's"),
                ("Shoes", ART_C, 7399.0, "Dr. Martens"),
            ],
            Season::Autumn,
            Gender::Female,
            AgeGroup::Young,
        ),
        post(
            "@lu_kang",
            &["kndr"],
            &[
                ("Shirt", ART_B, 1999.0, "Levi's"),
                ("Denim jacket", ART_A, 2799.0, "Levi's"),
                ("Trousers", ART_A, 3799.0, "Levi's"),
                ("Socks", ART_A, 199.0, "Levi's"),
                ("Sneakers", ART_A, 2799.0, "Levi's"),
                ("Raincoat", ART_A, 4299.0, "Levi's"),
            ],
            Season::Spring,
            Gender::Male,
            AgeGroup::Young,
        ),
        post(
            "@lu_kang",
            &["young80"],
            &[
                ("Sweater", ART_B, 1999.0, "Levi's"),
                ("Trousers", ART_A, 2799.0, "Levi's"),
                ("Belt", ART_A, 799.0, "Levi's"),
                ("Socks", ART_A, 299.0, "Levi's"),
                ("Trainers", ART_A, 4799.0, "Levi's"),
                ("Suitcase", ART_A, 3799.0, "Levi's"),
                ("Sunglasses", ART_A, 1699.0, "Levi's"),
                ("Pendant", ART_A, 2799.0, "Levi's"),
                ("Umbrella", ART_A, 4299.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Male,
            AgeGroup::Young,
        ),
        post(
            "@zelda",
            &["bocho"],
            &[
                ("Dress", ART_B, 4999.0, "Levi's"),
                ("Belt", ART_A, 2799.0, "Levi's"),
                ("Cape", ART_A, 5799.0, "Levi's"),
                ("Shoes", ART_A, 6299.0, "Levi's"),
            ],
            Season::Spring,
            Gender::Female,
            AgeGroup::Young,
        ),
        post(
            "@zelda",
            &["busines_women"],
            &[
                ("Sunglasses", ART_B, 1999.0, "Levi's"),
                ("Blouse", ART_A, 3799.0, "Levi's"),
                ("Blazer", ART_A, 4799.0, "Levi's"),
                ("Trousers", ART_A, 3299.0, "Levi's"),
                ("Bag", ART_A, 4799.0, "Levi's"),
                ("Shoes", ART_A, 5799.0, "Levi's"),
                ("Coat", ART_A, 6799.0, "Levi's"),
            ],
            Season::Autumn,
            Gender::Female,
            AgeGroup::Adult,
        ),
    ];

    let now = Utc::now();
    for (age_days, post) in (1..).zip(posts.iter_mut()) {
        post.created_at = now - Duration::days(age_days);
    }
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_dataset_shape() {
        let posts = outfits();
        assert_eq!(posts.len(), 13);

        let ids: HashSet<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), posts.len());

        assert!(posts.iter().all(|p| !p.items.is_empty() && !p.photos.is_empty()));
        assert!(posts.iter().all(|p| !p.is_favorite));
        assert!(posts.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[test]
    fn test_demo_posts_are_older_than_a_day() {
        let cutoff = Utc::now() - Duration::hours(23);
        assert!(outfits().iter().all(|p| p.created_at < cutoff));
    }
}
