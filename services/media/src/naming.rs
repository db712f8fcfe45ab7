//! Storage object names for outfit photos

use chrono::Utc;

/// Name of the `index`-th photo of a post published at `timestamp_millis`
pub fn object_name(timestamp_millis: i64, index: usize) -> String {
    format!("outfit_{}_{}.jpg", timestamp_millis, index)
}

/// Object names for `count` photos published now
pub fn object_names_now(count: usize) -> Vec<String> {
    let now = Utc::now().timestamp_millis();
    (0..count).map(|index| object_name(now, index)).collect()
}

/// Object name behind a public photo URL
///
/// Returns `None` for references outside the bucket (bundled demo assets,
/// third-party URLs), which are never deleted.
pub fn object_name_from_url<'a>(url: &'a str, public_prefix: &str) -> Option<&'a str> {
    let name = url.strip_prefix(public_prefix)?;
    let name = name.split(['?', '#']).next().unwrap_or_default();
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}
