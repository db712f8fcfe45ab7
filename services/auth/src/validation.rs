//! Input validation utilities

use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

/// Validate username
///
/// A single leading `@` is allowed and not counted.
pub fn validate_username(username: &str) -> Result<(), String> {
    let name = username.strip_prefix('@').unwrap_or(username);

    if name.is_empty() {
        return Err("Username is required".to_string());
    }

    if name.chars().count() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if name.chars().count() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").ok());

    if !regex.as_ref().is_some_and(|r| r.is_match(name)) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

    if !regex.as_ref().is_some_and(|r| r.is_match(email)) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    // bcrypt on the identity service truncates past 72 bytes
    if password.len() > 72 {
        return Err("Password must be at most 72 bytes long".to_string());
    }

    Ok(())
}

/// Validate a social profile link
pub fn validate_social_url(url: &str) -> Result<(), String> {
    let parsed = Url::parse(url.trim()).map_err(|_| "Invalid link".to_string())?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err("Link must be an http(s) address".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("nesty__").is_ok());
        assert!(validate_username("@awentodor_Italy").is_ok());
        assert!(validate_username("@ab").is_err());
        assert!(validate_username("@").is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("@@double").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("andrew@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("andrew@").is_err());
        assert!(validate_email("andrew.example.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(73)).is_err());
    }

    #[test]
    fn test_social_url_rules() {
        assert!(validate_social_url("https://instagram.com/sofaa").is_ok());
        assert!(validate_social_url("t.me/sofaa").is_err());
        assert!(validate_social_url("ftp://example.com").is_err());
    }
}
