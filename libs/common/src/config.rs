//! Configuration for the Lumin client
//!
//! Values are layered: built-in defaults, then an optional `lumin.toml` in the
//! working directory, then `LUMIN_*` environment variables.

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LuminError, LuminResult};

/// Where the signed-in session snapshot is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    Memory,
    File,
    Redis,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuminConfig {
    /// Backend project URL (e.g., "https://xyz.supabase.co")
    pub project_url: String,
    /// Public anonymous API key of the project
    pub anon_key: String,
    /// Storage bucket holding outfit photos
    pub storage_bucket: String,
    /// Largest accepted photo in bytes
    pub max_image_size: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Number of posts fetched per feed page
    pub page_size: u32,
    /// Locally created posts younger than this survive a refresh
    pub recency_window_secs: u64,
    /// Distance from the end of the feed that triggers the next page
    pub prefetch_distance: usize,
    pub session_store: SessionStoreKind,
    /// Snapshot file used when `session_store = "file"`
    pub session_file: PathBuf,
    /// Redis URL used when `session_store = "redis"`
    pub redis_url: String,
}

impl Default for LuminConfig {
    fn default() -> Self {
        Self {
            project_url: String::new(),
            anon_key: String::new(),
            storage_bucket: "outfit-images".to_string(),
            max_image_size: 5 * 1024 * 1024,
            timeout_secs: 30,
            page_size: 10,
            recency_window_secs: 300,
            prefetch_distance: 3,
            session_store: SessionStoreKind::File,
            session_file: PathBuf::from(".lumin/session.json"),
            redis_url: "redis://localhost:6379".to_string(),
        }
    }
}

impl LuminConfig {
    /// Load configuration from defaults, `lumin.toml` and the environment
    ///
    /// # Environment Variables
    /// - `LUMIN_PROJECT_URL`: backend project URL (required for remote calls)
    /// - `LUMIN_ANON_KEY`: anonymous API key (required for remote calls)
    /// - `LUMIN_PAGE_SIZE`: feed page size (default: 10)
    /// - `LUMIN_SESSION_STORE`: `memory`, `file` or `redis` (default: file)
    /// - any other field name, upper-cased, with the `LUMIN_` prefix
    pub fn from_env() -> LuminResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&LuminConfig::default())?)
            .add_source(config::File::with_name("lumin").required(false))
            .add_source(config::Environment::with_prefix("LUMIN").try_parsing(true))
            .build()?;

        let config: LuminConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// Configuration pointing at a specific project, defaults elsewhere
    pub fn for_project(project_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        }
    }

    /// Fail unless the remote backend is configured
    pub fn require_remote(&self) -> LuminResult<()> {
        if self.project_url.trim().is_empty() {
            return Err(LuminError::Configuration(
                "LUMIN_PROJECT_URL is not set".to_string(),
            ));
        }
        if self.anon_key.trim().is_empty() {
            return Err(LuminError::Configuration("LUMIN_ANON_KEY is not set".to_string()));
        }
        Ok(())
    }

    /// Project URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.project_url.trim_end_matches('/')
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url())
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url())
    }

    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.base_url())
    }

    /// Public URL prefix of objects in the photo bucket
    pub fn public_object_prefix(&self) -> String {
        format!(
            "{}/object/public/{}/",
            self.storage_url(),
            self.storage_bucket
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn recency_window(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.recency_window_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        let config = LuminConfig::from_env().expect("Failed to load config");
        assert_eq!(config.storage_bucket, "outfit-images");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.recency_window_secs, 300);
        assert_eq!(config.prefetch_distance, 3);
        assert_eq!(config.max_image_size, 5 * 1024 * 1024);
        assert_eq!(config.session_store, SessionStoreKind::File);
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("LUMIN_PROJECT_URL", "https://demo.supabase.co/");
            std::env::set_var("LUMIN_ANON_KEY", "anon-key");
            std::env::set_var("LUMIN_PAGE_SIZE", "20");
            std::env::set_var("LUMIN_SESSION_STORE", "memory");
        }

        let config = LuminConfig::from_env().expect("Failed to load config");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.session_store, SessionStoreKind::Memory);
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
        assert_eq!(
            config.public_object_prefix(),
            "https://demo.supabase.co/storage/v1/object/public/outfit-images/"
        );
        assert!(config.require_remote().is_ok());

        unsafe {
            std::env::remove_var("LUMIN_PROJECT_URL");
            std::env::remove_var("LUMIN_ANON_KEY");
            std::env::remove_var("LUMIN_PAGE_SIZE");
            std::env::remove_var("LUMIN_SESSION_STORE");
        }
    }

    #[test]
    fn test_missing_project_is_a_configuration_error() {
        let config = LuminConfig::default();
        assert!(matches!(
            config.require_remote(),
            Err(LuminError::Configuration(_))
        ));
    }
}
