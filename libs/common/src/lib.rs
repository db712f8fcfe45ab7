//! Common library for the Lumin client
//!
//! This crate provides what every other Lumin crate builds on: the outfit and
//! user models, the error taxonomy, configuration, the key-value session store
//! and tracing setup.

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod telemetry;

pub use error::{LuminError, LuminResult};

/// Example usage of the configuration and session store
///
/// ```rust,no_run
/// use common::{cache::open_store, config::LuminConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = LuminConfig::from_env()?;
///     let store = open_store(&config).await?;
///     let token = store.get("lumin:access_token").await?;
///     println!("Persisted session present: {}", token.is_some());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
