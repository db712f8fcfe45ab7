use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use api::{BackendGateway, BearerToken, SupabaseGateway};
use auth::{AuthManager, GoTrueClient};
use common::{cache::open_store, config::LuminConfig, identity::CurrentUser, telemetry};
use feed::{FeedSettings, FeedStore, LoadOutcome};
use media::MediaUploader;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing("info");

    info!("Starting Lumin feed client");

    let config = LuminConfig::from_env()?;
    let store = open_store(&config).await?;

    // The gateway and the auth manager share one bearer token
    let token = BearerToken::new();
    let gateway: Arc<dyn BackendGateway> = Arc::new(SupabaseGateway::new(&config, token.clone())?);
    let identity = Arc::new(GoTrueClient::new(&config)?);
    let auth = Arc::new(AuthManager::new(identity, gateway.clone(), store, token));

    match auth.restore().await {
        Ok(true) => info!("Restored session for {:?}", auth.state().current_user.map(|u| u.username)),
        Ok(false) => info!("No saved session, browsing anonymously"),
        Err(e) => warn!("Could not restore session: {}", e),
    }

    let media = MediaUploader::from_config(gateway.clone(), &config);
    let user: Arc<dyn CurrentUser> = auth.clone();
    let feed = FeedStore::new(gateway, media, user, FeedSettings::from(&config));

    let outcome = feed.load(true).await;
    let state = feed.snapshot();
    match outcome {
        LoadOutcome::Loaded { fetched } => info!("Fetched {} outfits", fetched),
        LoadOutcome::Failed => warn!(
            "Feed unavailable: {}",
            state.last_error.as_deref().unwrap_or("unknown error")
        ),
        LoadOutcome::Skipped => {}
    }
    if state.is_demo {
        info!("Showing built-in outfits");
    }

    for post in &state.posts {
        info!(
            "{} {} | {} / {} / {} | {} items{}",
            post.created_at.format("%Y-%m-%d %H:%M"),
            post.author,
            post.season,
            post.gender,
            post.age_group,
            post.item_count(),
            if post.is_favorite { " | favorite" } else { "" }
        );
    }

    Ok(())
}
