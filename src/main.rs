use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plex_movie_api::{
    config::Config,
    models::MoodMappings,
    routes::{create_router, AppState},
    services::PlexProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plex_movie_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let moods = MoodMappings::load(&config.mood_config_path)
        .with_context(|| format!("Failed to load moods from {}", config.mood_config_path))?;
    tracing::info!(moods = ?moods.names(), "Mood mappings loaded");

    let provider = PlexProvider::new(&config.plex_url, &config.plex_token)?;
    let addr = config.bind_addr();
    tracing::info!(plex_url = %config.plex_url, library = %config.library_name, "Using Plex server");

    let state = AppState::new(config, Arc::new(provider), moods);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
