use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    models::MoodMappings,
    services::{LibraryCache, MediaSource, PlaybackGateway},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn MediaSource>,
    pub library: Arc<LibraryCache>,
    pub moods: Arc<MoodMappings>,
    pub playback: Arc<PlaybackGateway>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn MediaSource>, moods: MoodMappings) -> Self {
        let library = LibraryCache::new(
            source.clone(),
            config.library_name.clone(),
            Duration::from_secs(config.cache_ttl),
        );

        Self {
            config: Arc::new(config),
            library: Arc::new(library),
            moods: Arc::new(moods),
            playback: Arc::new(PlaybackGateway::new(source.clone())),
            source,
        }
    }
}
