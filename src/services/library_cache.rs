use chrono::Utc;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::{error::AppResult, models::LibrarySnapshot, services::providers::MediaSource};

struct CachedSnapshot {
    snapshot: Arc<LibrarySnapshot>,
    fetched_at: Instant,
}

/// Time-bounded cache of the full movie library
///
/// Holds at most one snapshot. Readers share it through an `Arc`; a refresh
/// builds a new snapshot and swaps it in under the write lock, so callers
/// only ever observe a complete library.
pub struct LibraryCache {
    source: Arc<dyn MediaSource>,
    library_name: String,
    ttl: Duration,
    current: RwLock<Option<CachedSnapshot>>,
}

impl LibraryCache {
    pub fn new(source: Arc<dyn MediaSource>, library_name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            source,
            library_name: library_name.into(),
            ttl,
            current: RwLock::new(None),
        }
    }

    fn is_fresh(&self, cached: &CachedSnapshot) -> bool {
        cached.fetched_at.elapsed() < self.ttl
    }

    /// Returns the cached snapshot, fetching a new one if it is missing or expired
    pub async fn get(&self) -> AppResult<Arc<LibrarySnapshot>> {
        {
            let current = self.current.read().await;
            if let Some(cached) = current.as_ref().filter(|c| self.is_fresh(c)) {
                tracing::debug!("Library cache hit");
                return Ok(cached.snapshot.clone());
            }
        }

        let mut current = self.current.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(cached) = current.as_ref().filter(|c| self.is_fresh(c)) {
            return Ok(cached.snapshot.clone());
        }

        let snapshot = self.fetch().await?;
        *current = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });
        Ok(snapshot)
    }

    /// Fetches a new snapshot regardless of the current one's age
    pub async fn refresh(&self) -> AppResult<Arc<LibrarySnapshot>> {
        let mut current = self.current.write().await;
        let snapshot = self.fetch().await?;
        *current = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });
        Ok(snapshot)
    }

    async fn fetch(&self) -> AppResult<Arc<LibrarySnapshot>> {
        tracing::info!(
            library = %self.library_name,
            source = self.source.name(),
            "Refreshing library cache"
        );

        let started = Instant::now();
        let movies = self.source.fetch_movies(&self.library_name).await?;
        let snapshot = LibrarySnapshot::new(movies, Utc::now());

        tracing::info!(
            movies = snapshot.movies.len(),
            genres = snapshot.genres.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Library cache refreshed"
        );

        Ok(Arc::new(snapshot))
    }
}
