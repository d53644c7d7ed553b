/// Media source abstraction
///
/// The filtering, recommendation and playback services only depend on this
/// trait. `PlexProvider` talks to a real Plex Media Server; tests substitute
/// mocks or in-memory sources.
use crate::{
    error::AppResult,
    models::{ClientDevice, MovieRecord, WatchHistoryEntry},
};

pub mod plex;

pub use plex::PlexProvider;

/// Read and command access to a media server
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch every movie in the named library section
    async fn fetch_movies(&self, library: &str) -> AppResult<Vec<MovieRecord>>;

    /// List the players currently connected to the server
    async fn list_clients(&self) -> AppResult<Vec<ClientDevice>>;

    /// Start playback of `movie` on `client`
    async fn play(&self, client: &ClientDevice, movie: &MovieRecord) -> AppResult<()>;

    /// Fetch up to `max_results` history entries, most recent first
    async fn fetch_history(&self, max_results: usize) -> AppResult<Vec<WatchHistoryEntry>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
