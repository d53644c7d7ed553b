pub mod filter;
pub mod history;
pub mod library_cache;
pub mod playback;
pub mod providers;
pub mod recommendations;
pub mod stats;

pub use library_cache::LibraryCache;
pub use playback::PlaybackGateway;
pub use providers::{MediaSource, PlexProvider};
