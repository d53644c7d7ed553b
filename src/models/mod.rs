use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod mood;
pub mod params;

pub use mood::{MoodMappings, MoodRule};
pub use params::{
    HistoryParams, PlayRequest, PlayResponse, RecommendParams, SearchParams, SortOrder, StatsParams,
};

/// A movie in the library snapshot, as returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub year: Option<i32>,
    pub summary: Option<String>,
    /// Audience rating, falling back to the critic rating
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    /// Runtime in minutes, 0 when unknown
    pub runtime: u32,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub content_rating: Option<String>,
    pub watched: bool,
    pub view_count: u32,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub added_at: Option<DateTime<Utc>>,
    /// Library path such as "/library/metadata/12345"
    pub plex_key: String,
    pub rating_key: String,
    pub guid: Option<String>,
}

impl MovieRecord {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    /// Rating used for thresholds and ordering; unrated movies count as 0
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Decade label such as "1990s"
    pub fn decade(&self) -> Option<String> {
        self.year.map(|y| format!("{}s", y.div_euclid(10) * 10))
    }
}

/// Complete, immutable view of the movie library at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct LibrarySnapshot {
    pub movies: Vec<MovieRecord>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub last_refresh: DateTime<Utc>,
}

impl LibrarySnapshot {
    pub fn new(movies: Vec<MovieRecord>, last_refresh: DateTime<Utc>) -> Self {
        let mut genres = BTreeSet::new();
        let mut actors = BTreeSet::new();
        let mut directors = BTreeSet::new();

        for movie in &movies {
            genres.extend(movie.genres.iter().cloned());
            actors.extend(movie.actors.iter().cloned());
            directors.extend(movie.directors.iter().cloned());
        }

        Self {
            movies,
            genres: genres.into_iter().collect(),
            actors: actors.into_iter().collect(),
            directors: directors.into_iter().collect(),
            last_refresh,
        }
    }

    pub fn find_by_key(&self, key: &str) -> Option<&MovieRecord> {
        self.movies
            .iter()
            .find(|m| m.plex_key == key || m.rating_key == key)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&MovieRecord> {
        let title = title.trim();
        self.movies
            .iter()
            .find(|m| m.title == title)
            .or_else(|| self.movies.iter().find(|m| m.title.eq_ignore_ascii_case(title)))
    }
}

/// A Plex player that can receive playback commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientDevice {
    pub name: String,
    pub product: Option<String>,
    pub device: Option<String>,
    pub machine_identifier: String,
    #[serde(skip_serializing)]
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub port: Option<u16>,
    #[serde(skip_serializing)]
    pub protocol: Option<String>,
}

/// One play event from the server's watch history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchHistoryEntry {
    pub title: String,
    pub watched_at: DateTime<Utc>,
    pub plex_key: Option<String>,
    pub rating_key: Option<String>,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Option<f64>,
}

impl WatchHistoryEntry {
    /// Fill genres and rating from the matching library movie, if any
    pub fn enrich(&mut self, snapshot: &LibrarySnapshot) {
        let movie = self
            .rating_key
            .as_deref()
            .or(self.plex_key.as_deref())
            .and_then(|key| snapshot.find_by_key(key));

        if let Some(movie) = movie {
            self.genres = movie.genres.clone();
            self.rating = movie.rating;
        }
    }
}

/// Aggregate counts over the library snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryStats {
    pub total_movies: usize,
    pub unwatched_movies: usize,
    pub genres: Vec<String>,
    pub decades_available: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Plex API Types
// ============================================================================

/// Envelope wrapping every Plex JSON response
#[derive(Debug, Deserialize)]
pub struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlexMetadataContainer<T> {
    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlexDirectoryContainer {
    #[serde(rename = "Directory", default)]
    pub directory: Vec<PlexDirectory>,
}

/// Library section listed by /library/sections
#[derive(Debug, Clone, Deserialize)]
pub struct PlexDirectory {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlexServerContainer {
    #[serde(rename = "Server", default)]
    pub server: Vec<PlexClient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexIdentity {
    pub machine_identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexPlayQueue {
    #[serde(rename = "playQueueID")]
    pub play_queue_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexTag {
    pub tag: String,
}

/// Movie metadata from /library/sections/{key}/all
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMovie {
    pub rating_key: String,
    pub key: String,
    #[serde(default)]
    pub guid: Option<String>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub audience_rating: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub content_rating: Option<String>,
    /// Milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub last_viewed_at: Option<i64>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<PlexTag>,
    #[serde(rename = "Director", default)]
    pub directors: Vec<PlexTag>,
    #[serde(rename = "Role", default)]
    pub roles: Vec<PlexTag>,
}

fn from_unix(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl From<PlexMovie> for MovieRecord {
    fn from(movie: PlexMovie) -> Self {
        let view_count = movie.view_count.unwrap_or(0);

        MovieRecord {
            title: movie.title,
            year: movie.year,
            summary: movie.summary.filter(|s| !s.is_empty()),
            rating: movie.audience_rating.or(movie.rating),
            genres: movie.genres.into_iter().map(|t| t.tag).collect(),
            runtime: movie.duration.map(|ms| (ms / 60_000) as u32).unwrap_or(0),
            directors: movie.directors.into_iter().map(|t| t.tag).collect(),
            actors: movie.roles.into_iter().map(|t| t.tag).collect(),
            content_rating: movie.content_rating,
            watched: view_count > 0,
            view_count,
            last_viewed_at: from_unix(movie.last_viewed_at),
            added_at: from_unix(movie.added_at),
            plex_key: movie.key,
            rating_key: movie.rating_key,
            guid: movie.guid,
        }
    }
}

/// Player listed by /clients
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexClient {
    pub name: String,
    pub machine_identifier: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
}

impl From<PlexClient> for ClientDevice {
    fn from(client: PlexClient) -> Self {
        ClientDevice {
            name: client.name,
            product: client.product,
            device: client.device_class,
            machine_identifier: client.machine_identifier,
            address: client.address.or(client.host),
            port: client.port,
            protocol: client.protocol,
        }
    }
}

/// Entry from /status/sessions/history/all
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexHistoryItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub grandparent_title: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub rating_key: Option<String>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    pub viewed_at: i64,
}

impl PlexHistoryItem {
    /// Converts to a history entry; entries with an unrepresentable timestamp are dropped
    pub fn into_entry(self) -> Option<WatchHistoryEntry> {
        let watched_at = DateTime::from_timestamp(self.viewed_at, 0)?;
        let title = match (self.grandparent_title, self.title) {
            (Some(show), Some(episode)) => format!("{} - {}", show, episode),
            (None, Some(title)) => title,
            (Some(show), None) => show,
            (None, None) => "Unknown".to_string(),
        };

        Some(WatchHistoryEntry {
            title,
            watched_at,
            plex_key: self.key,
            rating_key: self.rating_key,
            media_type: self.media_type.unwrap_or_else(|| "unknown".to_string()),
            genres: Vec::new(),
            rating: None,
        })
    }
}
