use serde::{Deserialize, Deserializer, Serialize};

/// Result ordering for /search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Rating-weighted random selection
    #[default]
    Random,
    /// Highest rated first
    Rating,
    /// Most recently added first
    Recent,
    /// Oldest release first
    Oldest,
}

fn default_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Query flag: "true" in any casing is true, any other text is false
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
    })
}

fn default_history_limit() -> usize {
    50
}

fn default_history_days() -> i64 {
    90
}

/// Query parameters accepted by /search
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchParams {
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    /// Shortcut such as "1990s"
    pub decade: Option<String>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub rating_min: Option<f64>,
    pub actor: Option<String>,
    pub director: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub unwatched_only: bool,
    #[serde(default)]
    pub sort: SortOrder,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            genre: None,
            mood: None,
            year_start: None,
            year_end: None,
            decade: None,
            runtime_min: None,
            runtime_max: None,
            rating_min: None,
            actor: None,
            director: None,
            limit: default_limit(),
            unwatched_only: true,
            sort: SortOrder::default(),
        }
    }
}

/// Query parameters accepted by /recommend
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecommendParams {
    pub mood: Option<String>,
    #[serde(default = "default_limit")]
    pub count: usize,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub unwatched_only: bool,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self {
            mood: None,
            count: default_limit(),
            unwatched_only: true,
        }
    }
}

/// Query parameters accepted by /history
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryParams {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
    #[serde(default = "default_history_days")]
    pub days: i64,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
            days: default_history_days(),
        }
    }
}

/// Query parameters accepted by /library-stats
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StatsParams {
    /// Refresh the library before computing
    #[serde(default, deserialize_with = "lenient_bool")]
    pub refresh: bool,
}

/// Body of POST /play
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlayRequest {
    pub title: Option<String>,
    pub plex_key: Option<String>,
    pub client: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayResponse {
    pub status: String,
    pub title: String,
    pub client: String,
}
