use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the Plex Media Server (e.g. "http://192.168.1.10:32400")
    pub plex_url: String,

    /// Plex authentication token
    pub plex_token: String,

    /// Static API key clients must present. Authentication is disabled when unset.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub api_key: Option<String>,

    /// Name of the Plex library section holding movies
    #[serde(default = "default_library_name")]
    pub library_name: String,

    /// Library snapshot lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Path of the YAML document holding the mood mappings
    #[serde(default = "default_mood_config_path")]
    pub mood_config_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_library_name() -> String {
    "Movies".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_mood_config_path() -> String {
    "config.yaml".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
