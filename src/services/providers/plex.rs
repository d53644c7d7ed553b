/// Plex Media Server provider
///
/// Talks to the server's JSON API with a pre-issued token.
///
/// API Flow:
/// 1. Movies: /library/sections → section key by title, then /library/sections/{key}/all
/// 2. Clients: /clients
/// 3. History: /status/sessions/history/all sorted by viewedAt
/// 4. Playback: / (server identity) → POST /playQueues → /player/playback/playMedia
use crate::{
    error::{AppError, AppResult},
    models::{
        ClientDevice, MovieRecord, PlexDirectory, PlexDirectoryContainer, PlexHistoryItem,
        PlexIdentity, PlexMetadataContainer, PlexMovie, PlexPlayQueue, PlexResponse,
        PlexServerContainer, WatchHistoryEntry,
    },
    services::providers::MediaSource,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    Client as HttpClient, Response, Url,
};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;

const CLIENT_IDENTIFIER: &str = "plex-movie-api";
const PRODUCT_NAME: &str = "Plex Movie API";

pub struct PlexProvider {
    http_client: HttpClient,
    base_url: Url,
    token: String,
    /// Server machine identifier, needed to address play queues
    machine_identifier: OnceCell<String>,
    command_id: AtomicU64,
}

impl PlexProvider {
    pub fn new(plex_url: &str, token: &str) -> AppResult<Self> {
        let base_url = Url::parse(plex_url)
            .map_err(|e| AppError::Internal(format!("Invalid PLEX_URL '{}': {}", plex_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-plex-token"),
            HeaderValue::from_str(token)
                .map_err(|_| AppError::Internal("Invalid PLEX_TOKEN format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("x-plex-client-identifier"),
            HeaderValue::from_static(CLIENT_IDENTIFIER),
        );
        headers.insert(
            HeaderName::from_static("x-plex-product"),
            HeaderValue::from_static(PRODUCT_NAME),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            token: token.to_string(),
            machine_identifier: OnceCell::new(),
            command_id: AtomicU64::new(0),
        })
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid Plex path '{}': {}", path, e)))
    }

    async fn check_status(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Plex request failed");
        Err(AppError::Upstream(format!(
            "Plex returned status {}: {}",
            status, body
        )))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.url(path)?)
            .query(query)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: PlexResponse<T> = response.json().await?;
        Ok(body.media_container)
    }

    async fn section_key(&self, library: &str) -> AppResult<String> {
        let sections: PlexDirectoryContainer = self.get_json("/library/sections", &[]).await?;
        select_section(&sections.directory, library).map(|s| s.key.clone())
    }

    async fn server_identifier(&self) -> AppResult<&str> {
        let id = self
            .machine_identifier
            .get_or_try_init(|| async {
                let identity: PlexIdentity = self.get_json("/", &[]).await?;
                tracing::info!(
                    machine_identifier = %identity.machine_identifier,
                    "Resolved Plex server identity"
                );
                Ok::<_, AppError>(identity.machine_identifier)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn create_play_queue(&self, server_id: &str, movie: &MovieRecord) -> AppResult<u64> {
        let uri = format!(
            "server://{}/com.plexapp.plugins.library{}",
            server_id, movie.plex_key
        );

        let response = self
            .http_client
            .post(self.url("/playQueues")?)
            .query(&[
                ("type", "video"),
                ("uri", uri.as_str()),
                ("shuffle", "0"),
                ("repeat", "0"),
                ("continuous", "0"),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: PlexResponse<PlexPlayQueue> = response.json().await?;
        Ok(body.media_container.play_queue_id)
    }
}

/// Picks the library section whose title matches `library`, case-insensitively
fn select_section<'a>(sections: &'a [PlexDirectory], library: &str) -> AppResult<&'a PlexDirectory> {
    sections
        .iter()
        .find(|s| s.title == library)
        .or_else(|| sections.iter().find(|s| s.title.eq_ignore_ascii_case(library)))
        .ok_or_else(|| AppError::Upstream(format!("Library section '{}' not found on Plex server", library)))
}

/// Query string for /player/playback/playMedia
fn play_media_query(
    base_url: &Url,
    server_id: &str,
    token: &str,
    movie: &MovieRecord,
    play_queue_id: u64,
    command_id: u64,
) -> Vec<(&'static str, String)> {
    let port = base_url.port_or_known_default().unwrap_or(32400);

    vec![
        ("key", movie.plex_key.clone()),
        ("offset", "0".to_string()),
        ("machineIdentifier", server_id.to_string()),
        ("address", base_url.host_str().unwrap_or("localhost").to_string()),
        ("port", port.to_string()),
        ("protocol", base_url.scheme().to_string()),
        ("token", token.to_string()),
        (
            "containerKey",
            format!("/playQueues/{}?window=100&own=1", play_queue_id),
        ),
        ("type", "video".to_string()),
        ("commandID", command_id.to_string()),
    ]
}

#[async_trait::async_trait]
impl MediaSource for PlexProvider {
    async fn fetch_movies(&self, library: &str) -> AppResult<Vec<MovieRecord>> {
        let key = self.section_key(library).await?;
        let path = format!("/library/sections/{}/all", key);

        let container: PlexMetadataContainer<PlexMovie> = self
            .get_json(&path, &[("type", "1".to_string())])
            .await?;

        let movies: Vec<MovieRecord> = container
            .metadata
            .into_iter()
            .map(MovieRecord::from)
            .collect();

        tracing::info!(
            library = %library,
            section = %key,
            movies = movies.len(),
            provider = "plex",
            "Library fetched"
        );

        Ok(movies)
    }

    async fn list_clients(&self) -> AppResult<Vec<ClientDevice>> {
        let container: PlexServerContainer = self.get_json("/clients", &[]).await?;
        let clients: Vec<ClientDevice> = container
            .server
            .into_iter()
            .map(ClientDevice::from)
            .collect();

        tracing::debug!(clients = clients.len(), provider = "plex", "Clients listed");
        Ok(clients)
    }

    async fn play(&self, client: &ClientDevice, movie: &MovieRecord) -> AppResult<()> {
        let server_id = self.server_identifier().await?;
        let play_queue_id = self.create_play_queue(server_id, movie).await?;
        let command_id = self.command_id.fetch_add(1, Ordering::Relaxed) + 1;

        let query = play_media_query(
            &self.base_url,
            server_id,
            &self.token,
            movie,
            play_queue_id,
            command_id,
        );

        let target = HeaderValue::from_str(&client.machine_identifier).map_err(|_| {
            AppError::ClientUnavailable(format!(
                "Client '{}' has an invalid machine identifier",
                client.name
            ))
        })?;

        let response = self
            .http_client
            .get(self.url("/player/playback/playMedia")?)
            .header(HeaderName::from_static("x-plex-target-client-identifier"), target)
            .query(&query)
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::info!(
            client = %client.name,
            title = %movie.title,
            play_queue_id = play_queue_id,
            command_id = command_id,
            provider = "plex",
            "Playback command sent"
        );

        Ok(())
    }

    async fn fetch_history(&self, max_results: usize) -> AppResult<Vec<WatchHistoryEntry>> {
        let container: PlexMetadataContainer<PlexHistoryItem> = self
            .get_json(
                "/status/sessions/history/all",
                &[
                    ("sort", "viewedAt:desc".to_string()),
                    ("X-Plex-Container-Start", "0".to_string()),
                    ("X-Plex-Container-Size", max_results.to_string()),
                ],
            )
            .await?;

        let entries: Vec<WatchHistoryEntry> = container
            .metadata
            .into_iter()
            .filter_map(PlexHistoryItem::into_entry)
            .collect();

        tracing::debug!(entries = entries.len(), provider = "plex", "History fetched");
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "plex"
    }
}
