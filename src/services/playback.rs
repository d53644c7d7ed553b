use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{ClientDevice, LibrarySnapshot, MovieRecord, PlayRequest, PlayResponse},
    services::providers::MediaSource,
};

/// Resolves titles and client names, then issues play commands
pub struct PlaybackGateway {
    source: Arc<dyn MediaSource>,
    /// Last known device list, refreshed when a name is not recognised
    devices: RwLock<Vec<ClientDevice>>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn find_device(devices: &[ClientDevice], name: &str) -> Option<ClientDevice> {
    devices
        .iter()
        .find(|d| d.name == name)
        .or_else(|| devices.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
        .cloned()
}

/// Finds the requested movie; an explicit key takes precedence over the title
fn resolve_movie<'a>(
    snapshot: &'a LibrarySnapshot,
    request: &PlayRequest,
) -> AppResult<&'a MovieRecord> {
    match (non_empty(&request.plex_key), non_empty(&request.title)) {
        (Some(key), _) => snapshot
            .find_by_key(key)
            .ok_or_else(|| AppError::NotFound(format!("No movie with key '{}' in library", key))),
        (None, Some(title)) => snapshot
            .find_by_title(title)
            .ok_or_else(|| AppError::NotFound(format!("No movie titled '{}' in library", title))),
        (None, None) => Err(AppError::InvalidInput(
            "Provide either title or plex_key".to_string(),
        )),
    }
}

impl PlaybackGateway {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            devices: RwLock::new(Vec::new()),
        }
    }

    /// Re-reads the device list from the media source
    pub async fn refresh_clients(&self) -> AppResult<Vec<ClientDevice>> {
        let devices = self.source.list_clients().await?;
        tracing::debug!(clients = devices.len(), "Client list refreshed");
        *self.devices.write().await = devices.clone();
        Ok(devices)
    }

    async fn resolve_client(&self, name: &str) -> AppResult<ClientDevice> {
        let known = {
            let devices = self.devices.read().await;
            find_device(&devices, name)
        };
        if let Some(device) = known {
            return Ok(device);
        }

        tracing::debug!(client = %name, "Client not in cached list, refreshing");
        let devices = self.refresh_clients().await?;
        find_device(&devices, name).ok_or_else(|| {
            AppError::ClientUnavailable(format!("No connected client named '{}'", name))
        })
    }

    pub async fn play(
        &self,
        snapshot: &LibrarySnapshot,
        request: &PlayRequest,
    ) -> AppResult<PlayResponse> {
        let client_name = non_empty(&request.client)
            .ok_or_else(|| AppError::InvalidInput("Missing client".to_string()))?;

        let movie = resolve_movie(snapshot, request)?;
        let client = self.resolve_client(client_name).await?;

        self.source.play(&client, movie).await?;

        tracing::info!(
            title = %movie.title,
            plex_key = %movie.plex_key,
            client = %client.name,
            "Playback started"
        );

        Ok(PlayResponse {
            status: "playing".to_string(),
            title: movie.title.clone(),
            client: client.name,
        })
    }
}
