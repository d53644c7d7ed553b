use axum::{extract::State, Json};

use crate::{error::AppResult, models::ClientDevice, routes::AppState};

/// Handler listing connected players
pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<Vec<ClientDevice>>> {
    let devices = state.playback.refresh_clients().await?;
    Ok(Json(devices))
}
