use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PlayRequest, PlayResponse},
    routes::AppState,
};

/// Handler for starting playback on a client
pub async fn play(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<PlayRequest>, JsonRejection>,
) -> AppResult<Json<PlayResponse>> {
    let Json(request) = body?;
    let snapshot = state.library.get().await?;

    let response = state.playback.play(&snapshot, &request).await?;
    tracing::info!(request_id = %request_id, client = %response.client, "Play command sent");
    Ok(Json(response))
}
