use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{HistoryParams, WatchHistoryEntry},
    routes::AppState,
    services::history::recent_history,
};

/// Handler for recent watch history
pub async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryParams>, QueryRejection>,
) -> AppResult<Json<Vec<WatchHistoryEntry>>> {
    let Query(params) = query?;
    let snapshot = state.library.get().await?;
    let entries = recent_history(state.source.as_ref(), &snapshot, &params).await?;
    Ok(Json(entries))
}
