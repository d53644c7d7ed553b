use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{LibraryStats, StatsParams},
    routes::AppState,
    services::stats,
};

/// Handler for library aggregates
pub async fn library_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsParams>, QueryRejection>,
) -> AppResult<Json<LibraryStats>> {
    let Query(params) = query?;
    let snapshot = if params.refresh {
        state.library.refresh().await?
    } else {
        state.library.get().await?
    };
    Ok(Json(stats::library_stats(&snapshot)))
}
