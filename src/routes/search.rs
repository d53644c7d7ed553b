use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{MovieRecord, SearchParams},
    routes::AppState,
    services::filter,
};

/// Handler for the compound filter query
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let Query(params) = query?;
    let snapshot = state.library.get().await?;

    let results = filter::search(&snapshot, &params, &state.moods, &mut rand::thread_rng())?;

    tracing::info!(
        request_id = %request_id,
        sort = ?params.sort,
        returned = results.len(),
        "Search completed"
    );
    Ok(Json(results))
}
