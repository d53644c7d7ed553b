use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{HistoryParams, MovieRecord, RecommendParams},
    routes::AppState,
    services::{
        history,
        recommendations::{self, HISTORY_SAMPLE_SIZE, HISTORY_WINDOW_DAYS},
    },
};

/// Handler for history-biased suggestions
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendParams>, QueryRejection>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let Query(params) = query?;
    let snapshot = state.library.get().await?;

    let window = HistoryParams {
        limit: HISTORY_SAMPLE_SIZE,
        days: HISTORY_WINDOW_DAYS,
    };
    let recent = history::recent_history(state.source.as_ref(), &snapshot, &window).await?;

    let suggestions =
        recommendations::get_recommendations(&snapshot, &recent, &params, &state.moods)?;

    tracing::info!(
        request_id = %request_id,
        mood = params.mood.as_deref().unwrap_or("-"),
        returned = suggestions.len(),
        "Recommendations served"
    );
    Ok(Json(suggestions))
}
