use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span_with_request_id, request_id_middleware, require_api_key};

pub mod clients;
pub mod history;
pub mod play;
pub mod recommend;
pub mod search;
pub mod state;
pub mod stats;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Routes guarded by the API key
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/search", get(search::search))
        .route("/recommend", get(recommend::recommend))
        .route("/play", post(play::play))
        .route("/clients", get(clients::list_clients))
        .route("/history", get(history::history))
        .route("/library-stats", get(stats::library_stats))
        .route_layer(from_fn_with_state(state, require_api_key))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
