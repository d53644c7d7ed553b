use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, routes::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_PARAM: &str = "api_key";

/// Key presented by the caller, if any
///
/// A bearer token wins over the `X-API-KEY` header, which wins over the
/// `api_key` query parameter.
fn presented_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    let header = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    if let Some(key) = bearer.or(header).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(mut params)| params.remove(API_KEY_PARAM))
        .filter(|k| !k.is_empty())
}

/// Rejects requests that do not carry the configured API key
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    match presented_key(request.headers(), request.uri()) {
        Some(key) if key == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            Err(AppError::Unauthorized("Invalid API key".to_string()))
        }
        None => Err(AppError::Unauthorized("Missing API key".to_string())),
    }
}
