use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{HistoryParams, LibrarySnapshot, WatchHistoryEntry},
    services::providers::MediaSource,
};

/// Fetches recent watch history from the media source
///
/// Over-fetches by a factor of two so that the day cutoff still leaves
/// `limit` entries in the common case, then enriches movie entries with
/// genres and rating from the library snapshot.
pub async fn recent_history(
    source: &dyn MediaSource,
    snapshot: &LibrarySnapshot,
    params: &HistoryParams,
) -> AppResult<Vec<WatchHistoryEntry>> {
    if params.limit == 0 {
        return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
    }
    if params.days < 1 {
        return Err(AppError::InvalidInput("days must be at least 1".to_string()));
    }

    let fetched = source.fetch_history(params.limit.saturating_mul(2)).await?;
    let entries = select_recent(fetched, snapshot, params.limit, params.days, Utc::now());

    tracing::debug!(
        limit = params.limit,
        days = params.days,
        returned = entries.len(),
        "History collected"
    );

    Ok(entries)
}

fn select_recent(
    entries: Vec<WatchHistoryEntry>,
    snapshot: &LibrarySnapshot,
    limit: usize,
    days: i64,
    now: DateTime<Utc>,
) -> Vec<WatchHistoryEntry> {
    // A window reaching past the representable range keeps everything
    let cutoff = Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    entries
        .into_iter()
        .filter(|entry| entry.watched_at >= cutoff)
        .take(limit)
        .map(|mut entry| {
            entry.enrich(snapshot);
            entry
        })
        .collect()
}
