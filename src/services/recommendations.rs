use std::{cmp::Ordering, collections::HashMap};

use crate::{
    error::{AppError, AppResult},
    models::{LibrarySnapshot, MoodMappings, MovieRecord, RecommendParams, SearchParams, WatchHistoryEntry},
    services::filter::FilterSet,
};

/// How far back watch history is considered
pub const HISTORY_WINDOW_DAYS: i64 = 90;
/// Most history entries considered
pub const HISTORY_SAMPLE_SIZE: usize = 50;

const FAVORITE_GENRES: usize = 3;
const FAVORITE_ACTORS: usize = 3;
const GENRE_WEIGHT: f64 = 2.0;
const ACTOR_WEIGHT: f64 = 1.0;

/// Most frequently watched genres and actors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasteProfile {
    pub favorite_genres: Vec<String>,
    pub favorite_actors: Vec<String>,
}

#[derive(Default)]
struct Tally {
    counts: HashMap<String, (usize, usize)>,
}

impl Tally {
    /// `position` is the history index; lower means more recent
    fn add(&mut self, name: &str, position: usize) {
        let entry = self.counts.entry(name.to_string()).or_insert((0, position));
        entry.0 += 1;
    }

    /// Highest counts first, ties broken by recency then name
    fn top(self, n: usize) -> Vec<String> {
        let mut ranked: Vec<(String, (usize, usize))> = self.counts.into_iter().collect();
        ranked.sort_by(|(a_name, (a_count, a_seen)), (b_name, (b_count, b_seen))| {
            b_count
                .cmp(a_count)
                .then(a_seen.cmp(b_seen))
                .then_with(|| a_name.cmp(b_name))
        });
        ranked.into_iter().take(n).map(|(name, _)| name).collect()
    }
}

impl TasteProfile {
    /// Builds a profile from history, most recent entry first
    pub fn from_history(history: &[WatchHistoryEntry], snapshot: &LibrarySnapshot) -> Self {
        let mut genres = Tally::default();
        let mut actors = Tally::default();

        for (position, entry) in history.iter().enumerate() {
            let movie = entry
                .rating_key
                .as_deref()
                .or(entry.plex_key.as_deref())
                .and_then(|key| snapshot.find_by_key(key));

            let entry_genres = match movie {
                Some(movie) if entry.genres.is_empty() => &movie.genres,
                _ => &entry.genres,
            };
            for genre in entry_genres {
                genres.add(genre, position);
            }

            if let Some(movie) = movie {
                for actor in &movie.actors {
                    actors.add(actor, position);
                }
            }
        }

        Self {
            favorite_genres: genres.top(FAVORITE_GENRES),
            favorite_actors: actors.top(FAVORITE_ACTORS),
        }
    }

    pub fn score(&self, movie: &MovieRecord) -> f64 {
        let genre_hits = self
            .favorite_genres
            .iter()
            .filter(|g| movie.has_genre(g))
            .count();
        let actor_hits = self
            .favorite_actors
            .iter()
            .filter(|a| movie.actors.iter().any(|ma| ma == *a))
            .count();

        genre_hits as f64 * GENRE_WEIGHT + actor_hits as f64 * ACTOR_WEIGHT + movie.rating_or_zero()
    }
}

/// Generates watch suggestions biased toward recent viewing habits
///
/// Candidates come from the filter engine (mood and watched state only);
/// they are then ranked by how well they match the taste profile plus their
/// rating.
pub fn get_recommendations(
    snapshot: &LibrarySnapshot,
    history: &[WatchHistoryEntry],
    params: &RecommendParams,
    moods: &MoodMappings,
) -> AppResult<Vec<MovieRecord>> {
    if params.count == 0 {
        return Err(AppError::InvalidInput("count must be at least 1".to_string()));
    }

    let filters = FilterSet::resolve(
        &SearchParams {
            mood: params.mood.clone(),
            unwatched_only: params.unwatched_only,
            limit: params.count,
            ..Default::default()
        },
        moods,
    )?;

    let profile = TasteProfile::from_history(history, snapshot);
    let mut scored: Vec<(f64, &MovieRecord)> = filters
        .apply(&snapshot.movies)
        .into_iter()
        .map(|movie| (profile.score(movie), movie))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .partial_cmp(a_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });

    tracing::debug!(
        history_entries = history.len(),
        favorite_genres = ?profile.favorite_genres,
        favorite_actors = ?profile.favorite_actors,
        candidates = scored.len(),
        "Recommendations scored"
    );

    Ok(scored
        .into_iter()
        .take(params.count)
        .map(|(_, movie)| movie.clone())
        .collect())
}
