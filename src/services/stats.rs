use std::collections::BTreeSet;

use crate::models::{LibraryStats, LibrarySnapshot};

/// Aggregate counts for /library-stats
pub fn library_stats(snapshot: &LibrarySnapshot) -> LibraryStats {
    let decades: BTreeSet<String> = snapshot.movies.iter().filter_map(|m| m.decade()).collect();

    LibraryStats {
        total_movies: snapshot.movies.len(),
        unwatched_movies: snapshot.movies.iter().filter(|m| !m.watched).count(),
        genres: snapshot.genres.clone(),
        decades_available: decades.into_iter().collect(),
        last_updated: snapshot.last_refresh,
    }
}
