use rand::{seq::SliceRandom, Rng};

use crate::{
    error::{AppError, AppResult},
    models::{LibrarySnapshot, MoodMappings, MoodRule, MovieRecord, SearchParams, SortOrder},
};

/// Selection weight for movies without a usable rating
const UNRATED_WEIGHT: f64 = 5.0;

/// Fully resolved predicate set; every populated field must hold for a match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub genre: Option<String>,
    pub mood: Option<MoodRule>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub rating_min: Option<f64>,
    /// Lowercased
    pub actor: Option<String>,
    /// Lowercased
    pub director: Option<String>,
    pub unwatched_only: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Expands a decade shortcut such as "1990s" into an inclusive year range
pub fn parse_decade(decade: &str) -> AppResult<(i32, i32)> {
    let trimmed = decade.trim();
    let digits = trimmed
        .strip_suffix('s')
        .or_else(|| trimmed.strip_suffix('S'))
        .unwrap_or(trimmed);

    let start = Some(digits)
        .filter(|d| d.len() == 4 && d.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|d| d.parse::<i32>().ok())
        .filter(|year| year % 10 == 0)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Invalid decade '{}': expected a form like 1990s",
                decade
            ))
        })?;

    Ok((start, start + 9))
}

impl FilterSet {
    /// Validates search parameters and expands mood and decade shortcuts
    pub fn resolve(params: &SearchParams, moods: &MoodMappings) -> AppResult<Self> {
        if params.limit == 0 {
            return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
        }
        if let (Some(start), Some(end)) = (params.year_start, params.year_end) {
            if start > end {
                return Err(AppError::InvalidInput(format!(
                    "year_start ({}) is after year_end ({})",
                    start, end
                )));
            }
        }
        if let (Some(min), Some(max)) = (params.runtime_min, params.runtime_max) {
            if min > max {
                return Err(AppError::InvalidInput(format!(
                    "runtime_min ({}) exceeds runtime_max ({})",
                    min, max
                )));
            }
        }
        if params.rating_min.is_some_and(|r| !r.is_finite()) {
            return Err(AppError::InvalidInput("rating_min must be a number".to_string()));
        }

        let mood = non_empty(&params.mood)
            .map(|name| moods.resolve(name).cloned())
            .transpose()?;

        let (mut year_start, mut year_end) = (params.year_start, params.year_end);
        if let Some(decade) = non_empty(&params.decade) {
            let (start, end) = parse_decade(decade)?;
            year_start = Some(year_start.map_or(start, |s| s.max(start)));
            year_end = Some(year_end.map_or(end, |e| e.min(end)));
        }

        Ok(Self {
            genre: non_empty(&params.genre).map(str::to_string),
            mood,
            year_start,
            year_end,
            runtime_min: params.runtime_min,
            runtime_max: params.runtime_max,
            rating_min: params.rating_min,
            actor: non_empty(&params.actor).map(str::to_lowercase),
            director: non_empty(&params.director).map(str::to_lowercase),
            unwatched_only: params.unwatched_only,
        })
    }

    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if self.unwatched_only && movie.watched {
            return false;
        }

        if let Some(genre) = &self.genre {
            if !movie.has_genre(genre) {
                return false;
            }
        }

        if let Some(mood) = &self.mood {
            if !mood_admits(mood, movie) {
                return false;
            }
        }

        if self.year_start.is_some() || self.year_end.is_some() {
            let Some(year) = movie.year else {
                return false;
            };
            if self.year_start.is_some_and(|start| year < start)
                || self.year_end.is_some_and(|end| year > end)
            {
                return false;
            }
        }

        if self.runtime_min.is_some_and(|min| movie.runtime < min)
            || self.runtime_max.is_some_and(|max| movie.runtime > max)
        {
            return false;
        }

        if self.rating_min.is_some_and(|min| movie.rating_or_zero() < min) {
            return false;
        }

        if let Some(actor) = &self.actor {
            if !contains_name(&movie.actors, actor) {
                return false;
            }
        }

        if let Some(director) = &self.director {
            if !contains_name(&movie.directors, director) {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, movies: &'a [MovieRecord]) -> Vec<&'a MovieRecord> {
        movies.iter().filter(|m| self.matches(m)).collect()
    }
}

fn contains_name(names: &[String], needle_lower: &str) -> bool {
    names
        .iter()
        .any(|name| name.to_lowercase().contains(needle_lower))
}

/// Mood genres need one hit; excluded genres must all miss
fn mood_admits(rule: &MoodRule, movie: &MovieRecord) -> bool {
    if !rule.genres.is_empty() && !rule.genres.iter().any(|g| movie.has_genre(g)) {
        return false;
    }
    if rule.exclude_genres.iter().any(|g| movie.has_genre(g)) {
        return false;
    }
    if rule.rating_min.is_some_and(|min| movie.rating_or_zero() < min) {
        return false;
    }
    if rule.runtime_max.is_some_and(|max| movie.runtime > max) {
        return false;
    }
    true
}

/// Orders `matches` and keeps at most `limit` of them
pub fn rank<R: Rng + ?Sized>(
    mut matches: Vec<&MovieRecord>,
    order: SortOrder,
    limit: usize,
    rng: &mut R,
) -> Vec<MovieRecord> {
    match order {
        SortOrder::Random => return weighted_sample(&matches, limit, rng),
        SortOrder::Rating => {
            matches.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()))
        }
        SortOrder::Recent => matches.sort_by(|a, b| b.added_at.cmp(&a.added_at)),
        // Undated movies go last
        SortOrder::Oldest => matches.sort_by_key(|m| m.year.unwrap_or(i32::MAX)),
    }

    matches.into_iter().take(limit).cloned().collect()
}

/// Random selection without replacement, weighted by rating
fn weighted_sample<R: Rng + ?Sized>(
    pool: &[&MovieRecord],
    limit: usize,
    rng: &mut R,
) -> Vec<MovieRecord> {
    if pool.is_empty() {
        return Vec::new();
    }

    let weight = |m: &&MovieRecord| m.rating.filter(|r| *r > 0.0).unwrap_or(UNRATED_WEIGHT);

    match pool.choose_multiple_weighted(rng, limit, weight) {
        Ok(selected) => selected.map(|m| MovieRecord::clone(m)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Weighted selection failed, falling back to shuffle");
            let mut shuffled = pool.to_vec();
            shuffled.shuffle(rng);
            shuffled.into_iter().take(limit).cloned().collect()
        }
    }
}

/// Runs a /search query against the snapshot
pub fn search<R: Rng + ?Sized>(
    snapshot: &LibrarySnapshot,
    params: &SearchParams,
    moods: &MoodMappings,
    rng: &mut R,
) -> AppResult<Vec<MovieRecord>> {
    let filters = FilterSet::resolve(params, moods)?;
    let matches = filters.apply(&snapshot.movies);

    tracing::debug!(
        library_size = snapshot.movies.len(),
        matched = matches.len(),
        sort = ?params.sort,
        limit = params.limit,
        "Filter applied"
    );

    Ok(rank(matches, params.sort, params.limit, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn moods() -> MoodMappings {
        MoodMappings::from_yaml(
            r#"
mood_mappings:
  uplifting:
    genres: [Comedy, Family, Animation]
    exclude_genres: [Horror]
    rating_min: 6.5
  quick:
    runtime_max: 95
"#,
        )
        .unwrap()
    }

    fn run(params: SearchParams) -> AppResult<Vec<MovieRecord>> {
        let mut rng = StdRng::seed_from_u64(7);
        search(&fixtures::snapshot(), &params, &moods(), &mut rng)
    }

    fn titles(movies: &[MovieRecord]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    fn title_set(movies: &[MovieRecord]) -> HashSet<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    fn all() -> SearchParams {
        SearchParams {
            limit: 100,
            sort: SortOrder::Rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_genre_with_limit() {
        let results = run(SearchParams {
            genre: Some("Comedy".to_string()),
            limit: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.has_genre("Comedy") && !m.watched));
    }

    #[test]
    fn test_genre_is_case_insensitive() {
        let results = run(SearchParams {
            genre: Some("horror".to_string()),
            ..all()
        })
        .unwrap();

        assert_eq!(title_set(&results), HashSet::from(["The Shining", "Zombieland"]));
    }

    #[test]
    fn test_blank_parameters_are_ignored() {
        let results = run(SearchParams {
            genre: Some("  ".to_string()),
            mood: Some(String::new()),
            decade: Some(String::new()),
            ..all()
        })
        .unwrap();

        assert_eq!(results.len(), 7);
    }

    #[test]
    fn test_unwatched_only_default_excludes_watched() {
        let results = run(all()).unwrap();
        assert!(results.iter().all(|m| !m.watched));
        assert!(!title_set(&results).contains("Toy Story"));

        let everything = run(SearchParams {
            unwatched_only: false,
            ..all()
        })
        .unwrap();
        assert_eq!(everything.len(), fixtures::library().len());
    }

    #[test]
    fn test_decade_matches_explicit_year_range() {
        let by_decade = run(SearchParams {
            decade: Some("1990s".to_string()),
            unwatched_only: false,
            ..all()
        })
        .unwrap();
        let by_range = run(SearchParams {
            year_start: Some(1990),
            year_end: Some(1999),
            unwatched_only: false,
            ..all()
        })
        .unwrap();

        assert_eq!(titles(&by_decade), titles(&by_range));
        assert_eq!(
            title_set(&by_decade),
            HashSet::from(["Groundhog Day", "The Big Lebowski", "Heat", "Toy Story"])
        );
    }

    #[test]
    fn test_decade_intersects_year_range() {
        let results = run(SearchParams {
            decade: Some("1990s".to_string()),
            year_start: Some(1995),
            unwatched_only: false,
            ..all()
        })
        .unwrap();

        assert_eq!(
            title_set(&results),
            HashSet::from(["The Big Lebowski", "Heat", "Toy Story"])
        );
    }

    #[test]
    fn test_parse_decade() {
        assert_eq!(parse_decade("1990s").unwrap(), (1990, 1999));
        assert_eq!(parse_decade("2000").unwrap(), (2000, 2009));
        assert_eq!(parse_decade(" 1980S ").unwrap(), (1980, 1989));

        for bad in ["90s", "1995s", "nineties", "+990s", "19900s"] {
            assert!(
                matches!(parse_decade(bad), Err(AppError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_decade_is_rejected() {
        let err = run(SearchParams {
            decade: Some("the nineties".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_mood_restricts_to_mapped_genres() {
        let results = run(SearchParams {
            mood: Some("uplifting".to_string()),
            ..all()
        })
        .unwrap();

        let mapped = ["Comedy", "Family", "Animation"];
        assert!(!results.is_empty());
        for movie in &results {
            assert!(mapped.iter().any(|g| movie.has_genre(g)), "{}", movie.title);
            assert!(!movie.has_genre("Horror"));
            assert!(movie.rating_or_zero() >= 6.5);
        }
        assert_eq!(
            title_set(&results),
            HashSet::from(["Groundhog Day", "Paddington 2"])
        );
    }

    #[test]
    fn test_mood_runtime_ceiling() {
        let results = run(SearchParams {
            mood: Some("quick".to_string()),
            ..all()
        })
        .unwrap();

        assert!(results.iter().all(|m| m.runtime <= 95));
        assert_eq!(
            title_set(&results),
            HashSet::from(["Zombieland", "Unrated Oddity"])
        );
    }

    #[test]
    fn test_mood_and_genre_compose() {
        let results = run(SearchParams {
            mood: Some("Uplifting".to_string()),
            genre: Some("Romance".to_string()),
            ..all()
        })
        .unwrap();

        assert_eq!(titles(&results), vec!["Groundhog Day"]);
    }

    #[test]
    fn test_unknown_mood_is_rejected() {
        let err = run(SearchParams {
            mood: Some("melancholy".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_actor_substring_case_insensitive() {
        let results = run(SearchParams {
            actor: Some("MURRAY".to_string()),
            ..all()
        })
        .unwrap();
        assert_eq!(titles(&results), vec!["Groundhog Day"]);
    }

    #[test]
    fn test_director_substring() {
        let results = run(SearchParams {
            director: Some("coen".to_string()),
            unwatched_only: false,
            ..all()
        })
        .unwrap();
        assert_eq!(titles(&results), vec!["The Big Lebowski"]);
    }

    #[test]
    fn test_runtime_range_inclusive() {
        let results = run(SearchParams {
            runtime_min: Some(95),
            runtime_max: Some(103),
            ..all()
        })
        .unwrap();

        assert_eq!(
            title_set(&results),
            HashSet::from(["Groundhog Day", "Paddington 2", "Unrated Oddity"])
        );
    }

    #[test]
    fn test_rating_floor_and_rating_sort() {
        let results = run(SearchParams {
            rating_min: Some(8.3),
            ..all()
        })
        .unwrap();

        assert_eq!(titles(&results), vec!["Paddington 2", "The Shining", "Heat"]);
    }

    #[test]
    fn test_sort_recent() {
        let results = run(SearchParams {
            sort: SortOrder::Recent,
            limit: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(titles(&results), vec!["Paddington 2", "Gigli", "Zombieland"]);
    }

    #[test]
    fn test_sort_oldest_puts_undated_last() {
        let results = run(SearchParams {
            sort: SortOrder::Oldest,
            limit: 10,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            titles(&results),
            vec![
                "The Shining",
                "Groundhog Day",
                "Heat",
                "Gigli",
                "Zombieland",
                "Paddington 2",
                "Unrated Oddity"
            ]
        );
    }

    #[test]
    fn test_random_sort_returns_distinct_matches() {
        let results = run(SearchParams {
            genre: Some("Comedy".to_string()),
            limit: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(title_set(&results).len(), 3);
        assert!(results.iter().all(|m| m.has_genre("Comedy") && !m.watched));
    }

    #[test]
    fn test_random_sort_limit_exceeds_pool() {
        let results = run(SearchParams {
            genre: Some("Horror".to_string()),
            limit: 10,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            title_set(&results),
            HashSet::from(["The Shining", "Zombieland"])
        );
    }

    #[test]
    fn test_random_sort_empty_pool() {
        let results = run(SearchParams {
            genre: Some("Western".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_random_sort_is_seed_deterministic() {
        let snapshot = fixtures::snapshot();
        let params = SearchParams {
            limit: 4,
            ..Default::default()
        };

        let first = search(&snapshot, &params, &moods(), &mut StdRng::seed_from_u64(42)).unwrap();
        let second = search(&snapshot, &params, &moods(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(titles(&first), titles(&second));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            SearchParams {
                limit: 0,
                ..Default::default()
            },
            SearchParams {
                year_start: Some(2000),
                year_end: Some(1990),
                ..Default::default()
            },
            SearchParams {
                runtime_min: Some(120),
                runtime_max: Some(90),
                ..Default::default()
            },
            SearchParams {
                rating_min: Some(f64::NAN),
                ..Default::default()
            },
        ];

        for params in cases {
            assert!(matches!(run(params), Err(AppError::InvalidInput(_))));
        }
    }

    fn has_genre_ci(movie: &MovieRecord, genre: &str) -> bool {
        movie.genres.iter().any(|mg| mg.to_lowercase() == genre.to_lowercase())
    }

    fn names_contain(names: &[String], needle: &str) -> bool {
        names
            .iter()
            .any(|n| n.to_lowercase().contains(&needle.to_lowercase()))
    }

    /// Independent restatement of each predicate
    fn satisfies(params: &SearchParams, moods: &MoodMappings, movie: &MovieRecord) -> bool {
        let genre_ok = params.genre.as_ref().map_or(true, |g| has_genre_ci(movie, g));
        let year = movie.year;
        let start_ok = params
            .year_start
            .map_or(true, |s| year.is_some_and(|y| y >= s));
        let end_ok = params.year_end.map_or(true, |e| year.is_some_and(|y| y <= e));
        let decade_ok = params.decade.as_ref().map_or(true, |d| {
            let start: i32 = d[..4].parse().unwrap();
            year.is_some_and(|y| (start..=start + 9).contains(&y))
        });
        let runtime_ok = params.runtime_min.map_or(true, |m| movie.runtime >= m)
            && params.runtime_max.map_or(true, |m| movie.runtime <= m);
        let rating = movie.rating.unwrap_or(0.0);
        let rating_ok = params.rating_min.map_or(true, |r| rating >= r);
        let actor_ok = params
            .actor
            .as_ref()
            .map_or(true, |a| names_contain(&movie.actors, a));
        let director_ok = params
            .director
            .as_ref()
            .map_or(true, |d| names_contain(&movie.directors, d));
        let mood_ok = params.mood.as_ref().map_or(true, |name| {
            let rule = moods.resolve(name).unwrap();
            (rule.genres.is_empty() || rule.genres.iter().any(|g| has_genre_ci(movie, g)))
                && !rule.exclude_genres.iter().any(|g| has_genre_ci(movie, g))
                && rule.rating_min.map_or(true, |min| rating >= min)
                && rule.runtime_max.map_or(true, |max| movie.runtime <= max)
        });
        let watched_ok = !params.unwatched_only || !movie.watched;

        genre_ok
            && start_ok
            && end_ok
            && decade_ok
            && runtime_ok
            && rating_ok
            && actor_ok
            && director_ok
            && mood_ok
            && watched_ok
    }

    #[test]
    fn test_every_result_satisfies_every_predicate() {
        let genres = [None, Some("Comedy"), Some("Drama"), Some("Crime")];
        let year_ranges = [(None, None), (Some(1990), None), (None, Some(2000)), (Some(1995), Some(2010))];
        let runtimes = [(None, None), (Some(90), None), (None, Some(120)), (Some(100), Some(150))];
        let ratings = [None, Some(6.0), Some(8.2)];
        let actors = [None, Some("an"), Some("pacino")];
        let directors = [None, Some("coen"), Some("MANN")];
        let decades = [None, Some("1990s"), Some("2000")];
        let mood_names = [None, Some("uplifting"), Some("quick")];
        let sorts = [SortOrder::Random, SortOrder::Rating, SortOrder::Recent, SortOrder::Oldest];

        let mut names = Vec::new();
        for actor in actors {
            for director in directors {
                for decade in decades {
                    for mood in mood_names {
                        names.push((actor, director, decade, mood));
                    }
                }
            }
        }

        let snapshot = fixtures::snapshot();
        let moods = moods();
        let mut rng = StdRng::seed_from_u64(1);
        let mut checked = 0;
        let mut non_empty = 0;

        for genre in genres {
            for (year_start, year_end) in year_ranges {
                for (runtime_min, runtime_max) in runtimes {
                    for rating_min in ratings {
                        for &(actor, director, decade, mood) in &names {
                            for (i, unwatched_only) in [true, false].into_iter().enumerate() {
                                let params = SearchParams {
                                    genre: genre.map(str::to_string),
                                    mood: mood.map(str::to_string),
                                    year_start,
                                    year_end,
                                    decade: decade.map(str::to_string),
                                    runtime_min,
                                    runtime_max,
                                    rating_min,
                                    actor: actor.map(str::to_string),
                                    director: director.map(str::to_string),
                                    unwatched_only,
                                    limit: 3 + i,
                                    sort: sorts[checked % sorts.len()],
                                };

                                let results = search(&snapshot, &params, &moods, &mut rng).unwrap();
                                assert!(results.len() <= params.limit);
                                for movie in &results {
                                    assert!(
                                        satisfies(&params, &moods, movie),
                                        "{} violates {:?}",
                                        movie.title,
                                        params
                                    );
                                }
                                if !results.is_empty() {
                                    non_empty += 1;
                                }
                                checked += 1;
                            }
                        }
                    }
                }
            }
        }

        assert!(non_empty > 0);
        assert!(checked > non_empty);
    }

    #[test]
    fn test_director_decade_and_mood_combined() {
        let crime_nineties = run(SearchParams {
            director: Some("coen".to_string()),
            decade: Some("1990s".to_string()),
            unwatched_only: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(titles(&crime_nineties), vec!["The Big Lebowski"]);

        let quick_uplifting = run(SearchParams {
            mood: Some("quick".to_string()),
            genre: Some("family".to_string()),
            unwatched_only: false,
            sort: SortOrder::Rating,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(titles(&quick_uplifting), vec!["Toy Story"]);
    }
}
