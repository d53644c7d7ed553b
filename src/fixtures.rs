//! Movie records for unit tests.

use chrono::{DateTime, Utc};

use crate::models::{ClientDevice, LibrarySnapshot, MovieRecord, WatchHistoryEntry};

pub fn movie(title: &str) -> MovieRecord {
    let key = title.to_lowercase().replace(' ', "-");
    MovieRecord {
        title: title.to_string(),
        year: None,
        summary: None,
        rating: None,
        genres: Vec::new(),
        runtime: 0,
        directors: Vec::new(),
        actors: Vec::new(),
        content_rating: None,
        watched: false,
        view_count: 0,
        last_viewed_at: None,
        added_at: None,
        plex_key: format!("/library/metadata/{}", key),
        rating_key: key,
        guid: None,
    }
}

pub trait MovieExt {
    fn year(self, year: i32) -> Self;
    fn genres(self, genres: &[&str]) -> Self;
    fn rating(self, rating: f64) -> Self;
    fn runtime(self, minutes: u32) -> Self;
    fn actors(self, actors: &[&str]) -> Self;
    fn director(self, director: &str) -> Self;
    fn watched(self) -> Self;
    fn added(self, timestamp: i64) -> Self;
}

impl MovieExt for MovieRecord {
    fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    fn genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    fn rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    fn runtime(mut self, minutes: u32) -> Self {
        self.runtime = minutes;
        self
    }

    fn actors(mut self, actors: &[&str]) -> Self {
        self.actors = actors.iter().map(|a| a.to_string()).collect();
        self
    }

    fn director(mut self, director: &str) -> Self {
        self.directors = vec![director.to_string()];
        self
    }

    fn watched(mut self) -> Self {
        self.watched = true;
        self.view_count = 1;
        self
    }

    fn added(mut self, timestamp: i64) -> Self {
        self.added_at = DateTime::from_timestamp(timestamp, 0);
        self
    }
}

/// A small library covering every filter dimension
pub fn library() -> Vec<MovieRecord> {
    vec![
        movie("Groundhog Day")
            .year(1993)
            .genres(&["Comedy", "Romance"])
            .rating(8.0)
            .runtime(101)
            .actors(&["Bill Murray", "Andie MacDowell"])
            .director("Harold Ramis")
            .added(1_600_000_100),
        movie("The Big Lebowski")
            .year(1998)
            .genres(&["Comedy", "Crime"])
            .rating(8.1)
            .runtime(117)
            .actors(&["Jeff Bridges", "John Goodman"])
            .director("Joel Coen")
            .added(1_600_000_200)
            .watched(),
        movie("Paddington 2")
            .year(2017)
            .genres(&["Comedy", "Family", "Adventure"])
            .rating(8.9)
            .runtime(103)
            .actors(&["Ben Whishaw", "Hugh Grant"])
            .director("Paul King")
            .added(1_600_000_900),
        movie("The Shining")
            .year(1980)
            .genres(&["Horror", "Drama"])
            .rating(8.4)
            .runtime(146)
            .actors(&["Jack Nicholson", "Shelley Duvall"])
            .director("Stanley Kubrick")
            .added(1_600_000_050),
        movie("Zombieland")
            .year(2009)
            .genres(&["Comedy", "Horror"])
            .rating(7.6)
            .runtime(88)
            .actors(&["Woody Harrelson", "Emma Stone"])
            .director("Ruben Fleischer")
            .added(1_600_000_400),
        movie("Heat")
            .year(1995)
            .genres(&["Action", "Crime", "Drama"])
            .rating(8.3)
            .runtime(170)
            .actors(&["Al Pacino", "Robert De Niro"])
            .director("Michael Mann")
            .added(1_600_000_300),
        movie("Toy Story")
            .year(1995)
            .genres(&["Animation", "Family", "Comedy"])
            .rating(8.3)
            .runtime(81)
            .actors(&["Tom Hanks", "Tim Allen"])
            .director("John Lasseter")
            .added(1_600_000_500)
            .watched(),
        movie("Gigli")
            .year(2003)
            .genres(&["Comedy", "Romance", "Crime"])
            .rating(2.6)
            .runtime(121)
            .actors(&["Ben Affleck", "Jennifer Lopez"])
            .director("Martin Brest")
            .added(1_600_000_600),
        movie("Unrated Oddity").genres(&["Comedy"]).runtime(95),
    ]
}

pub fn snapshot() -> LibrarySnapshot {
    LibrarySnapshot::new(library(), Utc::now())
}

pub fn history_entry(movie: &MovieRecord, days_ago: i64) -> WatchHistoryEntry {
    WatchHistoryEntry {
        title: movie.title.clone(),
        watched_at: Utc::now() - chrono::Duration::days(days_ago),
        plex_key: Some(movie.plex_key.clone()),
        rating_key: Some(movie.rating_key.clone()),
        media_type: "movie".to_string(),
        genres: Vec::new(),
        rating: None,
    }
}

pub fn client(name: &str) -> ClientDevice {
    ClientDevice {
        name: name.to_string(),
        product: Some("Plex for Android (TV)".to_string()),
        device: Some("stb".to_string()),
        machine_identifier: format!("{}-id", name.to_lowercase().replace(' ', "-")),
        address: Some("192.168.1.50".to_string()),
        port: Some(32500),
        protocol: Some("plex".to_string()),
    }
}
