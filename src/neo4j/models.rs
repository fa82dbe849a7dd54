//! Records projected from the movie graph

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Genre name that marks movies without any genre. Never listed.
pub const NO_GENRES_SENTINEL: &str = "(no genres listed)";

// ============================================================================
// Movie
// ============================================================================

/// A `:Movie` node plus the caller-specific `favorite` flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub tmdb_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Release date as stored, e.g. "1990-09-19"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Node properties without a named field, passed through as stored
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub favorite: bool,
}

impl Movie {
    pub fn new(tmdb_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tmdb_id: tmdb_id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Copy of this movie with `favorite` set from the caller's favorites
    pub fn annotated(&self, favorites: &HashSet<String>) -> Self {
        Self {
            favorite: favorites.contains(&self.tmdb_id),
            ..self.clone()
        }
    }
}

// ============================================================================
// People
// ============================================================================

/// Actor or director as it appears inside a movie's details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub tmdb_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// An actor credit on a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    #[serde(flatten)]
    pub person: PersonSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

// ============================================================================
// Movie details
// ============================================================================

/// A movie with its cast, directors, genres and rating count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub actors: Vec<CastMember>,
    pub directors: Vec<PersonSummary>,
    pub genres: Vec<GenreName>,
    /// Number of incoming `:RATED` relationships
    pub rating_count: i64,
}

/// Genre reference inside movie details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreName {
    pub name: String,
}

// ============================================================================
// Genre
// ============================================================================

/// A genre with its movie count and a representative poster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    /// Number of movies in the genre
    pub movies: i64,
    /// Poster of the highest-rated member movie that has one
    #[serde(default)]
    pub poster: Option<String>,
}
