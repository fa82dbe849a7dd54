//! In-memory mock implementation of MovieStore for testing.
//!
//! Reproduces the ordering, pagination, favorites and similarity rules of the
//! Cypher queries over `tokio::sync::RwLock<HashMap<K, V>>` collections.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::catalog::query::{MovieListParams, Pagination, SortField, SortOrder};
use crate::error::{CatalogError, Result};
use crate::neo4j::models::*;
use crate::neo4j::traits::MovieStore;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

/// In-memory mock implementation of MovieStore for testing.
#[derive(Default)]
pub struct MockMovieStore {
    // Entity stores
    pub movies: RwLock<HashMap<String, Movie>>,
    pub people: RwLock<HashMap<String, PersonSummary>>,
    pub genres: RwLock<HashSet<String>>,

    // Relationships
    pub movie_genres: RwLock<HashMap<String, Vec<String>>>,
    pub acted_in: RwLock<HashMap<String, Vec<(String, Option<String>)>>>,
    pub directed: RwLock<HashMap<String, Vec<String>>>,
    pub favorites: RwLock<HashMap<String, HashSet<String>>>,
    pub rating_counts: RwLock<HashMap<String, i64>>,

    /// Number of store calls that reached the "database"
    pub queries: AtomicUsize,
}

impl MockMovieStore {
    /// Create a new empty MockMovieStore.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a movie into the store.
    pub async fn with_movie(self, movie: Movie) -> Self {
        self.movies
            .write()
            .await
            .insert(movie.tmdb_id.clone(), movie);
        self
    }

    /// Seed a genre and link it to movies.
    pub async fn with_genre(self, name: &str, movie_ids: &[&str]) -> Self {
        self.genres.write().await.insert(name.to_string());
        {
            let mut links = self.movie_genres.write().await;
            for id in movie_ids {
                links
                    .entry(id.to_string())
                    .or_default()
                    .push(name.to_string());
            }
        }
        self
    }

    /// Seed a person.
    pub async fn with_person(self, tmdb_id: &str, name: &str) -> Self {
        self.people.write().await.insert(
            tmdb_id.to_string(),
            PersonSummary {
                tmdb_id: tmdb_id.to_string(),
                name: Some(name.to_string()),
                poster: None,
            },
        );
        self
    }

    /// Seed an ACTED_IN relationship.
    pub async fn with_actor(self, person_id: &str, movie_id: &str, role: Option<&str>) -> Self {
        self.acted_in
            .write()
            .await
            .entry(person_id.to_string())
            .or_default()
            .push((movie_id.to_string(), role.map(str::to_string)));
        self
    }

    /// Seed a DIRECTED relationship.
    pub async fn with_director(self, person_id: &str, movie_id: &str) -> Self {
        self.directed
            .write()
            .await
            .entry(person_id.to_string())
            .or_default()
            .push(movie_id.to_string());
        self
    }

    /// Seed a HAS_FAVORITE relationship.
    pub async fn with_favorite(self, user_id: &str, movie_id: &str) -> Self {
        self.favorites
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(movie_id.to_string());
        self
    }

    /// Seed the number of incoming RATED relationships for a movie.
    pub async fn with_rating_count(self, movie_id: &str, count: i64) -> Self {
        self.rating_counts
            .write()
            .await
            .insert(movie_id.to_string(), count);
        self
    }

    // ========================================================================
    // Query emulation
    // ========================================================================

    async fn favorites_for(&self, user_id: Option<&str>) -> HashSet<String> {
        match user_id {
            Some(user) => self
                .favorites
                .read()
                .await
                .get(user)
                .cloned()
                .unwrap_or_default(),
            None => HashSet::new(),
        }
    }

    /// Filter by sort property presence, order, paginate and annotate
    async fn listing(
        &self,
        candidates: HashSet<String>,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Vec<Movie> {
        let favorites = self.favorites_for(user_id).await;
        let movies = self.movies.read().await;

        let mut selected: Vec<&Movie> = candidates
            .iter()
            .filter_map(|id| movies.get(id))
            .filter(|m| has_property(m, params.sort))
            .collect();
        selected.sort_by(|a, b| {
            let primary = compare_by(a, b, params.sort);
            let primary = match params.order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then_with(|| a.tmdb_id.cmp(&b.tmdb_id))
        });

        paginate(selected, params.page)
            .map(|m| m.annotated(&favorites))
            .collect()
    }

    async fn movies_for_person(
        &self,
        relation: &RwLock<HashMap<String, Vec<String>>>,
        person_id: &str,
    ) -> HashSet<String> {
        relation
            .read()
            .await
            .get(person_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// First-degree neighbours of a movie, keyed so genres and people never collide
    async fn neighbours(&self, movie_id: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        if let Some(genres) = self.movie_genres.read().await.get(movie_id) {
            out.extend(genres.iter().map(|g| format!("genre:{}", g)));
        }
        for (person, credits) in self.acted_in.read().await.iter() {
            if credits.iter().any(|(m, _)| m == movie_id) {
                out.insert(format!("person:{}", person));
            }
        }
        for (person, movies) in self.directed.read().await.iter() {
            if movies.iter().any(|m| m == movie_id) {
                out.insert(format!("person:{}", person));
            }
        }
        out
    }
}

fn has_property(movie: &Movie, field: SortField) -> bool {
    match field {
        SortField::Title => movie.title.is_some(),
        SortField::Released => movie.released.is_some(),
        SortField::ImdbRating => movie.imdb_rating.is_some(),
        SortField::Year => movie.year.is_some(),
        SortField::Runtime => movie.runtime.is_some(),
    }
}

fn compare_by(a: &Movie, b: &Movie, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Released => a.released.cmp(&b.released),
        SortField::ImdbRating => a
            .imdb_rating
            .partial_cmp(&b.imdb_rating)
            .unwrap_or(Ordering::Equal),
        SortField::Year => a.year.cmp(&b.year),
        SortField::Runtime => a.runtime.cmp(&b.runtime),
    }
}

fn paginate<T>(items: Vec<T>, page: Pagination) -> impl Iterator<Item = T> {
    items.into_iter().skip(page.skip).take(page.limit)
}

#[async_trait]
impl MovieStore for MockMovieStore {
    async fn all(&self, params: &MovieListParams, user_id: Option<&str>) -> Result<Vec<Movie>> {
        self.record_query();
        let ids = self.movies.read().await.keys().cloned().collect();
        Ok(self.listing(ids, params, user_id).await)
    }

    async fn get_by_genre(
        &self,
        name: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.record_query();
        let ids = self
            .movie_genres
            .read()
            .await
            .iter()
            .filter(|(_, genres)| genres.iter().any(|g| g == name))
            .map(|(id, _)| id.clone())
            .collect();
        Ok(self.listing(ids, params, user_id).await)
    }

    async fn get_for_actor(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.record_query();
        let ids = self
            .acted_in
            .read()
            .await
            .get(id)
            .map(|credits| credits.iter().map(|(m, _)| m.clone()).collect())
            .unwrap_or_default();
        Ok(self.listing(ids, params, user_id).await)
    }

    async fn get_for_director(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.record_query();
        let ids = self.movies_for_person(&self.directed, id).await;
        Ok(self.listing(ids, params, user_id).await)
    }

    async fn find_by_id(&self, id: &str, user_id: Option<&str>) -> Result<MovieDetails> {
        self.record_query();
        let favorites = self.favorites_for(user_id).await;
        let movie = self
            .movies
            .read()
            .await
            .get(id)
            .map(|m| m.annotated(&favorites))
            .ok_or_else(|| CatalogError::not_found("Movie", id))?;

        let people = self.people.read().await;
        let summary = |person_id: &str| {
            people.get(person_id).cloned().unwrap_or(PersonSummary {
                tmdb_id: person_id.to_string(),
                name: None,
                poster: None,
            })
        };

        let mut actors: Vec<CastMember> = self
            .acted_in
            .read()
            .await
            .iter()
            .flat_map(|(person, credits)| {
                credits
                    .iter()
                    .filter(|(m, _)| m == id)
                    .map(|(_, role)| CastMember {
                        person: summary(person),
                        role: role.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        actors.sort_by(|a, b| a.person.tmdb_id.cmp(&b.person.tmdb_id));

        let mut directors: Vec<PersonSummary> = self
            .directed
            .read()
            .await
            .iter()
            .filter(|(_, movies)| movies.iter().any(|m| m == id))
            .map(|(person, _)| summary(person))
            .collect();
        directors.sort_by(|a, b| a.tmdb_id.cmp(&b.tmdb_id));

        let genres = self
            .movie_genres
            .read()
            .await
            .get(id)
            .map(|names| {
                names
                    .iter()
                    .map(|name| GenreName { name: name.clone() })
                    .collect()
            })
            .unwrap_or_default();

        let rating_count = self
            .rating_counts
            .read()
            .await
            .get(id)
            .copied()
            .unwrap_or(0);

        Ok(MovieDetails {
            movie,
            actors,
            directors,
            genres,
            rating_count,
        })
    }

    async fn get_similar_movies(
        &self,
        id: &str,
        page: Pagination,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.record_query();
        let favorites = self.favorites_for(user_id).await;
        if !self.movies.read().await.contains_key(id) {
            return Ok(Vec::new());
        }
        let source = self.neighbours(id).await;

        let candidates: Vec<Movie> = self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.tmdb_id != id && m.imdb_rating.is_some())
            .cloned()
            .collect();

        let mut scored = Vec::new();
        for movie in candidates {
            let in_common = self
                .neighbours(&movie.tmdb_id)
                .await
                .intersection(&source)
                .count();
            if in_common > 0 {
                scored.push((in_common, movie));
            }
        }
        scored.sort_by(|(ca, a), (cb, b)| {
            cb.cmp(ca)
                .then_with(|| {
                    b.imdb_rating
                        .partial_cmp(&a.imdb_rating)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.tmdb_id.cmp(&b.tmdb_id))
        });

        Ok(paginate(scored, page)
            .map(|(_, m)| m.annotated(&favorites))
            .collect())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.record_query();
        let movies = self.movies.read().await;
        let links = self.movie_genres.read().await;

        let mut genres: Vec<Genre> = self
            .genres
            .read()
            .await
            .iter()
            .filter(|name| name.as_str() != NO_GENRES_SENTINEL)
            .map(|name| {
                let members: Vec<&Movie> = links
                    .iter()
                    .filter(|(_, genres)| genres.contains(name))
                    .filter_map(|(id, _)| movies.get(id))
                    .collect();
                let poster = members
                    .iter()
                    .filter(|m| m.imdb_rating.is_some() && m.poster.is_some())
                    .max_by(|a, b| {
                        a.imdb_rating
                            .partial_cmp(&b.imdb_rating)
                            .unwrap_or(Ordering::Equal)
                    })
                    .and_then(|m| m.poster.clone());
                Genre {
                    name: name.clone(),
                    movies: members.len() as i64,
                    poster,
                }
            })
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_user_favorites(&self, user_id: Option<&str>) -> Result<HashSet<String>> {
        if user_id.is_some() {
            self.record_query();
        }
        Ok(self.favorites_for(user_id).await)
    }
}
