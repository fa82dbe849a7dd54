//! MovieStore trait definition
//!
//! Defines the read-only data-access contract for the movie graph.
//! `Neo4jClient` implements it against a live database; tests use the
//! in-memory mock.

use crate::catalog::query::{MovieListParams, Pagination};
use crate::error::Result;
use crate::neo4j::models::*;
use async_trait::async_trait;
use std::collections::HashSet;

/// Read operations over movies, genres and people.
///
/// Inputs are already validated: sort and order are closed enums and
/// pagination values are non-negative. Every method runs inside a single read
/// transaction, and `user_id` of `None` means "no favorites".
#[async_trait]
pub trait MovieStore: Send + Sync {
    // ========================================================================
    // Movie listings
    // ========================================================================

    /// Movies that have the sort property, ordered and paginated
    async fn all(&self, params: &MovieListParams, user_id: Option<&str>) -> Result<Vec<Movie>>;

    /// Movies in the named genre
    async fn get_by_genre(
        &self,
        name: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>>;

    /// Movies the person acted in
    async fn get_for_actor(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>>;

    /// Movies the person directed
    async fn get_for_director(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>>;

    // ========================================================================
    // Single movie
    // ========================================================================

    /// A movie with cast, directors, genres and rating count
    async fn find_by_id(&self, id: &str, user_id: Option<&str>) -> Result<MovieDetails>;

    /// Movies sharing the most actors, directors and genres with `id`
    async fn get_similar_movies(
        &self,
        id: &str,
        page: Pagination,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>>;

    // ========================================================================
    // Genres and favorites
    // ========================================================================

    /// All genres except the sentinel, by name
    async fn list_genres(&self) -> Result<Vec<Genre>>;

    /// `tmdbId`s of the user's favorite movies (empty without a user)
    async fn get_user_favorites(&self, user_id: Option<&str>) -> Result<HashSet<String>>;
}
