//! Caller-facing movie repository
//!
//! Resolves the acting user, caps page sizes and rejects blank identifiers,
//! then hands typed parameters to a [`MovieStore`]. Nothing reaches the store
//! until validation has passed.

use super::query::{require_non_empty, MovieListParams, Pagination, DEFAULT_MAX_LIMIT};
use crate::error::Result;
use crate::neo4j::models::*;
use crate::neo4j::traits::MovieStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Movie, genre and favorites queries for one application
#[derive(Clone)]
pub struct MovieRepository {
    store: Arc<dyn MovieStore>,
    default_user_id: Option<String>,
    max_limit: usize,
}

impl MovieRepository {
    /// Create a new repository over a store
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self {
            store,
            default_user_id: None,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// User whose favorites annotate results when a call names no user
    pub fn with_default_user(mut self, user_id: Option<String>) -> Self {
        self.default_user_id = user_id.filter(|u| !u.trim().is_empty());
        self
    }

    /// Largest page a single call may request
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn default_user_id(&self) -> Option<&str> {
        self.default_user_id.as_deref()
    }

    /// Explicit user wins; blank means none; otherwise fall back to the default
    fn resolve_user<'a>(&'a self, user_id: Option<&'a str>) -> Option<&'a str> {
        match user_id.map(str::trim) {
            Some(u) if !u.is_empty() => Some(u),
            _ => self.default_user_id.as_deref(),
        }
    }

    fn prepare(&self, params: MovieListParams) -> Result<MovieListParams> {
        Ok(MovieListParams {
            page: self.window(params.page)?,
            ..params
        })
    }

    /// Cap the limit and make sure the window fits a query parameter
    fn window(&self, page: Pagination) -> Result<Pagination> {
        let page = page.capped(self.max_limit);
        page.bolt_window()?;
        Ok(page)
    }

    // ========================================================================
    // Movie listings
    // ========================================================================

    /// Paginated movies ordered by `params.sort`
    pub async fn all(&self, params: MovieListParams, user_id: Option<&str>) -> Result<Vec<Movie>> {
        let params = self.prepare(params)?;
        self.store.all(&params, self.resolve_user(user_id)).await
    }

    /// Paginated movies in the named genre
    pub async fn get_by_genre(
        &self,
        name: &str,
        params: MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let name = require_non_empty("genre", name)?;
        let params = self.prepare(params)?;
        self.store
            .get_by_genre(name, &params, self.resolve_user(user_id))
            .await
    }

    /// Paginated movies the person acted in
    pub async fn get_for_actor(
        &self,
        id: &str,
        params: MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let id = require_non_empty("id", id)?;
        let params = self.prepare(params)?;
        self.store
            .get_for_actor(id, &params, self.resolve_user(user_id))
            .await
    }

    /// Paginated movies the person directed
    pub async fn get_for_director(
        &self,
        id: &str,
        params: MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let id = require_non_empty("id", id)?;
        let params = self.prepare(params)?;
        self.store
            .get_for_director(id, &params, self.resolve_user(user_id))
            .await
    }

    // ========================================================================
    // Single movie
    // ========================================================================

    /// Movie details; `NotFound` when no movie has this `tmdbId`
    pub async fn find_by_id(&self, id: &str, user_id: Option<&str>) -> Result<MovieDetails> {
        let id = require_non_empty("id", id)?;
        self.store.find_by_id(id, self.resolve_user(user_id)).await
    }

    /// Movies with the most actors, directors and genres in common
    pub async fn get_similar_movies(
        &self,
        id: &str,
        page: Pagination,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let id = require_non_empty("id", id)?;
        let page = self.window(page)?;
        self.store
            .get_similar_movies(id, page, self.resolve_user(user_id))
            .await
    }

    // ========================================================================
    // Genres and favorites
    // ========================================================================

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.store.list_genres().await
    }

    pub async fn get_user_favorites(&self, user_id: Option<&str>) -> Result<HashSet<String>> {
        self.store
            .get_user_favorites(self.resolve_user(user_id))
            .await
    }
}
