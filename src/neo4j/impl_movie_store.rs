//! `MovieStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use std::collections::HashSet;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::MovieStore;
use crate::catalog::query::{MovieListParams, Pagination};
use crate::error::Result;

#[async_trait]
impl MovieStore for Neo4jClient {
    async fn all(&self, params: &MovieListParams, user_id: Option<&str>) -> Result<Vec<Movie>> {
        self.all(params, user_id).await
    }

    async fn get_by_genre(
        &self,
        name: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.get_by_genre(name, params, user_id).await
    }

    async fn get_for_actor(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.get_for_actor(id, params, user_id).await
    }

    async fn get_for_director(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.get_for_director(id, params, user_id).await
    }

    async fn find_by_id(&self, id: &str, user_id: Option<&str>) -> Result<MovieDetails> {
        self.find_by_id(id, user_id).await
    }

    async fn get_similar_movies(
        &self,
        id: &str,
        page: Pagination,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.get_similar_movies(id, page, user_id).await
    }

    async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.list_genres().await
    }

    async fn get_user_favorites(&self, user_id: Option<&str>) -> Result<HashSet<String>> {
        self.get_user_favorites(user_id).await
    }
}
