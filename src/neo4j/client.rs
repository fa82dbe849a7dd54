//! Neo4j client for the movie graph
//!
//! Every public method opens one read transaction, runs the favorites lookup
//! and the data query inside it, then commits. Any failure rolls the
//! transaction back before the error is returned.

use super::models::*;
use crate::catalog::query::{MovieListParams, Pagination, SortField, SortOrder};
use crate::error::{CatalogError, Result};
use anyhow::Context;
use neo4rs::{query, Graph, Query, Row, Txn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Which relationship a movie listing starts from
#[derive(Debug, Clone, Copy)]
enum Listing<'a> {
    All,
    Genre(&'a str),
    Actor(&'a str),
    Director(&'a str),
}

impl<'a> Listing<'a> {
    fn operation(&self) -> &'static str {
        match self {
            Listing::All => "all",
            Listing::Genre(_) => "get_by_genre",
            Listing::Actor(_) => "get_for_actor",
            Listing::Director(_) => "get_for_director",
        }
    }

    fn match_clause(&self) -> &'static str {
        match self {
            Listing::All => "MATCH (m:Movie)",
            Listing::Genre(_) => "MATCH (m:Movie)-[:IN_GENRE]->(:Genre {name: $name})",
            Listing::Actor(_) => "MATCH (:Person {tmdbId: $id})-[:ACTED_IN]->(m:Movie)",
            Listing::Director(_) => "MATCH (:Person {tmdbId: $id})-[:DIRECTED]->(m:Movie)",
        }
    }

    fn bind(&self, q: Query) -> Query {
        match self {
            Listing::All => q,
            Listing::Genre(name) => q.param("name", *name),
            Listing::Actor(id) | Listing::Director(id) => q.param("id", *id),
        }
    }
}

/// Build the Cypher text for a movie listing.
///
/// Only static fragments are interpolated: the match clause comes from
/// [`Listing`] and the sort property and direction from closed enums.
fn movie_listing_cypher(match_clause: &str, sort: SortField, order: SortOrder) -> String {
    format!(
        r#"
        {match_clause}
        WITH DISTINCT m
        WHERE m.`{prop}` IS NOT NULL
        RETURN m, m.tmdbId IN $favorites AS favorite
        ORDER BY m.`{prop}` {dir}, m.tmdbId ASC
        SKIP $skip
        LIMIT $limit
        "#,
        match_clause = match_clause,
        prop = sort.property(),
        dir = order.keyword(),
    )
}

const FAVORITES_CYPHER: &str = r#"
    MATCH (:User {userId: $userId})-[:HAS_FAVORITE]->(m:Movie)
    RETURN m.tmdbId AS id
"#;

const FIND_BY_ID_CYPHER: &str = r#"
    MATCH (m:Movie {tmdbId: $id})
    RETURN m,
           m.tmdbId IN $favorites AS favorite,
           [(a:Person)-[r:ACTED_IN]->(m) | a { .tmdbId, .name, .poster, role: r.role }] AS actors,
           [(d:Person)-[:DIRECTED]->(m) | d { .tmdbId, .name, .poster }] AS directors,
           [(m)-[:IN_GENRE]->(g:Genre) | g.name] AS genres,
           COUNT { (m)<-[:RATED]-() } AS ratingCount
    LIMIT 1
"#;

const SIMILAR_CYPHER: &str = r#"
    MATCH (source:Movie {tmdbId: $id})-[:ACTED_IN|DIRECTED|IN_GENRE]-(shared)
          -[:ACTED_IN|DIRECTED|IN_GENRE]-(m:Movie)
    WHERE m <> source AND m.imdbRating IS NOT NULL
    WITH m, count(DISTINCT shared) AS inCommon
    RETURN m, m.tmdbId IN $favorites AS favorite, inCommon
    ORDER BY inCommon DESC, m.imdbRating DESC, m.tmdbId ASC
    SKIP $skip
    LIMIT $limit
"#;

const GENRES_CYPHER: &str = r#"
    MATCH (g:Genre)
    WHERE g.name <> $sentinel
    RETURN g.name AS name,
           COUNT { (g)<-[:IN_GENRE]-(:Movie) } AS movies,
           head(COLLECT {
               MATCH (g)<-[:IN_GENRE]-(m:Movie)
               WHERE m.imdbRating IS NOT NULL AND m.poster IS NOT NULL
               RETURN m.poster
               ORDER BY m.imdbRating DESC
               LIMIT 1
           }) AS poster
    ORDER BY name ASC
"#;

/// Person map projected inside `FIND_BY_ID_CYPHER`
#[derive(Debug, Deserialize)]
struct CreditRow {
    #[serde(rename = "tmdbId")]
    tmdb_id: Option<String>,
    name: Option<String>,
    poster: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl CreditRow {
    fn into_summary(self) -> Option<PersonSummary> {
        Some(PersonSummary {
            tmdb_id: self.tmdb_id?,
            name: self.name,
            poster: self.poster,
        })
    }

    fn into_cast_member(mut self) -> Option<CastMember> {
        let role = self.role.take();
        self.into_summary().map(|person| CastMember { person, role })
    }
}

/// `:Movie` properties mapped onto named [`Movie`] fields
const KNOWN_MOVIE_PROPERTIES: &[&str] = &[
    "tmdbId",
    "imdbId",
    "title",
    "plot",
    "poster",
    "url",
    "released",
    "year",
    "runtime",
    "imdbRating",
    "imdbVotes",
    "budget",
    "revenue",
    "countries",
    "languages",
];

/// Split node property keys into named fields and pass-through extras.
/// `favorite` is computed per caller, so a stored property of that name is
/// never passed through.
fn partition_movie_properties<'k>(keys: Vec<&'k str>) -> (Vec<&'k str>, Vec<&'k str>) {
    keys.into_iter()
        .filter(|key| *key != "favorite")
        .partition(|key| KNOWN_MOVIE_PROPERTIES.iter().any(|known| known == key))
}

/// Decode a property that may be absent. A present value of the wrong type
/// is an error, not `None`.
fn optional_property<T: DeserializeOwned>(node: &neo4rs::Node, key: &str) -> Result<Option<T>> {
    if !node.keys().iter().any(|k| *k == key) {
        return Ok(None);
    }
    movie_property(node, key).map(Some)
}

fn movie_property<T: DeserializeOwned>(node: &neo4rs::Node, key: &str) -> Result<T> {
    node.get::<T>(key)
        .map_err(|e| CatalogError::query("decode movie", format!("property `{}`: {}", key, e)))
}

impl Neo4jClient {
    /// Create a new Neo4j client and verify the connection.
    ///
    /// Read-only: no schema or data statements are issued.
    pub async fn new(uri: &str, user: &str, password: &str) -> anyhow::Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        // The pool is lazy; force a real handshake so failures surface here.
        graph
            .run(query("RETURN 1"))
            .await
            .context("Neo4j is not responding to queries")?;

        tracing::info!("Connected to Neo4j at {}", uri);

        Ok(Self::from_graph(Arc::new(graph)))
    }

    /// Wrap an existing driver handle
    pub fn from_graph(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    // ========================================================================
    // Transaction plumbing
    // ========================================================================

    async fn begin_read(&self, operation: &'static str) -> Result<Txn> {
        self.graph
            .start_txn()
            .await
            .map_err(|e| CatalogError::database(operation, e))
    }

    /// Close a transaction: commit when the work succeeded, roll back otherwise
    async fn finish<T>(txn: Txn, operation: &'static str, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                txn.commit()
                    .await
                    .map_err(|e| CatalogError::database(operation, e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = txn.rollback().await {
                    tracing::warn!("Rollback after failed {} also failed: {}", operation, e);
                }
                Err(err)
            }
        }
    }

    async fn fetch_rows(txn: &mut Txn, q: Query, operation: &'static str) -> Result<Vec<Row>> {
        let mut stream = txn
            .execute(q)
            .await
            .map_err(|e| CatalogError::database(operation, e))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(txn.handle())
            .await
            .map_err(|e| CatalogError::database(operation, e))?
        {
            rows.push(row);
        }
        Ok(rows)
    }

    /// `tmdbId`s the user has marked as favorite, read inside `txn`
    async fn user_favorites(txn: &mut Txn, user_id: Option<&str>) -> Result<Vec<String>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };

        let q = query(FAVORITES_CYPHER).param("userId", user_id);
        let rows = Self::fetch_rows(txn, q, "get_user_favorites").await?;

        rows.iter()
            .map(|row| {
                row.get::<String>("id")
                    .map_err(|e| CatalogError::query("get_user_favorites", e))
            })
            .collect()
    }

    fn node_to_movie(node: &neo4rs::Node, favorite: bool) -> Result<Movie> {
        let (_, unknown) = partition_movie_properties(node.keys());

        let mut extra = BTreeMap::new();
        for key in unknown {
            extra.insert(key.to_string(), movie_property(node, key)?);
        }

        Ok(Movie {
            tmdb_id: node
                .get::<String>("tmdbId")
                .map_err(|e| CatalogError::query("decode movie", e))?,
            imdb_id: optional_property(node, "imdbId")?,
            title: optional_property(node, "title")?,
            plot: optional_property(node, "plot")?,
            poster: optional_property(node, "poster")?,
            url: optional_property(node, "url")?,
            released: optional_property(node, "released")?,
            year: optional_property(node, "year")?,
            runtime: optional_property(node, "runtime")?,
            imdb_rating: optional_property(node, "imdbRating")?,
            imdb_votes: optional_property(node, "imdbVotes")?,
            budget: optional_property(node, "budget")?,
            revenue: optional_property(node, "revenue")?,
            countries: optional_property(node, "countries")?.unwrap_or_default(),
            languages: optional_property(node, "languages")?.unwrap_or_default(),
            extra,
            favorite,
        })
    }

    fn row_to_movie(row: &Row, operation: &'static str) -> Result<Movie> {
        let node: neo4rs::Node = row
            .get("m")
            .map_err(|e| CatalogError::query(operation, e))?;
        let favorite: bool = row.get("favorite").unwrap_or(false);
        Self::node_to_movie(&node, favorite)
    }

    // ========================================================================
    // Movie listings
    // ========================================================================

    async fn list_movies(
        &self,
        listing: Listing<'_>,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let operation = listing.operation();
        tracing::debug!(
            "{}: sort={} order={} limit={} skip={} user={:?}",
            operation,
            params.sort,
            params.order,
            params.page.limit,
            params.page.skip,
            user_id
        );

        let window = params.page.bolt_window()?;
        let mut txn = self.begin_read(operation).await?;
        let outcome = Self::run_listing(&mut txn, listing, params, window, user_id).await;
        Self::finish(txn, operation, outcome).await
    }

    async fn run_listing(
        txn: &mut Txn,
        listing: Listing<'_>,
        params: &MovieListParams,
        (skip, limit): (i64, i64),
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        let operation = listing.operation();
        let favorites = Self::user_favorites(txn, user_id).await?;

        let cypher = movie_listing_cypher(listing.match_clause(), params.sort, params.order);
        let q = listing
            .bind(query(&cypher))
            .param("favorites", favorites)
            .param("skip", skip)
            .param("limit", limit);

        let rows = Self::fetch_rows(txn, q, operation).await?;
        rows.iter()
            .map(|row| Self::row_to_movie(row, operation))
            .collect()
    }

    /// Paginated movies that have the sort property
    pub async fn all(&self, params: &MovieListParams, user_id: Option<&str>) -> Result<Vec<Movie>> {
        self.list_movies(Listing::All, params, user_id).await
    }

    /// Paginated movies in a genre
    pub async fn get_by_genre(
        &self,
        name: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.list_movies(Listing::Genre(name), params, user_id)
            .await
    }

    /// Paginated movies a person acted in
    pub async fn get_for_actor(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.list_movies(Listing::Actor(id), params, user_id).await
    }

    /// Paginated movies a person directed
    pub async fn get_for_director(
        &self,
        id: &str,
        params: &MovieListParams,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        self.list_movies(Listing::Director(id), params, user_id)
            .await
    }

    // ========================================================================
    // Single movie
    // ========================================================================

    /// A movie with its actors, directors, genres and rating count
    pub async fn find_by_id(&self, id: &str, user_id: Option<&str>) -> Result<MovieDetails> {
        const OP: &str = "find_by_id";
        tracing::debug!("{}: id={} user={:?}", OP, id, user_id);

        let mut txn = self.begin_read(OP).await?;
        let outcome = Self::run_find_by_id(&mut txn, id, user_id).await;
        Self::finish(txn, OP, outcome).await
    }

    async fn run_find_by_id(
        txn: &mut Txn,
        id: &str,
        user_id: Option<&str>,
    ) -> Result<MovieDetails> {
        const OP: &str = "find_by_id";
        let favorites = Self::user_favorites(txn, user_id).await?;

        let q = query(FIND_BY_ID_CYPHER)
            .param("id", id)
            .param("favorites", favorites);
        let rows = Self::fetch_rows(txn, q, OP).await?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::not_found("Movie", id))?;

        let movie = Self::row_to_movie(row, OP)?;
        let actors: Vec<CreditRow> = row
            .get("actors")
            .map_err(|e| CatalogError::query(OP, e))?;
        let directors: Vec<CreditRow> = row
            .get("directors")
            .map_err(|e| CatalogError::query(OP, e))?;
        let genres: Vec<String> = row
            .get("genres")
            .map_err(|e| CatalogError::query(OP, e))?;
        let rating_count: i64 = row.get("ratingCount").unwrap_or(0);

        Ok(MovieDetails {
            movie,
            actors: actors
                .into_iter()
                .filter_map(CreditRow::into_cast_member)
                .collect(),
            directors: directors
                .into_iter()
                .filter_map(CreditRow::into_summary)
                .collect(),
            genres: genres.into_iter().map(|name| GenreName { name }).collect(),
            rating_count,
        })
    }

    /// Movies ranked by shared actors, directors and genres
    pub async fn get_similar_movies(
        &self,
        id: &str,
        page: Pagination,
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        const OP: &str = "get_similar_movies";
        tracing::debug!(
            "{}: id={} limit={} skip={} user={:?}",
            OP,
            id,
            page.limit,
            page.skip,
            user_id
        );

        let window = page.bolt_window()?;
        let mut txn = self.begin_read(OP).await?;
        let outcome = Self::run_similar(&mut txn, id, window, user_id).await;
        Self::finish(txn, OP, outcome).await
    }

    async fn run_similar(
        txn: &mut Txn,
        id: &str,
        (skip, limit): (i64, i64),
        user_id: Option<&str>,
    ) -> Result<Vec<Movie>> {
        const OP: &str = "get_similar_movies";
        let favorites = Self::user_favorites(txn, user_id).await?;

        let q = query(SIMILAR_CYPHER)
            .param("id", id)
            .param("favorites", favorites)
            .param("skip", skip)
            .param("limit", limit);

        let rows = Self::fetch_rows(txn, q, OP).await?;
        rows.iter().map(|row| Self::row_to_movie(row, OP)).collect()
    }

    // ========================================================================
    // Genres and favorites
    // ========================================================================

    /// Every genre except the sentinel, with movie count and best-rated poster
    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        const OP: &str = "list_genres";
        tracing::debug!("{}", OP);

        let mut txn = self.begin_read(OP).await?;
        let outcome = Self::run_list_genres(&mut txn).await;
        Self::finish(txn, OP, outcome).await
    }

    async fn run_list_genres(txn: &mut Txn) -> Result<Vec<Genre>> {
        const OP: &str = "list_genres";
        let q = query(GENRES_CYPHER).param("sentinel", NO_GENRES_SENTINEL);
        let rows = Self::fetch_rows(txn, q, OP).await?;

        rows.iter()
            .map(|row| {
                Ok(Genre {
                    name: row.get("name").map_err(|e| CatalogError::query(OP, e))?,
                    movies: row.get("movies").unwrap_or(0),
                    poster: row.get::<Option<String>>("poster").unwrap_or(None),
                })
            })
            .collect()
    }

    /// Favorite `tmdbId`s for a user; empty when no user is given
    pub async fn get_user_favorites(&self, user_id: Option<&str>) -> Result<HashSet<String>> {
        const OP: &str = "get_user_favorites";
        if user_id.is_none() {
            return Ok(HashSet::new());
        }

        let mut txn = self.begin_read(OP).await?;
        let outcome = Self::user_favorites(&mut txn, user_id).await;
        let ids = Self::finish(txn, OP, outcome).await?;
        Ok(ids.into_iter().collect())
    }
}
