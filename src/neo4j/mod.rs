//! Neo4j client and models for the movie graph

pub mod client;
mod impl_movie_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::MovieStore;

#[cfg(test)]
pub(crate) mod mock;
