//! Catalog queries: validated parameters and the movie repository

pub mod query;
pub mod repository;

pub use query::{MovieListParams, Pagination, SortField, SortOrder};
pub use repository::MovieRepository;
