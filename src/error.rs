//! Typed errors surfaced by the catalog layer

use thiserror::Error;

/// Errors returned by [`MovieStore`](crate::neo4j::MovieStore) implementations
/// and by the [`MovieRepository`](crate::catalog::MovieRepository).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller input was rejected before any query was built.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The database rejected the query, or a row could not be decoded.
    #[error("query error in {operation}: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    /// The driver could not reach the database.
    #[error("connectivity error in {operation}: {message}")]
    Connectivity {
        operation: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl ToString) -> Self {
        Self::Validation {
            field,
            message: message.to_string(),
        }
    }

    pub fn query(operation: &'static str, message: impl ToString) -> Self {
        Self::Query {
            operation,
            message: message.to_string(),
        }
    }

    /// Classify a driver error: connection and IO failures are connectivity
    /// problems, everything else is attributed to the query.
    pub fn database(operation: &'static str, err: neo4rs::Error) -> Self {
        match err {
            neo4rs::Error::ConnectionError | neo4rs::Error::IOError { .. } => {
                Self::Connectivity {
                    operation,
                    message: err.to_string(),
                }
            }
            other => Self::Query {
                operation,
                message: other.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
