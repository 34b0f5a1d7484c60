//! Search error types.

use thiserror::Error;

use crate::catalog::{ObjectCategory, TypeCodeError};
use crate::session::SessionError;

/// Result type for search and resolution.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised by the structure assistant.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The caller passed parameters no search can run with.
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),

    /// A catalog query could not be executed or its rows could not be read.
    #[error("catalog query failed on '{data_source}': {source}")]
    DataAccess {
        data_source: String,
        #[source]
        source: SessionError,
    },

    /// A reference did not resolve to a live object.
    #[error("{category} '{name}' not found in {container_kind} '{container}'")]
    NotFound {
        category: ObjectCategory,
        name: String,
        container_kind: &'static str,
        container: String,
    },

    #[error(transparent)]
    TypeCodes(#[from] TypeCodeError),
}

impl SearchError {
    pub fn data_access(data_source: impl Into<String>, source: SessionError) -> Self {
        Self::DataAccess {
            data_source: data_source.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
