//! Errors raised while running a plan.

use std::time::Duration;

/// Execution errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Query(QueryError),
    #[error("Database error: {0}")]
    DB(#[from] sqlx::Error),
    #[error("The database did not respond within {} seconds.", .0.as_secs_f64())]
    Timeout(Duration),
}

/// A plan and the rows it produced do not fit together.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("The INSERT statement returned no row.")]
    NothingReturned,
    #[error("Column '{column}' could not be read as {scalar_type}: {source}")]
    Decode {
        column: String,
        scalar_type: query_engine_metadata::metadata::ScalarType,
        #[source]
        source: sqlx::Error,
    },
}

impl From<QueryError> for Error {
    fn from(error: QueryError) -> Self {
        Error::Query(error)
    }
}
