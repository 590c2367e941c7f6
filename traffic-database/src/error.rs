/*!
Error types for database access and input validation
*/

use std::path::PathBuf;

/// The store could not be reached or a statement failed.
///
/// Callers must read this as "unknown", never as "safe to delete".
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("failed to open database at {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Input rejected before any statement was issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("registration year {year} is outside {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
    #[error("appeal reason must be at least {min} characters")]
    ReasonTooShort { min: usize },
    #[error("unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("penalty {0} does not exist")]
    UnknownPenalty(i64),
    #[error("penalty {id} is {status}, only unpaid penalties can be paid")]
    PenaltyNotPayable { id: i64, status: String },
    #[error("violation {0} is not eligible for appeal")]
    NotAppealable(i64),
}

/// Any failure of a write operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DataAccess(DataAccessError::Query(err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
