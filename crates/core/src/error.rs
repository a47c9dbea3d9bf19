//! Unified error types for the roster.
//!
//! Every variant renders with a stable upper-case code so log lines and tool
//! errors can be grepped regardless of which crate raised them.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types shared by the store, the scraper and the server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty member name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The normalized profile URL has no `github.com/<username>` segment.
    #[error("INVALID_PROFILE_URL: invalid GitHub URL: {0}")]
    InvalidProfileUrl(String),

    /// The profile page answered with a non-success status.
    #[error("PROFILE_FETCH_ERROR: failed to fetch profile: {status}")]
    ProfileFetch { status: u16 },

    /// The contributions fragment could not be fetched or read.
    ///
    /// Only raised inside the scraper, where it is downgraded to a zero count.
    #[error("CONTRIBUTIONS_FETCH_ERROR: {0}")]
    ContributionsFetch(String),

    /// Network-level failure (connect, timeout, body read).
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// No member with the given id.
    #[error("MEMBER_NOT_FOUND: member {0} not found")]
    MemberNotFound(i64),

    /// Short code could not be generated or resolved.
    #[error("SHORT_CODE_ERROR: {0}")]
    ShortCode(String),

    /// The scrape dispatcher has shut down and no longer accepts jobs.
    #[error("QUEUE_CLOSED: scrape queue is closed; member {0} not scheduled")]
    QueueClosed(i64),

    /// Database operation failed.
    #[error("DATABASE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("DATABASE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(_) => (-32602, err.to_string()),
            Error::InvalidProfileUrl(_) => (-32003, err.to_string()),
            Error::ProfileFetch { .. } => (-32008, err.to_string()),
            Error::ContributionsFetch(_) => (-32008, err.to_string()),
            Error::HttpError(_) => (-32008, err.to_string()),
            Error::MemberNotFound(_) => (-32001, err.to_string()),
            Error::ShortCode(_) => (-32004, err.to_string()),
            Error::Database(_) | Error::MigrationFailed(_) => (-32002, err.to_string()),
            Error::QueueClosed(_) => (-32603, err.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
