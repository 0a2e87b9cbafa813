//! Error types for the library layer.

use std::fmt;

use crate::pagination::PaginationFailure;

/// Errors that end a scrape run.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// The search session broke before every results page was read.
    #[error("pagination failed at {0}")]
    Pagination(#[from] PaginationFailure),
    /// The HTTP client could not be set up.
    #[error("client error: {0}")]
    Client(#[from] mdprobate_api::Error),
}

/// User-provided input that failed validation.
#[derive(Debug)]
pub enum ProbateError {
    InvalidInput(String),
}

impl fmt::Display for ProbateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ProbateError {}
