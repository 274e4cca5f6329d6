//! Engine error types

use thiserror::Error;

/// Conditions reported to callers of the search engine.
///
/// "No matches" is never an error; it is an empty result list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No corpus has been published yet
    #[error("search engine has no data loaded")]
    NotReady,
    /// A record collection had the wrong shape
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
