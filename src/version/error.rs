use thiserror::Error;

/// Errors from version and range parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("version range is invalid: {0:?}")]
    Malformed(String),
}

/// Errors from request parsing and resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Mutually exclusive qualifiers, or a `current` request outside the
    /// supported set.
    #[error("conflicting version request: {0}")]
    Conflict(String),

    #[error("empty set of versions")]
    EmptyResult,
}
