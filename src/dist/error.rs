use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or linting override catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid override record in {path}:{line}: {text:?}")]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the package-database query port.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path filter: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors from dependency resolution.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("requirement is not valid: {0:?}")]
    InvalidRequirement(String),

    /// No package provides the distribution. The fix is an explicit
    /// override record, never a silent guess.
    #[error("cannot find package that provides {name}; add an override record for it")]
    Unresolved { name: String },

    /// Several packages provide the distribution. Disambiguation needs a
    /// human-supplied override record.
    #[error("more than one package provides {name}: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
