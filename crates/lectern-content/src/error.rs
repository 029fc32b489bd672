//! Content errors.

use crate::frontmatter::FrontmatterError;

/// Errors that can occur when reading or writing content.
///
/// `NotFound` is the only kind callers are expected to recover from; every
/// other kind means the request cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{message}")]
    NotFound { path: String, message: String },

    #[error("Invalid content path: {0}")]
    InvalidPath(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to content host failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content host returned {status} for {path}: {message}")]
    Api {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Markdown in {path}: {source}")]
    Markdown {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

impl ContentError {
    /// Build a `NotFound` error for a path in the given location.
    pub fn not_found(path: impl Into<String>, location: impl std::fmt::Display) -> Self {
        let path = path.into();
        let message = format!(
            "Content not found at {} in {}. The branch may have been deleted or renamed.",
            path, location
        );
        Self::NotFound { path, message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
