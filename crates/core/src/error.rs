// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading session artifacts
/// (`state.json`, `spec.md`, `plan.json`).
///
/// `NotFound` and `MalformedJson` are distinct on purpose: a caller must
/// be able to tell "no spec written yet" from "someone corrupted plan.json".
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading artifact: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {message}")]
    MalformedJson { path: PathBuf, message: String },
}

impl ArtifactError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// True for the "file simply isn't there" case, as opposed to a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
