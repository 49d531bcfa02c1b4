//! Tag store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading tag files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk tag directory {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Failed to parse tag file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid tag file name: {path}")]
    InvalidName { path: PathBuf },
}

/// Errors that can occur while resolving a tag path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Tag reference not found: {path} (missing '{segment}')")]
    ReferenceNotFound { path: String, segment: String },

    #[error("Tag path {path} descends through a non-mapping at '{segment}'")]
    TypeMismatch { path: String, segment: String },

    #[error("Tag path {path} picked a nested pool instead of a tag")]
    NestedPool { path: String },
}
