//! Error types for sharelink-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sharelink operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read/write config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Link path already exists: {0}")]
    LinkExists(PathBuf),

    #[error("Link source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Not a symbolic link: {0}")]
    NotALink(PathBuf),
}

/// Result type alias for sharelink operations
pub type Result<T> = std::result::Result<T, Error>;
