//! Data module
//!
//! Loads glucose readings and insulin doses from the application's JSON
//! export file. The analytics core never reads files itself.

pub mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::{RecordSet, SUPPORTED_SCHEMA_VERSIONS};

/// Environment variable overriding the export file location
pub const DATA_PATH_ENV: &str = "GLYTRACK_DATA_PATH";

/// Data loading error types
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported export schema version: {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    #[error("Invalid insulin dose: {0}")]
    InvalidDose(String),

    #[error("Data file not found: {}", .0.display())]
    MissingDataFile(PathBuf),
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Get the export file path from environment or use default
pub fn data_path_from_env() -> PathBuf {
    std::env::var(DATA_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("glytrack-export.json");
            path
        })
}
