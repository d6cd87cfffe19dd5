//! Filesystem persistence for tournament sessions.
//!
//! Layout under the data directory:
//! - `tournaments/<id>/session.json`: metadata, roster and configuration
//! - `tournaments/<id>/rounds.jsonl`: locked rounds, then the pending round

mod jsonl;
mod session_store;

pub use jsonl::*;
pub use session_store::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record at {path:?} line {line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Tournament not found: {0}")]
    NotFound(String),

    #[error("Stored session is inconsistent: {0}")]
    Corrupt(#[from] SessionError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tournaments_dir(&self) -> PathBuf {
        self.data_dir.join("tournaments")
    }

    pub fn tournament_dir(&self, id: &str) -> PathBuf {
        self.tournaments_dir().join(id)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
