//! Aggregate store.
//!
//! Owns the canonical on-disk aggregate document: bootstraps it, loads it
//! and overwrites it after merges. Writes are plain overwrites, so a crash
//! mid-write can leave a truncated file behind.

use crate::error::{JoinError, Result};
use crate::models::AggregateDocument;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Handle on the canonical aggregate file.
#[derive(Debug, Clone)]
pub struct AggregateStore {
    path: PathBuf,
    pretty: bool,
}

impl AggregateStore {
    /// Create a store for the aggregate at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
        }
    }

    /// Write indented JSON instead of the compact form.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the empty aggregate if no file exists yet.
    ///
    /// Existing files are never rewritten.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            debug!("Aggregate already present at {}", self.path.display());
            return Ok(());
        }

        info!("Creating empty aggregate at {}", self.path.display());
        self.save(&AggregateDocument::empty())
    }

    /// Read and parse the aggregate.
    pub fn load(&self) -> Result<AggregateDocument> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| JoinError::from_io(&self.path, e))?;

        let document: AggregateDocument =
            serde_json::from_str(&content).map_err(|source| JoinError::MalformedDocument {
                path: self.path.clone(),
                source,
            })?;

        if document.is_empty() {
            debug!("Aggregate at {} has no metrics yet", self.path.display());
        } else {
            debug!(
                "Loaded {} metric(s) from {}",
                document.len(),
                self.path.display()
            );
        }
        Ok(document)
    }

    /// Serialize `document` and overwrite the aggregate in full.
    pub fn save(&self, document: &AggregateDocument) -> Result<()> {
        let serialized = if self.pretty {
            serde_json::to_string_pretty(document)
        } else {
            serde_json::to_string(document)
        };
        let serialized = serialized
            .map_err(|e| JoinError::InvalidInput(format!("cannot serialize aggregate: {}", e)))?;

        fs::write(&self.path, serialized).map_err(|source| JoinError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved {} metric(s) to {}", document.len(), self.path.display());
        Ok(())
    }
}
