//! On-disk conversation snapshots.
//!
//! A snapshot file holds one serialized [`ConversationMemory`] as pretty
//! JSON. Writes go to a sibling temp file first and are renamed into place,
//! so a crash mid-save never leaves a truncated snapshot behind.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use onigiri_core::memory::ConversationMemory;
use onigiri_types::error::MemoryError;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Saves and loads one memory snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Write `memory` to the snapshot file, replacing any previous one.
    pub async fn save(&self, memory: &ConversationMemory) -> Result<(), SnapshotError> {
        let json = memory.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|source| self.io_error(source))?;
        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.io_error(source));
        }

        debug!(
            path = %self.path.display(),
            messages = memory.message_count(),
            "Saved memory snapshot"
        );
        Ok(())
    }

    /// Read the snapshot file.
    pub async fn load(&self) -> Result<ConversationMemory, SnapshotError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        let memory = ConversationMemory::from_json(&json)?;

        debug!(
            path = %self.path.display(),
            messages = memory.message_count(),
            "Loaded memory snapshot"
        );
        Ok(memory)
    }

    /// Load the snapshot if the file exists, `None` otherwise.
    pub async fn load_if_exists(&self) -> Result<Option<ConversationMemory>, SnapshotError> {
        match self.load().await {
            Ok(memory) => Ok(Some(memory)),
            Err(SnapshotError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
