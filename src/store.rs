//! JSON file-backed annotation store.
//!
//! Annotations for one specification are kept as a pretty-printed JSON
//! array. The file is read once, edited in memory and written back whole,
//! so the last writer wins.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::domain::{Annotation, WorkItemKind};
use crate::mapping::OffsetStore;

/// Errors that can occur with the annotation store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Annotation not found: {kind} {id}")]
    NotFound { kind: WorkItemKind, id: i64 },
}

/// Annotations loaded from a JSON file
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    path: PathBuf,
    annotations: Vec<Annotation>,
    dirty: bool,
}

impl AnnotationFile {
    /// Load annotations from `path`; a missing file is an empty set
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let annotations = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        Ok(Self {
            path,
            annotations,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// True if the in-memory set differs from the file
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, kind: WorkItemKind, id: i64) -> Result<&Annotation, StoreError> {
        self.annotations
            .iter()
            .find(|a| a.kind == kind && a.relation_id == id)
            .ok_or(StoreError::NotFound { kind, id })
    }

    /// Write the annotations back to the file
    pub async fn save(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.annotations)?;
        fs::write(&self.path, format!("{}\n", json))
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.dirty = false;
        Ok(())
    }
}

impl OffsetStore for AnnotationFile {
    fn set_offset(&mut self, kind: WorkItemKind, id: i64, offset: usize) -> anyhow::Result<bool> {
        let updated = self.annotations.set_offset(kind, id, offset)?;
        self.dirty |= updated;
        Ok(updated)
    }
}
