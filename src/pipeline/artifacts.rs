//! Run-scoped artifact relay
//!
//! Named outputs flow between jobs through an explicit key-value store,
//! never through ambient file-system side effects. Writes are
//! single-writer per name; reads are many-reader and race-free because a
//! consumer only reads after its producer dependency succeeded.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::errors::PipelineError;

/// Opaque location of a stored artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactHandle {
    /// A path on the executor's file system
    Path(String),
    /// Small inline payload (e.g. a generated upload URL)
    Inline(String),
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "path:{p}"),
            Self::Inline(_) => write!(f, "inline"),
        }
    }
}

/// Reference to a named output owned by its producing instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Instance that produced the artifact
    pub producer: String,

    /// Relay name of the artifact
    pub name: String,

    /// Location of the artifact
    pub handle: ArtifactHandle,
}

/// Content-addressed-by-name store of job outputs, scoped to one run
#[derive(Debug, Clone, Default)]
pub struct ArtifactRelay {
    entries: Arc<DashMap<String, ArtifactRef>>,
}

impl ArtifactRelay {
    /// Creates an empty relay
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a named artifact.
    ///
    /// The check and insert happen under one shard lock, so concurrent
    /// writers of the same name race to exactly one winner.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ArtifactConflict`] if the name was already
    /// written; only the producing instance may write a given name, once.
    pub fn put(
        &self,
        producer: impl Into<String>,
        name: impl Into<String>,
        handle: ArtifactHandle,
    ) -> Result<ArtifactRef, PipelineError> {
        match self.entries.entry(name.into()) {
            Entry::Occupied(existing) => Err(PipelineError::ArtifactConflict {
                name: existing.key().clone(),
                producer: existing.get().producer.clone(),
            }),
            Entry::Vacant(slot) => {
                let artifact = ArtifactRef {
                    producer: producer.into(),
                    name: slot.key().clone(),
                    handle,
                };
                slot.insert(artifact.clone());
                Ok(artifact)
            }
        }
    }

    /// Looks up an artifact by name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ArtifactMissing`] when nothing was
    /// published under `name`.
    pub fn get(&self, name: &str) -> Result<ArtifactRef, PipelineError> {
        self.entries
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PipelineError::ArtifactMissing {
                name: name.to_string(),
            })
    }

    /// Returns true if an artifact exists under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of stored artifacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the relay is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all artifact names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
