use crate::core::object::is_valid_hash;
use crate::core::repository::{write_atomic, RepoError};
use crate::core::Repository;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: String,
    pub hash: String,
}

/// The staging set: ordered `path -> hash` pairs, one per path.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(repo: &Repository) -> Result<Self, RepoError> {
        let content = std::fs::read_to_string(repo.index_path())?;
        let index: Index = serde_json::from_str(&content)
            .map_err(|e| RepoError::CorruptIndex(e.to_string()))?;

        index.verify_integrity()?;
        Ok(index)
    }

    pub fn save(&self, repo: &Repository) -> Result<(), RepoError> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(&repo.index_path(), content.as_bytes())?;
        debug!(entries = self.entries.len(), "saved index");
        Ok(())
    }

    /// Replaces the hash of an existing entry in place, or appends a new one.
    pub fn upsert(&mut self, path: &str, hash: &str) {
        match self.entries.iter_mut().find(|entry| entry.path == path) {
            Some(entry) => entry.hash = hash.to_string(),
            None => self.entries.push(IndexEntry {
                path: path.to_string(),
                hash: hash.to_string(),
            }),
        }
    }

    /// Persists an empty staging set.
    pub fn clear(repo: &Repository) -> Result<(), RepoError> {
        Index::new().save(repo)
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn verify_integrity(&self) -> Result<(), RepoError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !is_valid_hash(&entry.hash) {
                return Err(RepoError::CorruptIndex(format!(
                    "invalid hash for {}",
                    entry.path
                )));
            }
            if !seen.insert(entry.path.as_str()) {
                return Err(RepoError::CorruptIndex(format!(
                    "duplicate entry for {}",
                    entry.path
                )));
            }
        }
        Ok(())
    }
}
