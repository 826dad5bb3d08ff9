use crate::core::repository::{write_atomic, RepoError};
use crate::core::Repository;
use std::fs;
use std::io;
use tracing::debug;

/// The single head pointer stored in `.twig/HEAD`.
pub struct Head;

impl Head {
    /// Returns the current head hash, or `None` when no commit exists yet.
    ///
    /// A missing or empty `HEAD` file is the normal pre-first-commit state;
    /// any other read failure is propagated.
    pub fn read(repo: &Repository) -> Result<Option<String>, RepoError> {
        match fs::read_to_string(repo.head_path()) {
            Ok(content) => {
                let hash = content.trim();
                if hash.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(hash.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(repo: &Repository, commit_hash: &str) -> Result<(), RepoError> {
        write_atomic(&repo.head_path(), commit_hash.as_bytes())?;
        debug!(head = %commit_hash, "moved head");
        Ok(())
    }
}
