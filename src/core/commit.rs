use crate::core::object::is_valid_hash;
use crate::core::repository::RepoError;
use crate::core::{Head, Index, IndexEntry, Object, Repository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

/// An immutable snapshot of the staged files, linked to its parent.
///
/// The serialized JSON form is what gets hashed, so field order here is
/// part of the object format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub files: Vec<IndexEntry>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent: Option<String>,
}

impl Commit {
    pub fn new(message: String, files: Vec<IndexEntry>, parent: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message,
            files,
            parent,
        }
    }

    /// Snapshots the staging index into a new commit on top of HEAD.
    ///
    /// The object is written before HEAD moves, and the index is cleared
    /// last. A failure to clear the index leaves the commit in place.
    pub fn create(repo: &Repository, message: &str) -> Result<String, RepoError> {
        let index = Index::load(repo)?;
        if index.is_empty() {
            return Err(RepoError::NothingStaged);
        }
        if message.trim().is_empty() {
            return Err(RepoError::EmptyMessage);
        }

        let parent = Head::read(repo)?;
        if let Some(head) = &parent {
            Self::load(repo, head).map_err(|e| match e {
                RepoError::NotFound(_) | RepoError::CorruptCommit { .. } => {
                    RepoError::CorruptHistory(format!(
                        "HEAD points to {} which is not a readable commit",
                        head
                    ))
                }
                other => other,
            })?;
        }

        let commit = Commit::new(message.to_string(), index.into_entries(), parent);

        let content = serde_json::to_vec(&commit)?;
        let commit_hash = Object::put(repo, &content)?;
        Head::update(repo, &commit_hash)?;

        if let Err(e) = Index::clear(repo) {
            warn!(error = %e, "commit {} created but the index could not be cleared", commit_hash);
        }

        info!(
            hash = %commit_hash,
            parent = commit.parent.as_deref().unwrap_or("none"),
            files = commit.files.len(),
            "created commit"
        );
        Ok(commit_hash)
    }

    pub fn load(repo: &Repository, hash: &str) -> Result<Self, RepoError> {
        let content = Object::get_verified(repo, hash).map_err(|e| match e {
            RepoError::CorruptObject(_) => corrupt(hash, "content does not match hash"),
            other => other,
        })?;

        let commit: Commit =
            serde_json::from_slice(&content).map_err(|e| corrupt(hash, &e.to_string()))?;
        commit.validate().map_err(|reason| corrupt(hash, &reason))?;
        Ok(commit)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(parent) = &self.parent {
            if !is_valid_hash(parent) {
                return Err(format!("invalid parent hash: {}", parent));
            }
        }

        for entry in &self.files {
            if !is_valid_hash(&entry.hash) {
                return Err(format!("invalid hash for {}", entry.path));
            }
        }

        Ok(())
    }

    pub fn is_initial(&self) -> bool {
        self.parent.is_none()
    }

    pub fn file(&self, path: &str) -> Option<&IndexEntry> {
        self.files.iter().find(|entry| entry.path == path)
    }

    pub fn short_hash(hash: &str) -> &str {
        &hash[..hash.len().min(8)]
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn format_for_display(&self, hash: &str) -> String {
        format!(
            "{} {} ({})",
            Self::short_hash(hash),
            self.short_message(),
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn corrupt(hash: &str, reason: &str) -> RepoError {
    RepoError::CorruptCommit {
        hash: hash.to_string(),
        reason: reason.to_string(),
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parent = Option::<String>::deserialize(deserializer)?;
    Ok(parent.filter(|hash| !hash.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::hash_content;

    fn repo_with_file(name: &str, content: &str) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join(name), content).unwrap();
        (dir, repo)
    }

    #[test]
    fn commit_chains_to_previous_head() {
        let (dir, repo) = repo_with_file("a.txt", "one");
        repo.add("a.txt").unwrap();
        let first = repo.commit("first").unwrap();

        std::fs::write(dir.path().join("a.txt"), "two").unwrap();
        repo.add("a.txt").unwrap();
        let second = repo.commit("second").unwrap();

        assert_eq!(repo.current_head().unwrap().as_deref(), Some(second.as_str()));
        assert_eq!(repo.get_commit(&second).unwrap().parent.as_deref(), Some(first.as_str()));
        assert!(repo.get_commit(&first).unwrap().is_initial());
    }

    #[test]
    fn commit_clears_index_but_keeps_snapshot() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        let blob = repo.add("a.txt").unwrap();
        let hash = repo.commit("snapshot").unwrap();

        assert!(Index::load(&repo).unwrap().is_empty());
        let commit = repo.get_commit(&hash).unwrap();
        assert_eq!(commit.files, vec![IndexEntry { path: "a.txt".into(), hash: blob }]);
    }

    #[test]
    fn commit_with_nothing_staged_changes_nothing() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        let err = repo.commit("empty").unwrap_err();

        assert!(matches!(err, RepoError::NothingStaged));
        assert_eq!(repo.current_head().unwrap(), None);
        assert!(Object::list(&repo).unwrap().is_empty());
    }

    #[test]
    fn commit_rejects_blank_message() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        repo.add("a.txt").unwrap();

        assert!(matches!(repo.commit("  \n"), Err(RepoError::EmptyMessage)));
        assert_eq!(Index::load(&repo).unwrap().len(), 1);
    }

    #[test]
    fn commit_refuses_garbage_head() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        Head::update(&repo, "not-a-hash").unwrap();
        repo.add("a.txt").unwrap();

        let err = repo.commit("on garbage").unwrap_err();
        assert!(matches!(err, RepoError::CorruptHistory(_)));
        assert_eq!(repo.current_head().unwrap().as_deref(), Some("not-a-hash"));
        assert_eq!(Index::load(&repo).unwrap().len(), 1);
    }

    #[test]
    fn commit_refuses_dangling_head() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        let missing = hash_content(b"no such commit");
        Head::update(&repo, &missing).unwrap();
        let blob = repo.add("a.txt").unwrap();

        assert!(matches!(repo.commit("dangling"), Err(RepoError::CorruptHistory(_))));
        assert_eq!(repo.current_head().unwrap(), Some(missing));
        assert_eq!(Object::list(&repo).unwrap(), vec![blob]);
    }

    #[test]
    fn commit_stands_when_index_clear_fails() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        repo.add("a.txt").unwrap();
        // The index is rewritten through `index.tmp`; a directory there makes
        // the write fail after HEAD has already moved.
        std::fs::create_dir(repo.git_dir.join("index.tmp")).unwrap();

        let hash = repo.commit("kept").unwrap();
        assert_eq!(repo.current_head().unwrap(), Some(hash.clone()));
        assert_eq!(repo.get_commit(&hash).unwrap().message, "kept");
        assert_eq!(Index::load(&repo).unwrap().len(), 1);
    }

    #[test]
    fn load_missing_commit_is_not_found() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        assert!(repo.get_commit(&hash_content(b"nope")).unwrap_err().is_not_found());
    }

    #[test]
    fn load_blob_as_commit_is_corrupt() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        let blob = repo.add("a.txt").unwrap();

        assert!(matches!(repo.get_commit(&blob), Err(RepoError::CorruptCommit { .. })));
    }

    #[test]
    fn empty_parent_string_reads_as_none() {
        let (_dir, repo) = repo_with_file("a.txt", "one");
        let raw = br#"{"timestamp":"2024-01-01T00:00:00Z","message":"m","files":[],"parent":""}"#;
        let hash = Object::put(&repo, raw).unwrap();

        assert_eq!(repo.get_commit(&hash).unwrap().parent, None);
    }

    #[test]
    fn serialized_form_uses_iso_timestamp_and_field_order() {
        let commit = Commit {
            timestamp: "2024-05-06T07:08:09Z".parse().unwrap(),
            message: "msg".into(),
            files: vec![],
            parent: None,
        };
        let json = serde_json::to_string(&commit).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-05-06T07:08:09Z","message":"msg","files":[],"parent":null}"#
        );
    }
}
