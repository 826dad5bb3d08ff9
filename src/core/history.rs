use crate::core::repository::RepoError;
use crate::core::{Commit, Head, Repository};
use std::collections::HashSet;

/// Lazy walk of the parent chain, newest first.
///
/// Yields `CorruptHistory` and stops when a parent is missing or a hash
/// repeats.
pub struct History<'a> {
    repo: &'a Repository,
    next: Option<String>,
    child: Option<String>,
    visited: HashSet<String>,
    done: bool,
}

impl<'a> History<'a> {
    pub fn from_head(repo: &'a Repository) -> Result<Self, RepoError> {
        let head = Head::read(repo)?;
        Ok(Self::from_commit(repo, head))
    }

    pub fn from_commit(repo: &'a Repository, start: Option<String>) -> Self {
        Self {
            repo,
            next: start,
            child: None,
            visited: HashSet::new(),
            done: false,
        }
    }

    fn fail(&mut self, err: RepoError) -> Option<Result<(String, Commit), RepoError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for History<'_> {
    type Item = Result<(String, Commit), RepoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let hash = self.next.take()?;

        if !self.visited.insert(hash.clone()) {
            return self.fail(RepoError::CorruptHistory(format!(
                "commit {} appears twice in the parent chain",
                hash
            )));
        }

        match Commit::load(self.repo, &hash) {
            Ok(commit) => {
                self.next = commit.parent.clone();
                self.child = Some(hash.clone());
                Some(Ok((hash, commit)))
            }
            Err(RepoError::NotFound(_)) => {
                let referrer = match self.child.take() {
                    Some(child) => format!("parent of {}", child),
                    None => "HEAD".to_string(),
                };
                self.fail(RepoError::CorruptHistory(format!(
                    "{} points to missing commit {}",
                    referrer, hash
                )))
            }
            Err(e) => self.fail(e),
        }
    }
}
