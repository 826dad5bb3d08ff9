use crate::core::{Commit, Object, RepoError, Repository};
use similar::{Algorithm, ChangeTag, TextDiff};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Unchanged,
    Added,
    Removed,
}

impl ChangeKind {
    pub fn sign(&self) -> &'static str {
        match self {
            ChangeKind::Unchanged => " ",
            ChangeKind::Added => "+",
            ChangeKind::Removed => "-",
        }
    }
}

/// A contiguous group of lines sharing one [`ChangeKind`]. Line endings are
/// kept, so concatenating runs reconstructs the input texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRun {
    pub kind: ChangeKind,
    pub lines: String,
}

impl DiffRun {
    pub fn new(kind: ChangeKind, lines: impl Into<String>) -> Self {
        Self {
            kind,
            lines: lines.into(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.lines().count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Line-based LCS diff of two texts.
///
/// Within each edit block all removed lines come before all added lines, and
/// adjacent runs of the same kind are merged.
pub fn diff_text(old: &str, new: &str) -> Vec<DiffRun> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_lines(old, new);

    let mut runs = Vec::new();
    let mut removed = String::new();
    let mut added = String::new();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                flush_edits(&mut runs, &mut removed, &mut added);
                push_run(&mut runs, ChangeKind::Unchanged, change.value());
            }
            ChangeTag::Delete => removed.push_str(change.value()),
            ChangeTag::Insert => added.push_str(change.value()),
        }
    }
    flush_edits(&mut runs, &mut removed, &mut added);

    runs
}

fn flush_edits(runs: &mut Vec<DiffRun>, removed: &mut String, added: &mut String) {
    if !removed.is_empty() {
        push_run(runs, ChangeKind::Removed, removed);
        removed.clear();
    }
    if !added.is_empty() {
        push_run(runs, ChangeKind::Added, added);
        added.clear();
    }
}

fn push_run(runs: &mut Vec<DiffRun>, kind: ChangeKind, lines: &str) {
    match runs.last_mut() {
        Some(last) if last.kind == kind => last.lines.push_str(lines),
        _ => runs.push(DiffRun::new(kind, lines)),
    }
}

pub fn diff_stats(runs: &[DiffRun]) -> DiffStats {
    runs.iter().fold(DiffStats::default(), |mut stats, run| {
        match run.kind {
            ChangeKind::Added => stats.added += run.line_count(),
            ChangeKind::Removed => stats.removed += run.line_count(),
            ChangeKind::Unchanged => {}
        }
        stats
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// No entry for this path in the parent commit.
    New,
    /// Same blob as in the parent commit.
    Identical,
    Modified(Vec<DiffRun>),
    /// The commit references a blob that is not in the store.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDiff {
    /// The commit has no parent to compare against.
    Initial,
    Changes(Vec<FileDiff>),
}

#[derive(Debug, Clone)]
pub struct CommitReport {
    pub hash: String,
    pub commit: Commit,
    pub diff: CommitDiff,
}

/// Compares each file of a commit with the same path in its parent.
///
/// `rev` may be a full hash or an unambiguous prefix.
pub fn show_commit_diff(repo: &Repository, rev: &str) -> Result<CommitReport, RepoError> {
    let hash = Object::resolve(repo, rev)?;
    let commit = Commit::load(repo, &hash)?;

    let parent_hash = match &commit.parent {
        Some(parent) => parent.clone(),
        None => {
            return Ok(CommitReport {
                hash,
                commit,
                diff: CommitDiff::Initial,
            })
        }
    };

    let parent = Commit::load(repo, &parent_hash).map_err(|e| match e {
        RepoError::NotFound(_) => RepoError::CorruptHistory(format!(
            "parent {} of {} is missing",
            parent_hash, hash
        )),
        other => other,
    })?;

    let mut files = Vec::with_capacity(commit.files.len());
    for entry in &commit.files {
        let status = if !Object::exists(repo, &entry.hash) {
            FileStatus::Missing
        } else {
            match parent.file(&entry.path) {
                None => FileStatus::New,
                Some(old) if old.hash == entry.hash => FileStatus::Identical,
                Some(old) => match read_text(repo, &old.hash)? {
                    None => FileStatus::New,
                    Some(old_text) => {
                        let new_text = read_text(repo, &entry.hash)?.unwrap_or_default();
                        FileStatus::Modified(diff_text(&old_text, &new_text))
                    }
                },
            }
        };
        debug!(path = %entry.path, "compared file against parent");
        files.push(FileDiff {
            path: entry.path.clone(),
            status,
        });
    }

    Ok(CommitReport {
        hash,
        commit,
        diff: CommitDiff::Changes(files),
    })
}

/// Blob content as text, or `None` if the blob is absent.
fn read_text(repo: &Repository, hash: &str) -> Result<Option<String>, RepoError> {
    match Object::get(repo, hash) {
        Ok(content) => Ok(Some(String::from_utf8_lossy(&content).into_owned())),
        Err(RepoError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
