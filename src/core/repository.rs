use crate::core::{Commit, Config, History, Index};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the metadata directory inside a worktree.
pub const REPO_DIR: &str = ".twig";

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Not a valid twig repository: {}", .0.display())]
    NotARepo(PathBuf),
    #[error("Repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),
    #[error("{} is outside the repository worktree", .0.display())]
    OutsideWorktree(PathBuf),
    #[error("Object {0} not found")]
    NotFound(String),
    #[error("Hash prefix {0} matches more than one object")]
    AmbiguousHash(String),
    #[error("Object {0} does not match its hash")]
    CorruptObject(String),
    #[error("Staging index is corrupted: {0}")]
    CorruptIndex(String),
    #[error("Commit {hash} is corrupted: {reason}")]
    CorruptCommit { hash: String, reason: String },
    #[error("Commit history is corrupted: {0}")]
    CorruptHistory(String),
    #[error("Nothing staged to commit")]
    NothingStaged,
    #[error("Commit message cannot be empty")]
    EmptyMessage,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(_))
    }

    /// Persisted state failed to parse or violates a structural invariant.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            RepoError::CorruptObject(_)
                | RepoError::CorruptIndex(_)
                | RepoError::CorruptCommit { .. }
                | RepoError::CorruptHistory(_)
        )
    }
}

/// Handle to a repository on disk.
///
/// All state is reloaded from disk by each operation; the handle only
/// carries paths.
#[derive(Debug, Clone)]
pub struct Repository {
    pub path: PathBuf,
    pub git_dir: PathBuf,
}

impl Repository {
    /// Creates the `.twig` layout under `root`.
    ///
    /// `HEAD` is written last with create-new semantics, so its presence marks
    /// a completed init and a second call reports `AlreadyInitialized`.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self, RepoError> {
        let root = root.as_ref();
        let git_dir = root.join(REPO_DIR);

        if git_dir.join("HEAD").exists() {
            return Err(RepoError::AlreadyInitialized(git_dir));
        }

        fs::create_dir_all(git_dir.join("objects"))?;
        Self::set_secure_permissions(&git_dir)?;

        let repo = Repository {
            path: root.to_path_buf(),
            git_dir,
        };

        write_if_absent(&repo.index_path(), b"[]")?;
        if !repo.config_path().exists() {
            Config::new().save_repo(&repo)?;
        }

        match write_if_absent(&repo.head_path(), b"") {
            Ok(true) => {}
            Ok(false) => return Err(RepoError::AlreadyInitialized(repo.git_dir)),
            Err(e) => return Err(e.into()),
        }

        info!(path = %repo.git_dir.display(), "initialized repository");
        Ok(repo)
    }

    /// Opens an existing repository rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, RepoError> {
        let root = root.as_ref();
        let git_dir = root.join(REPO_DIR);

        if !Self::is_valid_repo(&git_dir) {
            return Err(RepoError::NotARepo(root.to_path_buf()));
        }

        debug!(path = %git_dir.display(), "opened repository");
        Ok(Repository {
            path: root.to_path_buf(),
            git_dir,
        })
    }

    fn is_valid_repo(git_dir: &Path) -> bool {
        git_dir.join("HEAD").is_file()
            && git_dir.join("index").is_file()
            && git_dir.join("objects").is_dir()
    }

    fn set_secure_permissions(path: &Path) -> Result<(), RepoError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o750);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub fn config_path(&self) -> PathBuf {
        self.git_dir.join("config.json")
    }

    /// Stages one file: stores its content as a blob and records
    /// `path -> hash` in the index. Returns the blob hash.
    pub fn add<P: AsRef<Path>>(&self, file: P) -> Result<String, RepoError> {
        let file = file.as_ref();
        let full_path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.path.join(file)
        };

        let logical = self.logical_path(&full_path)?;
        let content = fs::read(&full_path)?;
        let hash = crate::core::Object::put(self, &content)?;

        let mut index = Index::load(self)?;
        index.upsert(&logical, &hash);
        index.save(self)?;

        debug!(path = %logical, hash = %hash, "staged file");
        Ok(hash)
    }

    pub fn commit(&self, message: &str) -> Result<String, RepoError> {
        Commit::create(self, message)
    }

    pub fn current_head(&self) -> Result<Option<String>, RepoError> {
        crate::core::Head::read(self)
    }

    pub fn get_commit(&self, hash: &str) -> Result<Commit, RepoError> {
        Commit::load(self, hash)
    }

    /// Commits reachable from HEAD, newest first.
    pub fn history(&self) -> Result<History<'_>, RepoError> {
        History::from_head(self)
    }

    /// Path as recorded in the index: relative to the canonical worktree root
    /// and `/`-separated, so every spelling of one file maps to one entry.
    ///
    /// The parent directory is canonicalized rather than the file itself, so
    /// a symlink is staged under its own name.
    fn logical_path(&self, full_path: &Path) -> Result<String, RepoError> {
        let outside = || RepoError::OutsideWorktree(full_path.to_path_buf());

        let file_name = full_path.file_name().ok_or_else(outside)?;
        let parent = match full_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let root = fs::canonicalize(&self.path)?;
        let resolved = fs::canonicalize(parent)?.join(file_name);
        let relative = resolved.strip_prefix(&root).map_err(|_| outside())?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() || parts[0] == REPO_DIR {
            return Err(outside());
        }
        Ok(parts.join("/"))
    }
}

/// Writes `content` to a sibling temp file and renames it over `path`.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}

/// Returns `Ok(false)` when the file already exists.
fn write_if_absent(path: &Path, content: &[u8]) -> io::Result<bool> {
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(content)?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}
