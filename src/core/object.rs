use crate::core::repository::{write_atomic, RepoError};
use crate::core::Repository;
use ring::digest;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_LEN: usize = 64;

/// Shortest prefix accepted by [`Object::resolve`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Content-addressed object store under `.twig/objects/`.
///
/// Blobs and commits share one namespace: each object is a single file named
/// by the hash of its raw bytes.
pub struct Object;

impl Object {
    /// Stores `content` and returns its hash. Writing content that is already
    /// present is a no-op.
    pub fn put(repo: &Repository, content: &[u8]) -> Result<String, RepoError> {
        let hash = hash_content(content);
        let obj_path = Self::object_path(repo, &hash);

        if obj_path.exists() {
            debug!(hash = %hash, "object already stored");
            return Ok(hash);
        }

        write_atomic(&obj_path, content)?;
        Self::set_object_permissions(&obj_path)?;
        debug!(hash = %hash, size = content.len(), "stored object");
        Ok(hash)
    }

    pub fn get(repo: &Repository, hash: &str) -> Result<Vec<u8>, RepoError> {
        if !is_valid_hash(hash) {
            return Err(RepoError::NotFound(hash.to_string()));
        }

        match fs::read(Self::object_path(repo, hash)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(RepoError::NotFound(hash.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Object::get`], but re-hashes the stored bytes first.
    pub fn get_verified(repo: &Repository, hash: &str) -> Result<Vec<u8>, RepoError> {
        let content = Self::get(repo, hash)?;
        if hash_content(&content) != hash {
            return Err(RepoError::CorruptObject(hash.to_string()));
        }
        Ok(content)
    }

    pub fn exists(repo: &Repository, hash: &str) -> bool {
        is_valid_hash(hash) && Self::object_path(repo, hash).is_file()
    }

    /// All stored object hashes, sorted.
    pub fn list(repo: &Repository) -> Result<Vec<String>, RepoError> {
        let mut objects = Vec::new();
        let objects_dir = repo.objects_dir();

        if !objects_dir.exists() {
            return Ok(objects);
        }

        for entry in fs::read_dir(&objects_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_hash(name) {
                    objects.push(name.to_string());
                }
            }
        }

        objects.sort();
        Ok(objects)
    }

    /// Expands an abbreviated hash to the single stored hash it prefixes.
    pub fn resolve(repo: &Repository, prefix: &str) -> Result<String, RepoError> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if is_valid_hash(&prefix) {
            return if Self::exists(repo, &prefix) {
                Ok(prefix)
            } else {
                Err(RepoError::NotFound(prefix))
            };
        }

        if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RepoError::NotFound(prefix));
        }

        let mut matches = Self::list(repo)?
            .into_iter()
            .filter(|hash| hash.starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(hash), None) => Ok(hash),
            (Some(_), Some(_)) => Err(RepoError::AmbiguousHash(prefix)),
            (None, _) => Err(RepoError::NotFound(prefix)),
        }
    }

    fn object_path(repo: &Repository, hash: &str) -> PathBuf {
        repo.objects_dir().join(hash)
    }

    fn set_object_permissions(obj_path: &std::path::Path) -> Result<(), RepoError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(obj_path)?.permissions();
            perms.set_mode(0o444);
            fs::set_permissions(obj_path, perms)?;
        }
        Ok(())
    }
}

/// SHA-256 of `content`, hex encoded.
pub fn hash_content(content: &[u8]) -> String {
    let digest_result = digest::digest(&digest::SHA256, content);
    hex::encode(digest_result.as_ref())
}

pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == HASH_LEN && hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn hash_is_stable_sha256() {
        assert_eq!(
            hash_content(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_content(b"hello"), hash_content(b"hello"));
        assert_ne!(hash_content(b"hello"), hash_content(b"hello "));
    }

    #[test]
    fn put_then_get_returns_content() {
        let (_dir, repo) = repo();
        for content in [&b""[..], b"hello", b"\x00\xff binary\n"] {
            let hash = Object::put(&repo, content).unwrap();
            assert_eq!(Object::get(&repo, &hash).unwrap(), content);
        }
    }

    #[test]
    fn put_is_idempotent() {
        let (_dir, repo) = repo();
        let first = Object::put(&repo, b"same bytes").unwrap();
        let second = Object::put(&repo, b"same bytes").unwrap();

        assert_eq!(first, second);
        assert_eq!(Object::list(&repo).unwrap(), vec![first]);
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, repo) = repo();
        let err = Object::get(&repo, &hash_content(b"never stored")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn get_rejects_path_like_hashes() {
        let (_dir, repo) = repo();
        let err = Object::get(&repo, "../HEAD").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn get_verified_detects_tampering() {
        let (_dir, repo) = repo();
        let hash = Object::put(&repo, b"original").unwrap();
        let path = repo.objects_dir().join(&hash);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        }
        fs::write(&path, b"tampered").unwrap();

        assert!(matches!(
            Object::get_verified(&repo, &hash),
            Err(RepoError::CorruptObject(_))
        ));
    }

    #[test]
    fn resolve_expands_unique_prefix() {
        let (_dir, repo) = repo();
        let hash = Object::put(&repo, b"resolve me").unwrap();

        assert_eq!(Object::resolve(&repo, &hash[..10]).unwrap(), hash);
        assert_eq!(Object::resolve(&repo, &hash.to_uppercase()).unwrap(), hash);
        assert!(Object::resolve(&repo, "abc").unwrap_err().is_not_found());
        assert!(Object::resolve(&repo, "zzzzzz").unwrap_err().is_not_found());
    }
}
