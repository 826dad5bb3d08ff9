use crate::core::repository::{write_atomic, RepoError};
use crate::core::Repository;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const COLOR_UI: &str = "color.ui";
pub const LOG_MAX_COUNT: &str = "log.maxCount";
pub const DIFF_STATS: &str = "diff.stats";

/// Flat `section.key = value` settings, stored as JSON.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    settings: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".twigconfig"))
    }

    pub fn load_global() -> Result<Self, RepoError> {
        match Self::global_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_repo(repo: &Repository) -> Result<Self, RepoError> {
        Self::load_from_file(&repo.config_path())
    }

    /// Global settings overlaid with the repository's own.
    pub fn load_effective(repo: &Repository) -> Result<Self, RepoError> {
        let mut config = Self::load_global()?;
        config.merge(Self::load_repo(repo)?);
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RepoError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_global(&self) -> Result<(), RepoError> {
        let path = Self::global_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "cannot find home directory")
        })?;
        self.save_to_file(&path)
    }

    pub fn save_repo(&self, repo: &Repository) -> Result<(), RepoError> {
        self.save_to_file(&repo.config_path())
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), RepoError> {
        let content = serde_json::to_string_pretty(&self)?;
        write_atomic(path, content.as_bytes())?;
        Ok(())
    }

    pub fn merge(&mut self, other: Config) {
        self.settings.extend(other.settings);
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.settings.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.settings.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.settings.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.settings.iter()
    }

    pub fn color_enabled(&self) -> bool {
        self.get_bool(COLOR_UI).unwrap_or(true)
    }

    pub fn show_diff_stats(&self) -> bool {
        self.get_bool(DIFF_STATS).unwrap_or(true)
    }

    pub fn log_max_count(&self) -> Option<usize> {
        self.get(LOG_MAX_COUNT)
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| parse_bool(v))
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Checks that `key` is recognised and `value` fits its type.
pub fn validate(key: &str, value: &str) -> Result<(), String> {
    match key {
        COLOR_UI | DIFF_STATS => parse_bool(value)
            .map(|_| ())
            .ok_or_else(|| format!("{} expects true/false, yes/no, on/off or 1/0", key)),
        LOG_MAX_COUNT => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(format!("{} expects a positive integer", key)),
        },
        _ => Err(format!("Invalid configuration key: {}", key)),
    }
}
