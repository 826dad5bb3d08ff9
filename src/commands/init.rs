use crate::core::{RepoError, Repository};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

pub async fn run(root: &Path) -> Result<()> {
    match Repository::init(root) {
        Ok(repo) => {
            println!(
                "{} {}",
                "Initialized empty twig repository in".green(),
                repo.git_dir.display()
            );
            Ok(())
        }
        Err(RepoError::AlreadyInitialized(path)) => {
            println!("{} {}", "Repository already initialized at".yellow(), path.display());
            Ok(())
        }
        Err(e) => Err(e).context("failed to initialize repository"),
    }
}
