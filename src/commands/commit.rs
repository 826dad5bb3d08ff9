use crate::commands::open_repo;
use crate::core::{Commit, RepoError};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

pub async fn run(root: &Path, message: String) -> Result<()> {
    let (repo, _config) = open_repo(root)?;

    match repo.commit(&message) {
        Ok(hash) => {
            println!("{} {}", "Committed:".green().bold(), Commit::short_hash(&hash).bright_yellow());
            println!("{} {}", "Message:".cyan(), message.lines().next().unwrap_or("").bright_white());
            Ok(())
        }
        Err(RepoError::NothingStaged) => {
            println!(
                "{}",
                "Nothing to commit, use `twig add <file>` to stage files first".yellow()
            );
            Ok(())
        }
        Err(e) => Err(e).context("commit failed"),
    }
}
