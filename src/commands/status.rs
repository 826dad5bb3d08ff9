use crate::commands::open_repo;
use crate::core::{Commit, Index};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

pub async fn run(root: &Path) -> Result<()> {
    let (repo, _config) = open_repo(root)?;
    let index = Index::load(&repo).context("failed to read staging index")?;

    match repo.current_head()? {
        Some(head) => println!("{} {}", "HEAD:".cyan(), Commit::short_hash(&head).bright_yellow()),
        None => println!("{}", "No commits yet".yellow()),
    }

    if index.is_empty() {
        println!("{}", "Nothing staged".bright_black());
        return Ok(());
    }

    println!("\n{}", "Changes to be committed:".green().bold());
    for entry in index.entries() {
        println!("  {} {}", Commit::short_hash(&entry.hash).bright_black(), entry.path.green());
    }

    Ok(())
}
