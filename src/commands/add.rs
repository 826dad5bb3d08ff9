use crate::commands::open_repo;
use anyhow::{bail, Context, Result};
use colored::*;
use std::path::Path;

pub async fn run(root: &Path, files: Vec<String>) -> Result<()> {
    let (repo, _config) = open_repo(root)?;

    for file in &files {
        let full_path = repo.path.join(file);
        if !full_path.is_file() {
            println!("{} {}", "File not found:".red(), file);
            bail!("pathspec '{}' did not match any file", file);
        }
    }

    for file in &files {
        let hash = repo
            .add(file)
            .with_context(|| format!("failed to stage {}", file))?;
        println!("{} {} {}", "Added".green(), file, hash[..8].bright_black());
    }

    Ok(())
}
