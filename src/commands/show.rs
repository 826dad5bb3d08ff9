use crate::commands::open_repo;
use crate::core::{Commit, RepoError};
use crate::utils::diff::{diff_stats, show_commit_diff, ChangeKind, CommitDiff, DiffRun, FileStatus};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

pub async fn run(root: &Path, rev: &str) -> Result<()> {
    let (repo, config) = open_repo(root)?;

    let report = match show_commit_diff(&repo, rev) {
        Ok(report) => report,
        Err(RepoError::NotFound(_)) => {
            println!("{} {}", "Commit not found:".red(), rev);
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("failed to show {}", rev)),
    };

    print_header(&report.hash, &report.commit);

    let files = match report.diff {
        CommitDiff::Initial => {
            println!("{}", "Initial commit, no diff".bright_black());
            return Ok(());
        }
        CommitDiff::Changes(files) => files,
    };

    for file in files {
        println!("{} {}", "File:".bold(), file.path.bright_white());
        match file.status {
            FileStatus::New => println!("{}", "New file in this commit".green()),
            FileStatus::Identical => println!("{}", "Unchanged since parent".bright_black()),
            FileStatus::Missing => println!("{}", "Content missing from object store".red()),
            FileStatus::Modified(runs) => {
                print_runs(&runs);
                if config.show_diff_stats() {
                    let stats = diff_stats(&runs);
                    println!(
                        "{} {}, {} {}",
                        stats.added.to_string().green(),
                        "added".green(),
                        stats.removed.to_string().red(),
                        "removed".red()
                    );
                }
            }
        }
        println!();
    }

    Ok(())
}

fn print_header(hash: &str, commit: &Commit) {
    println!("{} {}", "commit".yellow(), hash.yellow());
    if let Some(parent) = &commit.parent {
        println!("Parent: {}", Commit::short_hash(parent).bright_blue());
    }
    println!("Date:   {}", commit.timestamp.to_rfc3339());
    println!("\n    {}\n", commit.short_message());
}

fn print_runs(runs: &[DiffRun]) {
    for run in runs {
        for line in run.lines.split_inclusive('\n') {
            let text = format!("{}{}", run.kind.sign(), line.trim_end_matches('\n'));
            let styled = match run.kind {
                ChangeKind::Added => text.green(),
                ChangeKind::Removed => text.red(),
                ChangeKind::Unchanged => text.bright_black(),
            };
            println!("{}", styled);
        }
        if !run.lines.ends_with('\n') && !run.lines.is_empty() {
            println!("{}", "\\ No newline at end of file".bright_black());
        }
    }
}
