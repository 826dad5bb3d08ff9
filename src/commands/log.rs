use crate::commands::open_repo;
use crate::core::Commit;
use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::path::Path;

/// Shown when neither `-n` nor `log.maxCount` is set.
const DEFAULT_MAX_DISPLAY: usize = 25;

pub async fn run(root: &Path, oneline: bool, limit: Option<usize>) -> Result<()> {
    let (repo, config) = open_repo(root)?;
    let max_display = limit
        .or_else(|| config.log_max_count())
        .unwrap_or(DEFAULT_MAX_DISPLAY);

    let mut shown = 0;
    let mut history = repo.history().context("failed to read HEAD")?;

    for entry in history.by_ref().take(max_display) {
        let (hash, commit) = entry.context("failed to walk commit history")?;
        if oneline {
            print_oneline_commit(&hash, &commit, shown == 0);
        } else {
            print_full_commit(&hash, &commit, shown == 0);
        }
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No commits yet".yellow());
        return Ok(());
    }

    let mut remaining = 0;
    let mut broken = None;
    for entry in history {
        match entry {
            Ok(_) => remaining += 1,
            Err(e) => {
                broken = Some(e);
                break;
            }
        }
    }

    if remaining > 0 {
        println!(
            "{} ({} more commits, use -n to show more)",
            "...".bright_black(),
            remaining.to_string().bright_yellow()
        );
    }

    match broken {
        Some(e) => Err(e).context("failed to walk commit history"),
        None => Ok(()),
    }
}

fn print_oneline_commit(hash: &str, commit: &Commit, is_head: bool) {
    let short = Commit::short_hash(hash);
    let hash_color = if is_head { short.bright_yellow() } else { short.yellow() };
    println!("{} {}", hash_color, commit.short_message());
}

fn print_full_commit(hash: &str, commit: &Commit, is_head: bool) {
    let hash_display = if is_head { hash.bright_yellow() } else { hash.yellow() };
    println!("{} {}", "commit".yellow(), hash_display);

    let local_time = commit.timestamp.with_timezone(&Local);
    println!("Date:   {}", local_time.format("%a %b %d %H:%M:%S %Y %z"));

    println!();
    for line in commit.message.lines() {
        println!("    {}", line);
    }
    println!();
    println!("{}", "─".repeat(60).bright_black());
}
