use crate::commands::open_repo;
use crate::core::config::{validate, Config};
use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::*;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective value of a key
    Get { key: String },
    /// Set a key in the repository (or global) config
    Set {
        key: String,
        value: String,
        #[arg(long)]
        global: bool,
    },
    /// Remove a key from the repository (or global) config
    Unset {
        key: String,
        #[arg(long)]
        global: bool,
    },
    /// List effective settings
    List,
}

pub async fn run(root: &Path, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let (_repo, config) = open_repo(root)?;
            match config.get(key) {
                Some(value) => println!("{}", value),
                None => println!("{} {}", "Key not set:".yellow(), key),
            }
        }
        ConfigAction::Set { key, value, global } => {
            validate(key, value).map_err(|e| anyhow!(e))?;
            update(root, *global, |config| config.set(key, value))?;
            println!("{} {} = {}", "Set".green(), key.cyan(), value.bright_white());
        }
        ConfigAction::Unset { key, global } => {
            update(root, *global, |config| {
                config.remove(key);
            })?;
            println!("{} {}", "Unset".green(), key.cyan());
        }
        ConfigAction::List => {
            let (_repo, config) = open_repo(root)?;
            if config.is_empty() {
                println!("{}", "No configuration set".yellow());
            }
            for (key, value) in config.iter() {
                println!("{}={}", key.cyan(), value);
            }
        }
    }
    Ok(())
}

fn update(root: &Path, global: bool, edit: impl FnOnce(&mut Config)) -> Result<()> {
    if global {
        let mut config = Config::load_global()?;
        edit(&mut config);
        config.save_global()?;
    } else {
        let (repo, _) = open_repo(root)?;
        let mut config = Config::load_repo(&repo)?;
        edit(&mut config);
        config.save_repo(&repo)?;
    }
    Ok(())
}
