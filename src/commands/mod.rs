pub mod add;
pub mod commit;
pub mod config;
pub mod init;
pub mod log;
pub mod show;
pub mod status;

use crate::core::{Config, Repository};
use anyhow::{Context, Result};
use std::path::Path;

/// Opens the repository at `root` and applies its color setting.
pub(crate) fn open_repo(root: &Path) -> Result<(Repository, Config)> {
    let repo = Repository::open(root)
        .with_context(|| format!("Not in a twig repository (run `twig init` in {})", root.display()))?;
    let config = Config::load_effective(&repo).context("failed to load configuration")?;

    if !config.color_enabled() {
        colored::control::set_override(false);
    }

    Ok((repo, config))
}
