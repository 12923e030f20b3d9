//! `package` task: copy the deployable file set into the package directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::ProjectConfig;
use crate::fileset::{FileSetRule, resolve};
use crate::log;

/// The files `package` and `deploy` ship, relative to the project root.
pub fn deployable_files(config: &ProjectConfig) -> Result<BTreeSet<PathBuf>> {
    let rules = FileSetRule::parse(&config.package.files).context("invalid package.files")?;
    let protected = config.protected_paths().context("invalid protected paths")?;
    Ok(resolve(&rules, config.root(), &protected))
}

/// Replace the package directory with a fresh copy of the file set.
pub fn package(config: &ProjectConfig) -> Result<BTreeSet<PathBuf>> {
    let files = deployable_files(config)?;
    let output = config.root_join(&config.package.output);

    if output.exists() {
        fs::remove_dir_all(&output)
            .with_context(|| format!("failed to clear {}", output.display()))?;
    }

    files.par_iter().try_for_each(|rel| -> Result<()> {
        let dest = output.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(config.root_join(rel), &dest)
            .with_context(|| format!("failed to copy {}", rel.display()))?;
        Ok(())
    })?;

    log!("package"; "{} files -> {}", files.len(), config.root_relative(&output).display());
    Ok(files)
}
