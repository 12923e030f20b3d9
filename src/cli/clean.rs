//! `clean` task.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ProjectConfig;
use crate::log;

/// Remove every clean path. Missing paths are fine.
pub fn clean(config: &ProjectConfig) -> Result<()> {
    let mut removed = 0;
    for path in config.clean_paths() {
        if path == config.root() || !path.starts_with(config.root()) {
            log!("clean"; "refusing to remove {}", path.display());
            continue;
        }
        if remove(&path).with_context(|| format!("failed to remove {}", path.display()))? {
            crate::debug!("clean"; "removed {}", config.root_relative(&path).display());
            removed += 1;
        }
    }
    log!("clean"; "{removed} path(s) removed");
    Ok(())
}

/// Remove a file or directory tree, reporting whether anything was there.
fn remove(path: &Path) -> io::Result<bool> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    result.map(|()| true)
}
