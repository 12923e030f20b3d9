//! Config file lookup.

use std::path::{Path, PathBuf};

/// Nearest `config_name` in `start` or one of its ancestors.
///
/// ```text
/// /home/user/site/src/styles/  <- start
/// /home/user/site/sluice.toml  <- found
/// ```
///
/// An absolute `config_name` is used as is.
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}
