//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! clean = ["dist"]        # Removed by `sluice clean` (package output is always added)
//! fail_on_error = false   # Abort a stage when any input fails
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Paths (relative to the project root) removed by `clean`.
    pub clean: Vec<PathBuf>,

    /// Turn per-file transform failures into a failed stage.
    pub fail_on_error: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            clean: vec![PathBuf::from("dist")],
            fail_on_error: false,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        for path in &self.clean {
            if path.is_absolute() || path.components().any(|c| c == std::path::Component::ParentDir) {
                diag.error_with_hint(
                    "build.clean",
                    format!("`{}` is outside the project", path.display()),
                    "use a path relative to the project root",
                );
            }
        }
    }
}
