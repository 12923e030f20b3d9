//! `[package]` section configuration.
//!
//! The `files` rules select what `package` copies and what `deploy` uploads.
//! Patterns are relative to the project root; a leading `!` excludes.
//!
//! # Example
//!
//! ```toml
//! [package]
//! output = "__packaged"
//! files = ["**/*", "!{src,src/**}", "!README.md"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Package output directory, relative to the project root.
    pub output: PathBuf,

    /// Ordered file-set rules.
    pub files: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("__packaged"),
            files: [
                "**/*",
                "!{src,src/**}",
                "!{templates,templates/**}",
                "!package.json",
                "!package-lock.json",
                "!composer.json",
                "!composer.lock",
                "!README.md",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl PackageConfig {
    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.output.as_os_str().is_empty() || self.output.is_absolute() {
            diag.error_with_hint(
                "package.output",
                "must be a non-empty relative path",
                "the default is \"__packaged\"",
            );
        }
        if let Err(e) = crate::fileset::FileSetRule::parse(&self.files) {
            diag.error("package.files", e.to_string());
        }
    }
}
