//! `sluice.toml`: one section per concern, every field optional.
//!
//! | Section     | Controls                                          |
//! |-------------|---------------------------------------------------|
//! | `[build]`   | `clean` targets, `fail_on_error`                  |
//! | `[styles]`  | sources, preprocessor command, browser targets    |
//! | `[scripts]` | sources                                           |
//! | `[images]`  | sources, `jpeg_quality`                           |
//! | `[fonts]`   | `enable` plus sources                             |
//! | `[package]` | package output and deployable file-set rules      |
//! | `[deploy]`  | targets per environment, credentials file         |
//!
//! The file is looked up from the current directory upward; its directory
//! is the project root. Without one, defaults apply and the current
//! directory is the root. Unknown keys are reported as warnings.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildConfig, DeployConfig, FontsConfig, ImagesConfig, PackageConfig, Protocol, ScriptsConfig,
    SourceSet, StylesConfig, TargetConfig,
};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::debug;
use crate::fileset::{PatternError, ProtectedPaths};
use crate::utils::path::{normalize_path, to_slash};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sluice.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Where the config file is (or would be)
    #[serde(skip)]
    config_path: PathBuf,

    #[serde(skip)]
    root: PathBuf,

    /// Keys present in the file that no section knows
    #[serde(skip)]
    unknown: Vec<String>,

    pub build: BuildConfig,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub images: ImagesConfig,
    pub fonts: FontsConfig,
    pub package: PackageConfig,
    pub deploy: DeployConfig,
}

impl ProjectConfig {
    /// Find, parse and validate the configuration for the current directory.
    pub fn load(config_name: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot read the current directory")?;

        let mut config = match find_config_file(config_name, &cwd) {
            Some(path) => {
                let content =
                    fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
                let mut config = Self::parse(&content).map_err(|e| ConfigError::Toml(path.clone(), e))?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", config_name.display());
                Self {
                    config_path: cwd.join(config_name),
                    ..Self::default()
                }
            }
        };

        let root = match config.config_path.parent() {
            Some(dir) => normalize_path(dir),
            None => normalize_path(&cwd),
        };
        config.set_root(&root);
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text, remembering keys no section consumed.
    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut unknown = Vec::new();
        let mut config: Self =
            serde_ignored::deserialize(toml::Deserializer::new(content), |path| {
                unknown.push(path.to_string());
            })?;
        config.unknown = unknown;
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// `path` relative to the root; paths outside it come back unchanged.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Paths removed by `clean`: `[build] clean` plus the package output.
    pub fn clean_paths(&self) -> Vec<PathBuf> {
        let package = self.root_join(&self.package.output);
        let mut paths: Vec<PathBuf> = self.build.clean.iter().map(|p| self.root_join(p)).collect();
        if !paths.contains(&package) {
            paths.push(package);
        }
        paths
    }

    /// Paths no file set may contain: the package output, this config file
    /// and the credentials file (plus the built-in directories).
    pub fn protected_paths(&self) -> Result<ProtectedPaths, PatternError> {
        let rel = |p: &Path| to_slash(&self.root_relative(p));
        ProtectedPaths::new([
            rel(&self.package.output),
            rel(&self.config_path),
            rel(&self.deploy.credentials_path(&self.root)),
        ])
    }

    /// Check every section. Warnings are logged; errors are returned together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        for key in &self.unknown {
            diag.warn(key.as_str(), "unknown key, ignored");
        }
        self.build.validate(&mut diag);
        self.styles.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.images.validate(&mut diag);
        self.fonts.validate(&mut diag);
        self.package.validate(&mut diag);
        self.deploy.validate(&mut diag);

        diag.finish()
    }
}

/// Parse config text for tests; unknown keys are a test bug.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let parsed = ProjectConfig::parse(content).unwrap();
    assert!(parsed.unknown.is_empty(), "unknown keys: {:?}", parsed.unknown);
    parsed
}

/// Parsed config rooted at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> ProjectConfig {
    let mut config = test_parse_config(content);
    config.set_root(root);
    config.config_path = root.join(CONFIG_FILE);
    config
}
