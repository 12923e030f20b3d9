//! `[styles]`, `[scripts]`, `[images]` and `[fonts]` section configuration.
//!
//! Every asset section shares the same source fields; paths are relative to
//! the project root, globs are relative to `source`.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! source = "src/styles"
//! include = ["**/*.scss", "**/*.css"]
//! exclude = ["**/_*"]                  # partials are compiled through imports
//! watch = ["**/*.scss", "**/*.css"]
//! output = "dist/css"
//! command = ["sass", "--no-source-map", "--load-path=$SLUICE_SOURCE_DIR", "$SLUICE_INPUT"]
//! combine_media_queries = true
//!
//! [styles.browsers]
//! safari = "5"
//! ie = "8"
//!
//! [images]
//! jpeg_quality = 80                    # re-encode JPEGs (off when unset)
//!
//! [fonts]
//! enable = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ConfigDiagnostics;
use crate::fileset::GlobSet;

/// Borrowed view of the source fields shared by all asset sections.
#[derive(Debug, Clone, Copy)]
pub struct SourceSet<'a> {
    pub section: &'static str,
    pub source: &'a Path,
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub watch: &'a [String],
    pub output: &'a Path,
}

impl SourceSet<'_> {
    fn validate(&self, diag: &mut ConfigDiagnostics) {
        let section = self.section;
        for (field, path) in [("source", self.source), ("output", self.output)] {
            if path.as_os_str().is_empty() || path.is_absolute() {
                diag.error(
                    format!("{section}.{field}"),
                    "must be a non-empty path relative to the project root",
                );
            }
        }
        for (field, globs) in [
            ("include", self.include),
            ("exclude", self.exclude),
            ("watch", self.watch),
        ] {
            if let Err(e) = GlobSet::new(globs) {
                diag.error(format!("{section}.{field}"), e.to_string());
            }
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// [styles]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub source: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub watch: Vec<String>,
    pub output: PathBuf,

    /// Preprocessor command; stdout is the compiled CSS.
    pub command: Vec<String>,

    /// Merge identical `@media` blocks.
    pub combine_media_queries: bool,

    /// Vendor-prefix targets: browser name to minimum version.
    pub browsers: BTreeMap<String, String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src/styles"),
            include: strings(&["**/*.scss", "**/*.css"]),
            exclude: strings(&["**/_*"]),
            watch: strings(&["**/*.scss", "**/*.css"]),
            output: PathBuf::from("dist/css"),
            command: strings(&[
                "sass",
                "--no-source-map",
                "--load-path=$SLUICE_SOURCE_DIR",
                "$SLUICE_INPUT",
            ]),
            combine_media_queries: true,
            browsers: [
                ("android", "4"),
                ("ie", "8"),
                ("ios", "6"),
                ("opera", "12.1"),
                ("safari", "5"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

impl StylesConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            section: "styles",
            source: &self.source,
            include: &self.include,
            exclude: &self.exclude,
            watch: &self.watch,
            output: &self.output,
        }
    }

    /// Browser targets for lightningcss.
    pub fn browser_targets(&self) -> Result<lightningcss::targets::Browsers, String> {
        crate::asset::css::browsers_from_pairs(
            self.browsers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);

        match self.command.first() {
            None => diag.error("styles.command", "must not be empty"),
            Some(cmd) if which::which(cmd).is_err() => diag.warn(
                "styles.command",
                format!("`{cmd}` not found, stylesheets will fail to compile"),
            ),
            Some(_) => {}
        }

        if let Err(entry) = self.browser_targets() {
            diag.error_with_hint(
                "styles.browsers",
                format!("invalid entry `{entry}`"),
                "known browsers: android, chrome, edge, firefox, ie, ios, opera, safari, samsung",
            );
        }
    }
}

// ============================================================================
// [scripts]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub source: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub watch: Vec<String>,
    pub output: PathBuf,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src/js"),
            // nested files are pulled in through `//= require`
            include: strings(&["*.js"]),
            exclude: Vec::new(),
            watch: strings(&["**/*.js"]),
            output: PathBuf::from("dist/js"),
        }
    }
}

impl ScriptsConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            section: "scripts",
            source: &self.source,
            include: &self.include,
            exclude: &self.exclude,
            watch: &self.watch,
            output: &self.output,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
    }
}

// ============================================================================
// [images]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub source: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub watch: Vec<String>,
    pub output: PathBuf,

    /// Re-encode JPEGs at this quality (1-100). Unset keeps JPEGs as-is.
    pub jpeg_quality: Option<u8>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src/img"),
            include: strings(&["**/*"]),
            exclude: Vec::new(),
            watch: strings(&["**/*"]),
            output: PathBuf::from("dist/img"),
            jpeg_quality: None,
        }
    }
}

impl ImagesConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            section: "images",
            source: &self.source,
            include: &self.include,
            exclude: &self.exclude,
            watch: &self.watch,
            output: &self.output,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
        if let Some(q) = self.jpeg_quality
            && !(1..=100).contains(&q)
        {
            diag.error_with_hint(
                "images.jpeg_quality",
                format!("{q} is out of range"),
                "use a value between 1 and 100",
            );
        }
    }
}

// ============================================================================
// [fonts]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Run the fonts stage in `build` and the default task.
    pub enable: bool,
    pub source: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub watch: Vec<String>,
    pub output: PathBuf,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            enable: false,
            source: PathBuf::from("src/fonts"),
            include: strings(&["**/*"]),
            exclude: Vec::new(),
            watch: strings(&["**/*"]),
            output: PathBuf::from("dist/fonts"),
        }
    }
}

impl FontsConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            section: "fonts",
            source: &self.source,
            include: &self.include,
            exclude: &self.exclude,
            watch: &self.watch,
            output: &self.output,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable {
            self.sources().validate(diag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.source, PathBuf::from("src/styles"));
        assert_eq!(config.styles.exclude, vec!["**/_*"]);
        assert!(config.styles.combine_media_queries);
        let browsers = config.styles.browser_targets().unwrap();
        assert_eq!(browsers.safari, Some(5 << 16));
    }

    #[test]
    fn test_styles_override() {
        let config = test_parse_config(
            "[styles]\nsource = \"assets/scss\"\ncombine_media_queries = false\n[styles.browsers]\nchrome = \"80\"\n",
        );
        assert_eq!(config.styles.source, PathBuf::from("assets/scss"));
        assert!(!config.styles.combine_media_queries);
        assert_eq!(config.styles.browsers.len(), 1);
        // untouched fields keep defaults
        assert_eq!(config.styles.output, PathBuf::from("dist/css"));
    }

    #[test]
    fn test_invalid_browser() {
        let config = test_parse_config("[styles.browsers]\nnetscape = \"4\"\n");
        let mut diag = ConfigDiagnostics::new();
        config.styles.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == "styles.browsers"));
    }

    #[test]
    fn test_jpeg_quality_range() {
        let config = test_parse_config("[images]\njpeg_quality = 0\n");
        let mut diag = ConfigDiagnostics::new();
        config.images.validate(&mut diag);
        assert!(diag.has_errors());

        let config = test_parse_config("[images]\njpeg_quality = 85\n");
        let mut diag = ConfigDiagnostics::new();
        config.images.validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_fonts_disabled_by_default() {
        let config = test_parse_config("");
        assert!(!config.fonts.enable);
        let config = test_parse_config("[fonts]\nenable = true\n");
        assert!(config.fonts.enable);
    }
}
