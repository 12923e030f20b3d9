//! Per-file asset transforms.
//!
//! A transform takes one [`AssetFile`] and returns the transformed file or a
//! [`TransformError`] scoped to that file. Transforms hold only read-only
//! configuration, so one instance is shared by every file of a stage run.
//!
//! # Modules
//!
//! - `compile`: External style preprocessor (`sass` by default)
//! - `prefix`: Vendor prefixes for the configured browser targets
//! - `media`: Combine identical `@media` blocks
//! - `minify`: CSS (lightningcss) and JS (oxc) minification
//! - `rename`: Extension changes and the `.min` suffix
//! - `sourcemap`: Development source maps
//! - `include`: `//= require` / `//= include` script directives
//! - `strip`: Drop `console.*` calls and `debugger` statements
//! - `image`: Lossless image recompression

mod compile;
mod image;
mod include;
mod media;
mod minify;
mod prefix;
mod rename;
mod sourcemap;
mod strip;

use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetFile;

pub use compile::{CompileStyles, CommandVars};
pub use image::OptimizeImage;
pub use include::ResolveIncludes;
pub use media::CombineMediaQueries;
pub use minify::{MinifyCss, MinifyJs};
pub use prefix::Prefix;
pub use rename::{MinSuffix, SetExtension};
pub use sourcemap::SourceMap;
pub use strip::StripDebug;

/// A content transform applied to one file at a time.
pub trait Transform: Send + Sync {
    /// Short name used in failure reports (`compile`, `minify`, ...).
    fn name(&self) -> &'static str;

    /// Transform `file`. Failures must not have side effects.
    fn apply(&self, file: AssetFile) -> Result<AssetFile, TransformError>;
}

/// A recoverable failure scoped to one input file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{transform}: {}: {message}", path.display())]
pub struct TransformError {
    pub transform: &'static str,
    /// Input path relative to the stage source directory
    pub path: PathBuf,
    /// 1-based line, when the tool reports one
    pub line: Option<usize>,
    pub message: String,
}

impl TransformError {
    pub fn new(transform: &'static str, file: &AssetFile, message: impl Into<String>) -> Self {
        Self {
            transform,
            path: file.input.clone(),
            line: None,
            message: message.into(),
        }
    }

    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

/// Borrow the file contents as text or fail with a transform error.
fn text_of<'a>(transform: &'static str, file: &'a AssetFile) -> Result<&'a str, TransformError> {
    file.text()
        .map_err(|e| TransformError::new(transform, file, format!("not valid UTF-8: {e}")))
}
