//! Output naming steps.

use std::path::PathBuf;

use super::{Transform, TransformError};
use crate::asset::AssetFile;

/// Replace the file extension (`a.scss` -> `a.css`).
pub struct SetExtension {
    extension: &'static str,
}

impl SetExtension {
    pub const fn new(extension: &'static str) -> Self {
        Self { extension }
    }
}

impl Transform for SetExtension {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        file.path.set_extension(self.extension);
        Ok(file)
    }
}

/// Insert `.min` before the extension (`a.css` -> `a.min.css`).
pub struct MinSuffix;

impl Transform for MinSuffix {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        file.path = with_suffix(&file.path, ".min");
        Ok(file)
    }
}

fn with_suffix(path: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}
