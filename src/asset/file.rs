//! In-flight asset file records.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::ContentType;

/// One file moving through a stage.
///
/// `path` is relative to the stage source directory and becomes the output
/// path relative to the stage output directory. Transforms replace the
/// contents and may rename the path; `input` keeps the name the file was
/// read under.
#[derive(Debug, Clone)]
pub struct AssetFile {
    /// Relative path (output name once the stage finishes)
    pub path: PathBuf,
    /// Relative path of the input, unchanged by renames
    pub input: PathBuf,
    /// Current contents
    pub contents: Vec<u8>,
    /// Logical content type
    pub kind: ContentType,
    /// Absolute path of the original source file
    pub source: PathBuf,
    /// Modification time of the source file
    pub mtime: Option<SystemTime>,
    /// Source map JSON, written next to the output as `<name>.map`
    pub source_map: Option<String>,
}

impl AssetFile {
    pub fn new(path: PathBuf, contents: Vec<u8>, kind: ContentType, source: PathBuf) -> Self {
        Self {
            input: path.clone(),
            path,
            contents,
            kind,
            source,
            mtime: None,
            source_map: None,
        }
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.contents)
    }

    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// Lowercased extension of the current path.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// File name of the current path, for log lines.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the original source file.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new("."))
    }
}
