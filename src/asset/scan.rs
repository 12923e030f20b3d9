//! Stage input scanning.

use std::io;
use std::path::{Path, PathBuf};

use crate::fileset::{FileSetRule, ProtectedPaths, resolve};
use crate::freshness::get_mtime;

use super::{AssetFile, ContentType};

/// List the inputs of a stage: files under `source_dir` selected by `rule`,
/// relative to `source_dir`, in sorted order.
///
/// A missing source directory yields no inputs.
pub fn scan_sources(source_dir: &Path, rule: &FileSetRule) -> Vec<PathBuf> {
    if !source_dir.is_dir() {
        return Vec::new();
    }
    resolve(rule, source_dir, &ProtectedPaths::builtin())
        .into_iter()
        .collect()
}

/// Read one input into an [`AssetFile`].
pub fn load_asset(source_dir: &Path, rel: &Path, kind: ContentType) -> io::Result<AssetFile> {
    let source = source_dir.join(rel);
    let contents = std::fs::read(&source)?;
    let mut file = AssetFile::new(rel.to_path_buf(), contents, kind, source);
    file.mtime = get_mtime(&file.source);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("z.scss"), "").unwrap();
        fs::write(root.join("a.scss"), "").unwrap();
        fs::write(root.join("partials/_grid.scss"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let rule = FileSetRule::from_parts(&["**/*.scss"], &["**/_*"]).unwrap();
        let inputs = scan_sources(root, &rule);
        assert_eq!(inputs, vec![PathBuf::from("a.scss"), PathBuf::from("z.scss")]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let dir = TempDir::new().unwrap();
        let rule = FileSetRule::from_parts(&["**/*"], &[]).unwrap();
        assert!(scan_sources(&dir.path().join("nope"), &rule).is_empty());
    }

    #[test]
    fn test_load_asset() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "let a = 1;").unwrap();
        let file = load_asset(dir.path(), Path::new("app.js"), ContentType::Script).unwrap();
        assert_eq!(file.text().unwrap(), "let a = 1;");
        assert_eq!(file.source, dir.path().join("app.js"));
        assert!(file.mtime.is_some());
    }
}
