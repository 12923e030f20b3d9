//! Path helpers shared by the scanner, the file-set resolver and the watcher.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`), falling back
/// to joining with the current directory for paths that do not exist (yet).
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators for glob matching.
///
/// `.` components are dropped; the result never starts with `./`.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::Normal(part) => part.to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

/// Path of `path` relative to `root`, or `path` itself when outside it.
pub fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("./src/styles/a.scss")), "src/styles/a.scss");
        assert_eq!(to_slash(Path::new("a")), "a");
        assert_eq!(to_slash(Path::new("")), "");
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/site");
        assert_eq!(relative_to(Path::new("/site/dist/a.css"), root), Path::new("dist/a.css"));
        assert_eq!(relative_to(Path::new("/other/a.css"), root), Path::new("/other/a.css"));
    }
}
