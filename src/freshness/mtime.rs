//! Mtime-based freshness detection.
//!
//! Used for incremental stages (an output newer than its source is kept)
//! and for local metadata in the deploy freshness check.

use std::path::Path;
use std::time::SystemTime;

/// Check if output file is at least as new as the given source mtime
///
/// Returns `true` if the output exists and `output_mtime >= source_mtime`,
/// meaning processing can be skipped. An unknown source mtime is never fresh.
pub fn is_output_fresh(output: &Path, source_mtime: Option<SystemTime>) -> bool {
    let Some(source_time) = source_mtime else {
        return false;
    };

    get_mtime(output).is_some_and(|output_time| output_time >= source_time)
}

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing.png");
        assert!(!is_output_fresh(&output, Some(SystemTime::now())));
    }

    #[test]
    fn test_unknown_source_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, b"x").unwrap();
        assert!(!is_output_fresh(&output, None));
    }

    #[test]
    fn test_output_newer_than_source() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, b"x").unwrap();

        let old = SystemTime::now() - Duration::from_secs(3600);
        assert!(is_output_fresh(&output, Some(old)));

        let future = SystemTime::now() + Duration::from_secs(3600);
        assert!(!is_output_fresh(&output, Some(future)));
    }
}
