//! File-set resolution over a directory tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use super::pattern::{GlobSet, PatternError};
use super::rule::FileSetRule;
use crate::utils::path::{relative_to, to_slash};

/// Root-level directories never packaged or uploaded.
const ALWAYS_PROTECTED: &[&str] = &["node_modules", "vendor", ".git"];

/// Paths excluded from every file set, whatever the rules say.
#[derive(Debug, Clone)]
pub struct ProtectedPaths {
    set: GlobSet,
}

impl ProtectedPaths {
    /// Built-in protections plus the given project paths (package output
    /// directory, config file, credentials file), relative to the root.
    pub fn new<I, S>(extra: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = ALWAYS_PROTECTED.iter().map(|d| d.to_string()).collect();
        patterns.extend(extra.into_iter().filter_map(|p| {
            let p = p.as_ref().trim_start_matches("./").trim_end_matches('/');
            (!p.is_empty()).then(|| glob::Pattern::escape(p))
        }));
        Ok(Self {
            set: GlobSet::new(&patterns)?,
        })
    }

    /// Only the built-in directory protections.
    pub fn builtin() -> Self {
        Self::new(std::iter::empty::<&str>()).unwrap_or_else(|_| Self {
            set: GlobSet::default(),
        })
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.set.is_match_hierarchical(rel)
    }
}

/// Resolve `rules` against `root`.
///
/// Returns root-relative paths of every file that matches an inclusion and
/// neither an exclusion nor a protected path. Excluded directories are not
/// descended into.
pub fn resolve(
    rules: &FileSetRule,
    root: &Path,
    protected: &ProtectedPaths,
) -> BTreeSet<PathBuf> {
    let prune = Arc::new((rules.exclude().clone(), protected.clone()));
    let walk_root = root.to_path_buf();

    let walker = WalkDir::new(root)
        .skip_hidden(false)
        .sort(true)
        .process_read_dir(move |_, _, _, children| {
            let (exclude, protected) = &*prune;
            for entry in children.iter_mut().flatten() {
                if !entry.file_type().is_dir() {
                    continue;
                }
                let path = entry.path();
                let rel = to_slash(relative_to(&path, &walk_root));
                if exclude.is_match_hierarchical(&rel) || protected.contains(&rel) {
                    entry.read_children_path = None;
                }
            }
        });

    walker
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.path();
            let rel_path = relative_to(&path, root).to_path_buf();
            let rel = to_slash(&rel_path);
            (rules.matches(&rel) && !protected.contains(&rel)).then_some(rel_path)
        })
        .collect()
}
