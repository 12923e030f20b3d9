//! Script include directives.
//!
//! ```js
//! //= require vendor/jquery
//! //= include partials/*.js
//! ```
//!
//! A directive line is replaced by the contents of the named file(s),
//! resolved relative to the including file. `.js` is appended when the
//! target has no extension. Targets may be globs (expanded in sorted order).
//!
//! - `require` inserts each file at most once per output file
//! - `include` inserts it every time
//!
//! Directives inside included files are expanded too; an include cycle is
//! an error.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use super::{Transform, TransformError, text_of};
use crate::asset::AssetFile;
use crate::utils::path::normalize_path;

static DIRECTIVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*//=[ \t]*(require|include)[ \t]+([^ \t]+)[ \t]*$").ok()
});

pub struct ResolveIncludes;

impl Transform for ResolveIncludes {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let mut expander = Expander::default();
        let root = normalize_path(&file.source);
        expander.stack.push(root.clone());
        expander.required.insert(root);

        let text = expander
            .expand(text_of(self.name(), &file)?, file.source_dir())
            .map_err(|(message, line)| {
                TransformError::new(self.name(), &file, message).with_line(line)
            })?;
        file.set_text(text);
        Ok(file)
    }
}

/// Failure message plus the 1-based directive line in the top-level file.
type ExpandError = (String, Option<usize>);

#[derive(Default)]
struct Expander {
    /// Files currently being expanded (cycle detection)
    stack: Vec<PathBuf>,
    /// Files already inserted by `require`
    required: FxHashSet<PathBuf>,
}

impl Expander {
    fn expand(&mut self, text: &str, dir: &Path) -> Result<String, ExpandError> {
        let Some(re) = DIRECTIVE_RE.as_ref() else {
            return Ok(text.to_string());
        };

        let mut out = String::with_capacity(text.len());
        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let Some(caps) = re.captures(line.trim_end_matches(['\r', '\n'])) else {
                out.push_str(line);
                continue;
            };

            let once = &caps[1] == "require";
            let targets = resolve_targets(dir, &caps[2]);
            if targets.is_empty() {
                return Err((format!("no file matches `{}`", &caps[2]), Some(idx + 1)));
            }

            for target in targets {
                let chunk = self
                    .insert(&target, once)
                    .map_err(|(message, _)| (message, Some(idx + 1)))?;
                out.push_str(&chunk);
                if !chunk.is_empty() && !chunk.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
        Ok(out)
    }

    fn insert(&mut self, target: &Path, once: bool) -> Result<String, ExpandError> {
        let key = normalize_path(target);
        if self.stack.contains(&key) {
            return Err((format!("include cycle through {}", target.display()), None));
        }
        if once && !self.required.insert(key.clone()) {
            return Ok(String::new());
        }

        let text = std::fs::read_to_string(target)
            .map_err(|e| (format!("{}: {e}", target.display()), None))?;
        let dir = target.parent().unwrap_or_else(|| Path::new("."));

        self.stack.push(key);
        let result = self.expand(&text, dir);
        self.stack.pop();
        result
    }
}

/// Files named by a directive target, in sorted order.
fn resolve_targets(dir: &Path, target: &str) -> Vec<PathBuf> {
    let mut path = dir.join(target);
    if path.extension().is_none() {
        path.set_extension("js");
    }

    if !target.contains(['*', '?', '[']) {
        return if path.is_file() { vec![path] } else { Vec::new() };
    }

    let pattern = path.to_string_lossy().into_owned();
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(Result::ok).filter(|p| p.is_file()).collect())
        .unwrap_or_default();
    found.sort();
    found
}
