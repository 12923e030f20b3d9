//! Glob pattern sets.
//!
//! Patterns are matched against `/`-separated relative paths:
//! - `*` and `?` never cross `/`; `**` spans any number of directories
//! - a leading `.` must be matched literally (dotfiles are opt-in)
//! - `{a,b}` alternatives are expanded before compiling

use glob::{MatchOptions, Pattern};
use thiserror::Error;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A pattern that failed to compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid glob `{pattern}`: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// A compiled set of glob patterns (any-of semantics).
#[derive(Debug, Clone, Default)]
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

impl GlobSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            for expanded in expand_braces(raw) {
                let expanded = expanded.trim_start_matches("./");
                let pattern = Pattern::new(expanded).map_err(|e| PatternError {
                    pattern: raw.to_string(),
                    message: e.msg.to_string(),
                })?;
                compiled.push(pattern);
            }
        }
        Ok(Self { patterns: compiled })
    }

    /// Whether any pattern matches the relative path itself.
    pub fn is_match(&self, rel: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(rel, MATCH_OPTIONS))
    }

    /// Whether any pattern matches the path or one of its ancestor
    /// directories (`dist` also covers `dist/css/a.css`).
    pub fn is_match_hierarchical(&self, rel: &str) -> bool {
        if self.is_match(rel) {
            return true;
        }
        rel.match_indices('/')
            .any(|(idx, _)| self.is_match(&rel[..idx]))
    }
}

/// Expand `{a,b}` alternatives, including nested and repeated groups.
///
/// A pattern without a (balanced) group is returned unchanged.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut commas = Vec::new();
    for (idx, ch) in pattern[open..].char_indices() {
        let idx = open + idx;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut bounds = vec![open];
    bounds.extend(&commas);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alt = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{prefix}{alt}{suffix}"))
        })
        .collect()
}
