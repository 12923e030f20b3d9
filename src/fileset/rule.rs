//! Ordered include/exclude rules.

use super::pattern::{GlobSet, PatternError};

/// Compiled file-set rules.
///
/// Patterns are given in order; a leading `!` turns a pattern into an
/// exclusion. Exclusions are applied after every inclusion and always win,
/// whatever their position in the list.
#[derive(Debug, Clone, Default)]
pub struct FileSetRule {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileSetRule {
    pub fn parse<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_prefix('!') {
                Some(negated) => exclude.push(negated.to_string()),
                None => include.push(pattern.to_string()),
            }
        }
        Ok(Self {
            include: GlobSet::new(&include)?,
            exclude: GlobSet::new(&exclude)?,
        })
    }

    /// Build from separate include and exclude lists (stage sources).
    pub fn from_parts<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            include: GlobSet::new(include)?,
            exclude: GlobSet::new(exclude)?,
        })
    }

    pub fn exclude(&self) -> &GlobSet {
        &self.exclude
    }

    /// Whether a relative file path is selected by these rules.
    pub fn matches(&self, rel: &str) -> bool {
        self.include.is_match(rel) && !self.exclude.is_match_hierarchical(rel)
    }
}
