//! Deployment results.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Uploaded,
    /// Remote copy is at least as new as the local file.
    Skipped,
    Failed(String),
}

/// Per-file outcome of one deployment run, in upload order.
#[derive(Debug, Default)]
pub struct DeployReport {
    pub entries: Vec<(PathBuf, Outcome)>,
}

impl DeployReport {
    pub fn record(&mut self, path: PathBuf, outcome: Outcome) {
        self.entries.push((path, outcome));
    }

    pub fn uploaded(&self) -> impl Iterator<Item = &PathBuf> {
        self.with(|o| *o == Outcome::Uploaded)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PathBuf> {
        self.with(|o| *o == Outcome::Skipped)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.entries.iter().filter_map(|(path, outcome)| match outcome {
            Outcome::Failed(message) => Some((path, message.as_str())),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// `3 uploaded, 12 up to date, 1 failed`
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} uploaded, {} up to date",
            self.uploaded().count(),
            self.skipped().count()
        );
        let failed = self.failures().count();
        if failed > 0 {
            summary.push_str(&format!(", {failed} failed"));
        }
        summary
    }

    fn with(&self, pred: impl Fn(&Outcome) -> bool) -> impl Iterator<Item = &PathBuf> {
        self.entries
            .iter()
            .filter(move |(_, outcome)| pred(outcome))
            .map(|(path, _)| path)
    }
}
