//! Folding bursts of notify events into one batch of changed paths.
//!
//! Editors save in several steps (write temp, rename, touch). Events are
//! merged per path and the batch is released once no event arrived for
//! [`WINDOW`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use crate::utils::path::normalize_path;

pub(super) const WINDOW: Duration = Duration::from_millis(300);

/// Sleep used while nothing is pending.
const IDLE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Content-relevant kinds only; metadata and access events are `None`.
    fn of(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// What a path ends up as when `next` follows `pending`.
enum Merge {
    Keep,
    Replace(ChangeKind),
    Drop,
}

fn merge(pending: ChangeKind, next: ChangeKind) -> Merge {
    use ChangeKind::{Created, Modified, Removed};
    match (pending, next) {
        // deleted then restored (atomic save)
        (Removed, Created | Modified) => Merge::Replace(next),
        (Modified, Removed) => Merge::Replace(Removed),
        // never existed as far as the build is concerned
        (Created, Removed) => Merge::Drop,
        _ => Merge::Keep,
    }
}

pub(super) struct Debouncer {
    pending: FxHashMap<PathBuf, ChangeKind>,
    /// Time of the last event that changed `pending`
    last: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            last: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let Some(kind) = ChangeKind::of(&event.kind) else {
            return;
        };

        for path in event.paths.iter().filter(|p| !is_editor_artifact(p)) {
            let path = normalize_path(path);
            let merged = match self.pending.get(&path) {
                None => {
                    crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    Merge::Replace(kind)
                }
                Some(pending) => merge(*pending, kind),
            };
            match merged {
                Merge::Keep => continue,
                Merge::Replace(kind) => {
                    self.pending.insert(path, kind);
                }
                Merge::Drop => {
                    self.pending.remove(&path);
                }
            }
            self.last = Some(Instant::now());
        }
    }

    pub(super) fn is_ready(&self) -> bool {
        !self.pending.is_empty() && self.last.is_some_and(|t| t.elapsed() >= WINDOW)
    }

    /// The batch of changed paths, sorted, once the window has passed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last = None;
        let mut batch: Vec<PathBuf> = self.pending.drain().map(|(path, _)| path).collect();
        batch.sort();
        Some(batch)
    }

    /// How long the event loop may sleep before the batch can be ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.last {
            Some(t) => WINDOW
                .saturating_sub(t.elapsed())
                .max(Duration::from_millis(1)),
            None => IDLE,
        }
    }
}

/// Swap, backup and lock files written by editors (vim writes `4913` to
/// probe the directory).
fn is_editor_artifact(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    name == "4913"
        || name.starts_with(".#")
        || name.ends_with('~')
        || ["swp", "swo", "swx", "bak", "tmp", "crswap"].contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(paths: &[&str], kind: EventKind) -> notify::Event {
        let mut event = notify::Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    fn modify() -> EventKind {
        EventKind::Modify(ModifyKind::Data(DataChange::Any))
    }

    fn create() -> EventKind {
        EventKind::Create(CreateKind::File)
    }

    fn remove() -> EventKind {
        EventKind::Remove(RemoveKind::File)
    }

    #[test]
    fn test_empty_not_ready() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), IDLE);
    }

    #[test]
    fn test_dedup_per_path() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/s/a.scss", "/s/a.scss"], modify()));
        debouncer.add_event(&event(&["/s/a.scss"], modify()));
        debouncer.add_event(&event(&["/s/b.scss"], create()));
        assert_eq!(debouncer.pending.len(), 2);
        assert_eq!(debouncer.pending[Path::new("/s/b.scss")], ChangeKind::Created);
    }

    #[test]
    fn test_editor_artifacts_and_metadata_ignored() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/s/.a.scss.swp", "/s/a.scss~", "/s/4913"], modify()));
        debouncer.add_event(&event(
            &["/s/a.scss"],
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
        ));
        assert!(debouncer.pending.is_empty());
        assert!(debouncer.last.is_none());
    }

    #[test]
    fn test_merge_rules() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/s/new.js"], create()));
        debouncer.add_event(&event(&["/s/new.js"], remove()));
        assert!(debouncer.pending.is_empty());

        debouncer.add_event(&event(&["/s/a.js"], modify()));
        debouncer.add_event(&event(&["/s/a.js"], remove()));
        assert_eq!(debouncer.pending[Path::new("/s/a.js")], ChangeKind::Removed);

        debouncer.add_event(&event(&["/s/a.js"], create()));
        assert_eq!(debouncer.pending[Path::new("/s/a.js")], ChangeKind::Created);
    }

    #[test]
    fn test_batch_released_after_window() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/s/b.js", "/s/a.js"], modify()));
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.sleep_duration() <= WINDOW);

        debouncer.last = Some(Instant::now() - WINDOW - Duration::from_millis(10));
        assert_eq!(
            debouncer.take_if_ready(),
            Some(vec![PathBuf::from("/s/a.js"), PathBuf::from("/s/b.js")])
        );
        assert!(debouncer.pending.is_empty());
        assert!(!debouncer.is_ready());
    }
}
