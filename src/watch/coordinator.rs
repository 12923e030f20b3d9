//! Stage trigger bookkeeping for watch mode.
//!
//! Each stage is either idle or running. A change that hits a running stage
//! marks one pending re-run; further changes while it is pending fold into
//! that same re-run.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::pipeline::{PipelineStage, StageName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    Idle,
    Running { pending: bool },
}

pub struct Coordinator {
    stages: Vec<Arc<PipelineStage>>,
    states: FxHashMap<StageName, StageState>,
}

impl Coordinator {
    pub fn new(stages: Vec<Arc<PipelineStage>>) -> Self {
        let states = stages.iter().map(|s| (s.name, StageState::Idle)).collect();
        Self { stages, states }
    }

    pub fn stage(&self, name: StageName) -> Option<&Arc<PipelineStage>> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Stages to start now for a batch of changed paths.
    ///
    /// A stage matched by several paths of the batch is triggered once.
    pub fn on_changes<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> Vec<StageName> {
        let paths: Vec<&Path> = paths.into_iter().collect();
        let hit: Vec<StageName> = self
            .stages
            .iter()
            .filter(|stage| paths.iter().any(|p| stage.watches(p)))
            .map(|stage| stage.name)
            .collect();

        hit.into_iter().filter(|name| self.trigger(*name)).collect()
    }

    /// Mark `stage` started, returning whether the caller should launch it.
    fn trigger(&mut self, stage: StageName) -> bool {
        let Some(state) = self.states.get_mut(&stage) else {
            return false;
        };
        let start = *state == StageState::Idle;
        *state = StageState::Running { pending: !start };
        start
    }

    /// Record a finished run. Returns `true` when a pending re-run should
    /// start now (the stage stays running).
    pub fn on_finished(&mut self, stage: StageName) -> bool {
        let Some(state) = self.states.get_mut(&stage) else {
            return false;
        };
        match *state {
            StageState::Running { pending: true } => {
                *state = StageState::Running { pending: false };
                true
            }
            _ => {
                *state = StageState::Idle;
                false
            }
        }
    }

    /// Whether any stage is running.
    pub fn is_busy(&self) -> bool {
        self.states.values().any(|s| *s != StageState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::{FileSetRule, GlobSet};
    use std::path::PathBuf;

    fn stage(name: StageName, dir: &str, watch: &str) -> Arc<PipelineStage> {
        Arc::new(
            PipelineStage::new(
                name,
                PathBuf::from(dir),
                FileSetRule::default(),
                PathBuf::from("/site/dist"),
            )
            .with_watch(GlobSet::new([watch]).unwrap()),
        )
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(vec![
            stage(StageName::Styles, "/site/src/styles", "**/*.scss"),
            stage(StageName::Scripts, "/site/src/js", "**/*.js"),
        ])
    }

    #[test]
    fn test_change_maps_to_matching_stage() {
        let mut c = coordinator();
        assert_eq!(
            c.on_changes([Path::new("/site/src/styles/_vars.scss")]),
            vec![StageName::Styles]
        );
        assert!(c.on_changes([Path::new("/site/README.md")]).is_empty());
    }

    #[test]
    fn test_events_while_running_coalesce() {
        let mut c = coordinator();
        let path = Path::new("/site/src/js/app.js");

        assert_eq!(c.on_changes([path]), vec![StageName::Scripts]);
        // three more saves while the first run is in flight
        for _ in 0..3 {
            assert!(c.on_changes([path]).is_empty());
        }

        // exactly one re-run
        assert!(c.on_finished(StageName::Scripts));
        assert!(!c.on_finished(StageName::Scripts));
        assert!(!c.is_busy());
    }

    #[test]
    fn test_batch_triggers_each_stage_once() {
        let mut c = coordinator();
        let started = c.on_changes([
            Path::new("/site/src/js/a.js"),
            Path::new("/site/src/js/b.js"),
            Path::new("/site/src/styles/main.scss"),
        ]);
        assert_eq!(started, vec![StageName::Styles, StageName::Scripts]);
        assert!(!c.on_finished(StageName::Styles));
        assert!(!c.on_finished(StageName::Scripts));
    }

    #[test]
    fn test_stages_are_independent() {
        let mut c = coordinator();
        c.on_changes([Path::new("/site/src/js/a.js")]);
        assert_eq!(
            c.on_changes([Path::new("/site/src/styles/a.scss")]),
            vec![StageName::Styles]
        );
        assert!(c.is_busy());
    }
}
