//! Stage definitions and planning.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::transform::Transform;
use crate::asset::ContentType;
use crate::core::EnvironmentContext;
use crate::fileset::{FileSetRule, GlobSet};

/// The standard asset stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageName {
    Styles,
    Scripts,
    Images,
    Fonts,
}

impl StageName {
    pub const ALL: [Self; 4] = [Self::Styles, Self::Scripts, Self::Images, Self::Fonts];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Fonts => "fonts",
        }
    }

    pub const fn content_type(self) -> ContentType {
        match self {
            Self::Styles => ContentType::Style,
            Self::Scripts => ContentType::Script,
            Self::Images => ContentType::Image,
            Self::Fonts => ContentType::Font,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// Optimized builds (production and staging)
    Production,
    /// Development builds only
    Development,
}

impl Condition {
    pub const fn applies(self, env: &EnvironmentContext) -> bool {
        match self {
            Self::Always => true,
            Self::Production => !env.is_development(),
            Self::Development => env.is_development(),
        }
    }
}

/// One transform with its environment condition.
#[derive(Clone)]
pub struct Step {
    pub transform: Arc<dyn Transform>,
    pub when: Condition,
}

impl Step {
    pub fn always(transform: impl Transform + 'static) -> Self {
        Self::new(transform, Condition::Always)
    }

    pub fn production(transform: impl Transform + 'static) -> Self {
        Self::new(transform, Condition::Production)
    }

    pub fn development(transform: impl Transform + 'static) -> Self {
        Self::new(transform, Condition::Development)
    }

    fn new(transform: impl Transform + 'static, when: Condition) -> Self {
        Self {
            transform: Arc::new(transform),
            when,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("transform", &self.transform.name())
            .field("when", &self.when)
            .finish()
    }
}

/// An asset stage: which files, where they go, what happens to them.
///
/// Immutable once built from configuration.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub name: StageName,
    /// Absolute source directory
    pub source_dir: PathBuf,
    /// Inputs, relative to `source_dir`
    pub inputs: FileSetRule,
    /// Paths (relative to `source_dir`) that trigger a re-run in watch mode
    pub watch: GlobSet,
    /// Absolute output directory
    pub output_dir: PathBuf,
    pub steps: Vec<Step>,
    /// Skip inputs whose output is newer than the source
    pub incremental: bool,
    /// Turn per-file failures into a failed run
    pub fail_on_error: bool,
}

impl PipelineStage {
    pub fn new(name: StageName, source_dir: PathBuf, inputs: FileSetRule, output_dir: PathBuf) -> Self {
        Self {
            name,
            source_dir,
            inputs,
            watch: GlobSet::default(),
            output_dir,
            steps: Vec::new(),
            incremental: false,
            fail_on_error: false,
        }
    }

    pub fn with_watch(mut self, watch: GlobSet) -> Self {
        self.watch = watch;
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Select the steps that run in `env`, in declared order.
    pub fn plan(&self, env: &EnvironmentContext) -> StagePlan {
        StagePlan {
            steps: self
                .steps
                .iter()
                .filter(|step| step.when.applies(env))
                .map(|step| Arc::clone(&step.transform))
                .collect(),
        }
    }

    /// Whether a changed path (absolute or relative to the source directory)
    /// falls under this stage's watch globs.
    pub fn watches(&self, path: &Path) -> bool {
        let rel = match path.strip_prefix(&self.source_dir) {
            Ok(rel) => rel,
            Err(_) if path.is_absolute() => return false,
            Err(_) => path,
        };
        self.watch.is_match(&crate::utils::path::to_slash(rel))
    }
}

/// The transforms one stage run applies, in order.
pub struct StagePlan {
    pub steps: Vec<Arc<dyn Transform>>,
}

impl StagePlan {
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|t| t.name()).collect()
    }
}
