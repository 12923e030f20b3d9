//! Tasks and the graphs the entry commands expand to.
//!
//! | Entry        | Graph                                          |
//! |--------------|------------------------------------------------|
//! | `clean`      | clean                                          |
//! | `<stage>`    | the stage alone                                |
//! | `watch`      | watch                                          |
//! | `build`      | clean → stages                                 |
//! | `production` | `build` with the production environment        |
//! | `package`    | clean → stages → package                       |
//! | `deploy`     | clean → stages → deploy                        |
//! | `default`    | stages → watch                                 |
//!
//! "stages" is styles, scripts and images, plus fonts when enabled.

mod graph;

pub use graph::{GraphError, TaskGraph};

use std::fmt;

use crate::core::Requirement;
use crate::pipeline::StageName;

/// A node of the task graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskName {
    Clean,
    Stage(StageName),
    Package,
    Deploy,
    Watch,
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => f.write_str("clean"),
            Self::Stage(stage) => stage.fmt(f),
            Self::Package => f.write_str("package"),
            Self::Deploy => f.write_str("deploy"),
            Self::Watch => f.write_str("watch"),
        }
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Clean,
    Stage(StageName),
    Watch,
    Build,
    Production,
    Package,
    Deploy,
    Default,
}

impl Entry {
    pub fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Stage(stage) => stage.as_str(),
            Self::Watch => "watch",
            Self::Build => "build",
            Self::Production => "production",
            Self::Package => "package",
            Self::Deploy => "deploy",
            Self::Default => "default",
        }
    }

    /// Whether the entry refuses to guess an environment.
    pub fn requirement(self) -> Requirement {
        match self {
            Self::Deploy => Requirement::Required,
            _ => Requirement::Optional,
        }
    }

    /// Environment flag the entry adds on its own.
    pub fn implied_flag(self) -> Option<&'static str> {
        match self {
            Self::Production => Some("production"),
            _ => None,
        }
    }

    /// Expand into a task graph; `enabled` are the stages "stages" stands
    /// for.
    pub fn plan(self, enabled: &[StageName]) -> TaskGraph<TaskName> {
        let stages: Vec<TaskName> = enabled.iter().copied().map(TaskName::Stage).collect();

        let mut graph = TaskGraph::new();
        match self {
            Self::Clean => {
                graph.add(TaskName::Clean, &[]);
            }
            Self::Stage(stage) => {
                graph.add(TaskName::Stage(stage), &[]);
            }
            Self::Watch => {
                graph.add(TaskName::Watch, &[]);
            }
            Self::Build | Self::Production => add_build(&mut graph, &stages),
            Self::Package => {
                add_build(&mut graph, &stages);
                graph.add(TaskName::Package, &stages);
            }
            Self::Deploy => {
                add_build(&mut graph, &stages);
                graph.add(TaskName::Deploy, &stages);
            }
            Self::Default => {
                graph.add(TaskName::Watch, &stages);
            }
        }
        graph
    }
}

fn add_build(graph: &mut TaskGraph<TaskName>, stages: &[TaskName]) {
    for stage in stages {
        graph.add(*stage, &[TaskName::Clean]);
    }
}
