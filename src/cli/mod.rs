//! Command-line interface module.
//!
//! Resolves the environment and configuration once, expands the requested
//! entry into a task graph and runs it.

mod args;
mod build;
mod clean;
mod deploy;
mod package;

pub use args::{Cli, Commands};

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ProjectConfig;
use crate::core::{EnvironmentContext, env};
use crate::pipeline::{self, PipelineStage, StageName};
use crate::task::{Entry, TaskName};
use crate::{debug, log};
use deploy::Remote;

/// Everything a task needs, shared read-only by the tasks of a graph.
pub struct TaskContext {
    pub config: Arc<ProjectConfig>,
    pub env: EnvironmentContext,
    /// All four stages, fonts included
    stages: Vec<PipelineStage>,
    /// Stages `build` and `watch` cover
    enabled: Vec<StageName>,
    remote: Option<Remote>,
}

impl TaskContext {
    pub fn new(
        config: Arc<ProjectConfig>,
        env: EnvironmentContext,
        remote: Option<Remote>,
    ) -> Result<Self> {
        let stages = StageName::ALL
            .into_iter()
            .map(|name| pipeline::define(&config, name, &env))
            .collect::<Result<Vec<_>>>()?;
        let enabled = pipeline::enabled_stages(&config);
        Ok(Self {
            config,
            env,
            stages,
            enabled,
            remote,
        })
    }

    fn stage(&self, name: StageName) -> Result<&PipelineStage> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .with_context(|| format!("stage `{name}` is not defined"))
    }

    fn enabled_stages(&self) -> Vec<PipelineStage> {
        self.stages
            .iter()
            .filter(|s| self.enabled.contains(&s.name))
            .cloned()
            .collect()
    }

    /// Run one node of the task graph.
    pub fn run(&self, task: TaskName) -> Result<()> {
        debug!("task"; "start {task}");
        match task {
            TaskName::Clean => clean::clean(&self.config),
            TaskName::Stage(name) => build::run_stage(self.stage(name)?, &self.env),
            TaskName::Package => package::package(&self.config).map(|_| ()),
            TaskName::Deploy => {
                let remote = self.remote.as_ref().context("no deployment target resolved")?;
                deploy::deploy(&self.config, remote)
            }
            TaskName::Watch => crate::watch::watch(self.enabled_stages(), self.env),
        }
    }
}

/// Run the command line.
pub fn run(cli: &Cli) -> Result<()> {
    let entry = cli.entry();

    let mut flags = cli.env_flags();
    flags.extend(entry.implied_flag());
    let env = env::resolve(flags, entry.requirement(), entry.name())?;

    let config = Arc::new(ProjectConfig::load(&cli.config)?);
    debug!("config"; "root: {}", config.root().display());
    log!("sluice"; "{} ({})", entry.name(), env.environment());

    // a missing target must fail before `clean` touches the outputs
    let remote = match entry {
        Entry::Deploy => {
            let remote = deploy::connect(&config, &env)?;
            debug!("deploy"; "target: {}", remote.target.display());
            Some(remote)
        }
        _ => None,
    };

    let ctx = TaskContext::new(config, env, remote)?;
    entry
        .plan(&ctx.enabled)
        .execute(|task| ctx.run(task).with_context(|| format!("task `{task}` failed")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sluice.toml"), config).unwrap();
        fs::create_dir_all(dir.path().join("dist/css")).unwrap();
        fs::write(dir.path().join("dist/css/keep.css"), "a{}").unwrap();
        dir
    }

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let config = dir.path().join("sluice.toml");
        let mut argv = vec!["sluice", "-C", config.to_str().unwrap()];
        argv.extend(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_deploy_without_target_leaves_outputs() {
        let dir = project("");
        let err = run(&cli(&dir, &["--production", "deploy"])).unwrap_err();

        assert!(format!("{err:#}").contains("no deployment target for `production`"));
        assert!(dir.path().join("dist/css/keep.css").is_file());
    }

    #[test]
    fn test_deploy_with_unavailable_transport_leaves_outputs() {
        let dir = project(
            "[deploy.targets.staging]\nprotocol = \"local\"\nremote_root = \"/nonexistent/sluice\"\n",
        );
        let err = run(&cli(&dir, &["--staging", "deploy"])).unwrap_err();

        assert!(format!("{err:#}").contains("not available"));
        assert!(dir.path().join("dist/css/keep.css").is_file());
    }

    #[test]
    fn test_deploy_needs_environment() {
        let dir = project("");
        assert!(run(&cli(&dir, &["deploy"])).is_err());
        assert!(dir.path().join("dist/css/keep.css").is_file());
    }
}
