//! `deploy` task.

use anyhow::{Context, Result};

use super::package::deployable_files;
use crate::config::ProjectConfig;
use crate::core::EnvironmentContext;
use crate::deploy::{DeploymentTarget, Transport, deploy as upload, transport_for};
use crate::log;

/// Where `deploy` uploads to, resolved before any task runs.
pub struct Remote {
    pub target: DeploymentTarget,
    transport: Box<dyn Transport>,
}

/// Resolve the target of the current environment and check its transport.
pub fn connect(config: &ProjectConfig, env: &EnvironmentContext) -> Result<Remote> {
    let target = config.deploy.target_for(env.environment(), config.root())?;
    let transport = transport_for(&target)?;
    Ok(Remote { target, transport })
}

/// Upload the deployable file set.
///
/// Per-file failures are listed but do not fail the task.
pub fn deploy(config: &ProjectConfig, remote: &Remote) -> Result<()> {
    let files = deployable_files(config)?;
    let report = upload(config.root(), &files, &remote.target, remote.transport.as_ref())
        .with_context(|| format!("deploy to {} aborted", remote.target.display()))?;

    if report.has_failures() {
        log!("deploy"; "failed uploads:");
        for (path, message) in report.failures() {
            eprintln!("- {}: {}", path.display(), message);
        }
    }
    Ok(())
}
