//! Stage tasks.

use anyhow::Result;

use crate::core::EnvironmentContext;
use crate::pipeline::{self, PipelineStage};

/// Run one stage.
///
/// Per-file failures were already reported by the pipeline; they only fail
/// the task when the stage has `fail_on_error` set.
pub fn run_stage(stage: &PipelineStage, env: &EnvironmentContext) -> Result<()> {
    pipeline::run(stage, env)?;
    Ok(())
}
