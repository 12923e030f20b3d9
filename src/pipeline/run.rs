//! Stage execution.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use super::stage::{PipelineStage, StageName, StagePlan};
use super::transform::TransformError;
use crate::asset::{AssetFile, load_asset, scan_sources};
use crate::core::EnvironmentContext;
use crate::freshness::{get_mtime, is_output_fresh};
use crate::{debug, log};

/// What happened to the inputs of one stage run.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: StageName,
    /// Written outputs, relative to the output directory (maps included)
    pub written: Vec<PathBuf>,
    /// Inputs skipped because their output is up to date
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<TransformError>,
}

impl StageReport {
    fn new(stage: StageName) -> Self {
        Self {
            stage,
            written: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary for logs and the watch status line.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} written", self.written.len())];
        if !self.skipped.is_empty() {
            parts.push(format!("{} up to date", self.skipped.len()));
        }
        if !self.failures.is_empty() {
            parts.push(format!("{} failed", self.failures.len()));
        }
        format!("{}: {}", self.stage, parts.join(", "))
    }
}

/// A stage run that could not complete.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage}: {} file(s) failed", failures.len())]
    Failed {
        stage: StageName,
        failures: Vec<TransformError>,
    },
    #[error("{stage}: cannot create {}: {source}", path.display())]
    Output {
        stage: StageName,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

enum Outcome {
    Written(Vec<PathBuf>),
    Skipped(PathBuf),
    Failed(TransformError),
}

/// Run one stage in `env`.
///
/// Every selected input goes through the planned steps in order; inputs are
/// processed in parallel and reported in sorted input order. A failing input
/// produces no output and does not affect the others. The run fails only
/// when the stage has `fail_on_error` set and at least one input failed.
pub fn run(stage: &PipelineStage, env: &EnvironmentContext) -> Result<StageReport, PipelineError> {
    let plan = stage.plan(env);
    let inputs = scan_sources(&stage.source_dir, &stage.inputs);
    debug!(stage.name.as_str(); "{} input(s), steps: {}", inputs.len(), plan.names().join(" -> "));

    std::fs::create_dir_all(&stage.output_dir).map_err(|source| PipelineError::Output {
        stage: stage.name,
        path: stage.output_dir.clone(),
        source,
    })?;

    let outcomes: Vec<Outcome> = inputs
        .par_iter()
        .map(|rel| process_one(stage, &plan, rel))
        .collect();

    let mut report = StageReport::new(stage.name);
    for outcome in outcomes {
        match outcome {
            Outcome::Written(paths) => report.written.extend(paths),
            Outcome::Skipped(path) => report.skipped.push(path),
            Outcome::Failed(err) => {
                let file = stage.source_dir.join(&err.path);
                crate::logger::report_failure(
                    &format!("{}/{}", stage.name, err.transform),
                    &err.message,
                    &file.display().to_string(),
                    err.line,
                );
                report.failures.push(err);
            }
        }
    }

    log!(stage.name.as_str(); "{}", report.summary());

    if stage.fail_on_error && !report.failures.is_empty() {
        return Err(PipelineError::Failed {
            stage: stage.name,
            failures: report.failures,
        });
    }
    Ok(report)
}

fn process_one(stage: &PipelineStage, plan: &StagePlan, rel: &Path) -> Outcome {
    if stage.incremental {
        let source_mtime = get_mtime(&stage.source_dir.join(rel));
        if is_output_fresh(&stage.output_dir.join(rel), source_mtime) {
            return Outcome::Skipped(rel.to_path_buf());
        }
    }

    let file = match load_asset(&stage.source_dir, rel, stage.name.content_type()) {
        Ok(file) => file,
        Err(e) => return Outcome::Failed(io_failure("read", rel, &e)),
    };

    let file = match plan
        .steps
        .iter()
        .try_fold(file, |file, transform| transform.apply(file))
    {
        Ok(file) => file,
        Err(err) => return Outcome::Failed(err),
    };

    match write_output(&stage.output_dir, &file) {
        Ok(written) => {
            debug!(stage.name.as_str(); "{} {} -> {}", file.kind.label(), rel.display(), file.path.display());
            Outcome::Written(written)
        }
        Err(e) => Outcome::Failed(io_failure("write", rel, &e)),
    }
}

/// Write the output (and its source map) under `output_dir`.
fn write_output(output_dir: &Path, file: &AssetFile) -> io::Result<Vec<PathBuf>> {
    let target = output_dir.join(&file.path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, &file.contents)?;

    let mut written = vec![file.path.clone()];
    if let Some(map) = &file.source_map {
        let mut map_path = file.path.clone().into_os_string();
        map_path.push(".map");
        let map_path = PathBuf::from(map_path);
        std::fs::write(output_dir.join(&map_path), map)?;
        written.push(map_path);
    }
    Ok(written)
}

fn io_failure(transform: &'static str, rel: &Path, err: &io::Error) -> TransformError {
    TransformError {
        transform,
        path: rel.to_path_buf(),
        line: None,
        message: err.to_string(),
    }
}
