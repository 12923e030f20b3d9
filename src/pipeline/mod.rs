//! Asset build pipeline.
//!
//! A stage turns the files of one source directory into outputs through an
//! ordered list of transforms. Which transforms run depends on the
//! environment and is decided once per run, before any file is touched.
//!
//! # Architecture
//!
//! ```text
//! ProjectConfig ──define──▶ PipelineStage ──plan(env)──▶ StagePlan
//!                                                          │
//!     scan (sorted) ──▶ par_iter: load → steps… → write ◀──┘
//!                                                          │
//!                                                   StageReport
//! ```
//!
//! - `stage`: stage and step types, environment conditions
//! - `define`: the standard styles/scripts/images/fonts stages
//! - `run`: execution and failure reporting
//! - `transform`: the per-file transforms

mod define;
mod run;
mod stage;
pub mod transform;


pub use define::{define, enabled_stages};
pub use run::{PipelineError, StageReport, run};
pub use stage::{Condition, PipelineStage, StageName, StagePlan, Step};
