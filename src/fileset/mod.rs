//! Deployment file-set resolution.
//!
//! Decides which files of the project are eligible for packaging and upload:
//! ordered glob rules (`!` for exclusion) over the project tree, minus a
//! fixed set of protected paths.

mod pattern;
mod resolve;
mod rule;

pub use pattern::{GlobSet, PatternError};
pub use resolve::{ProtectedPaths, resolve};
pub use rule::FileSetRule;
