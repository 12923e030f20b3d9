//! Configuration section definitions.
//!
//! Each module corresponds to sections in `sluice.toml`:
//!
//! | Module    | TOML Section                                     |
//! |-----------|--------------------------------------------------|
//! | `build`   | `[build]`                                        |
//! | `assets`  | `[styles]`, `[scripts]`, `[images]`, `[fonts]`   |
//! | `package` | `[package]`                                      |
//! | `deploy`  | `[deploy]`, `[deploy.targets.<env>]`             |

mod assets;
mod build;
mod deploy;
mod package;

pub use assets::{FontsConfig, ImagesConfig, ScriptsConfig, SourceSet, StylesConfig};
pub use build::BuildConfig;
pub use deploy::{DeployConfig, Protocol, TargetConfig};
pub use package::PackageConfig;
