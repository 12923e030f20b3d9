//! Core types - pure abstractions shared across the codebase.

pub mod env;
mod state;

pub use env::{Environment, EnvironmentContext, EnvironmentUndefined, Requirement};
pub use state::{register_watch, setup_shutdown_handler};
