//! Utility modules.

pub mod date;
pub mod exec;
pub mod path;
