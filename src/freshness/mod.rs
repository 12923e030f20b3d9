//! Freshness detection by modification time.

pub mod mtime;

pub use mtime::{get_mtime, is_output_fresh};
