//! Asset records, scanning and the content processors stages build on.

pub mod css;
mod file;
mod kind;
pub mod minify;
mod scan;

pub use file::AssetFile;
pub use kind::ContentType;
pub use scan::{load_asset, scan_sources};
