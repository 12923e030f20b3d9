//! Development source maps.
//!
//! The map embeds the original source (`sourcesContent`) so browser devtools
//! can show it, and the output gets a `sourceMappingURL` comment pointing at
//! `<output>.map`. Mappings stay empty: the preprocessor runs without its
//! own map output.

use serde_json::json;

use super::{Transform, TransformError};
use crate::asset::AssetFile;

pub struct SourceMap;

impl Transform for SourceMap {
    fn name(&self) -> &'static str {
        "sourcemap"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let original = std::fs::read_to_string(&file.source)
            .map_err(|e| TransformError::new(self.name(), &file, e.to_string()))?;

        let output_name = file.file_name();
        let source_name = file
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let map = json!({
            "version": 3,
            "file": output_name,
            "sources": [source_name],
            "sourcesContent": [original],
            "names": [],
            "mappings": "",
        });

        let comment = format!("\n/*# sourceMappingURL={output_name}.map */\n");
        file.contents.extend_from_slice(comment.as_bytes());
        file.source_map = Some(map.to_string());
        Ok(file)
    }
}
