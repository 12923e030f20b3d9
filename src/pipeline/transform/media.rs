//! Media query combining.

use super::{Transform, TransformError, text_of};
use crate::asset::AssetFile;
use crate::asset::css::combine_media_queries;

/// Merge `@media` blocks with identical queries and move them to the end of
/// the stylesheet.
pub struct CombineMediaQueries;

impl Transform for CombineMediaQueries {
    fn name(&self) -> &'static str {
        "combine-mq"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let filename = file.path.display().to_string();
        let css = combine_media_queries(text_of(self.name(), &file)?, &filename)
            .map_err(|e| TransformError::new(self.name(), &file, e.message).with_line(e.line))?;
        file.set_text(css);
        Ok(file)
    }
}
