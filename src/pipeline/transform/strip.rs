//! Debug statement removal.

use super::{Transform, TransformError, text_of};
use crate::asset::AssetFile;
use crate::asset::minify::strip_debug_js;

/// Drop `console.*` calls and `debugger` statements.
pub struct StripDebug;

impl Transform for StripDebug {
    fn name(&self) -> &'static str {
        "strip-debug"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let js = strip_debug_js(text_of(self.name(), &file)?)
            .map_err(|e| TransformError::new(self.name(), &file, e))?;
        file.set_text(js);
        Ok(file)
    }
}
