//! Production minification.

use lightningcss::targets::{Browsers, Targets};

use super::{Transform, TransformError, text_of};
use crate::asset::AssetFile;
use crate::asset::minify::{minify_css, minify_js};

/// Minify a stylesheet with lightningcss.
pub struct MinifyCss {
    browsers: Browsers,
}

impl MinifyCss {
    pub fn new(browsers: Browsers) -> Self {
        Self { browsers }
    }
}

impl Transform for MinifyCss {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let filename = file.path.display().to_string();
        let css = minify_css(
            text_of(self.name(), &file)?,
            &filename,
            Targets::from(self.browsers),
        )
        .map_err(|e| TransformError::new(self.name(), &file, e.message).with_line(e.line))?;
        file.set_text(css);
        Ok(file)
    }
}

/// Minify a script with oxc (compress + mangle).
pub struct MinifyJs;

impl Transform for MinifyJs {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let js = minify_js(text_of(self.name(), &file)?)
            .map_err(|e| TransformError::new(self.name(), &file, e))?;
        file.set_text(js);
        Ok(file)
    }
}
