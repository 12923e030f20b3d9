//! Vendor prefixing for the configured browser targets.

use lightningcss::targets::{Browsers, Targets};

use super::{Transform, TransformError, text_of};
use crate::asset::AssetFile;
use crate::asset::css::prefix_css;

pub struct Prefix {
    browsers: Browsers,
}

impl Prefix {
    pub fn new(browsers: Browsers) -> Self {
        Self { browsers }
    }
}

impl Transform for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let filename = file.path.display().to_string();
        let css = prefix_css(
            text_of(self.name(), &file)?,
            &filename,
            Targets::from(self.browsers),
        )
        .map_err(|e| TransformError::new(self.name(), &file, e.message).with_line(e.line))?;
        file.set_text(css);
        Ok(file)
    }
}
