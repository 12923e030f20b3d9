//! Image optimization.
//!
//! PNGs are re-encoded losslessly at the highest compression level. JPEGs
//! are re-encoded only when a quality is configured. A re-encoded image is
//! kept only when it is smaller than the original; every other format is
//! passed through untouched.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use super::{Transform, TransformError};
use crate::asset::AssetFile;

pub struct OptimizeImage {
    jpeg_quality: Option<u8>,
}

impl OptimizeImage {
    pub fn new(jpeg_quality: Option<u8>) -> Self {
        Self {
            jpeg_quality: jpeg_quality.map(|q| q.clamp(1, 100)),
        }
    }

    fn reencode(&self, format: ImageFormat, img: &DynamicImage) -> image::ImageResult<Option<Vec<u8>>> {
        let mut out = Vec::new();
        match format {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut out),
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color().into())?;
            }
            ImageFormat::Jpeg => {
                let Some(quality) = self.jpeg_quality else {
                    return Ok(None);
                };
                let rgb = img.to_rgb8();
                JpegEncoder::new_with_quality(Cursor::new(&mut out), quality).write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
            _ => return Ok(None),
        }
        Ok(Some(out))
    }
}

impl Transform for OptimizeImage {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let format = match file.extension().as_deref() {
            Some("png") => ImageFormat::Png,
            Some("jpg" | "jpeg") if self.jpeg_quality.is_some() => ImageFormat::Jpeg,
            _ => return Ok(file),
        };

        let img = image::load_from_memory_with_format(&file.contents, format)
            .map_err(|e| TransformError::new(self.name(), &file, e.to_string()))?;
        let encoded = self
            .reencode(format, &img)
            .map_err(|e| TransformError::new(self.name(), &file, e.to_string()))?;

        if let Some(encoded) = encoded
            && encoded.len() < file.contents.len()
        {
            crate::debug!("images"; "{}: {} -> {} bytes", file.path.display(), file.contents.len(), encoded.len());
            file.contents = encoded;
        }
        Ok(file)
    }
}
