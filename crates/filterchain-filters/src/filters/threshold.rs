use anyhow::{Result, bail};
use filterchain_core::{Filter, ImageBuf};
use imageproc::contrast::{ThresholdType, threshold};

/// Binarizes a grayscale image: pixels brighter than `level` become 255,
/// the rest 0.
#[derive(Debug, Clone)]
pub struct Threshold {
    pub level: u8,
}

impl Threshold {
    pub fn new(level: u8) -> Self {
        Self { level }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self { level: 128 }
    }
}

impl Filter<ImageBuf> for Threshold {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        match image {
            ImageBuf::Gray(gray) => Ok(ImageBuf::Gray(threshold(
                gray,
                self.level,
                ThresholdType::Binary,
            ))),
            other => bail!(
                "Threshold expects a grayscale image, got {:?}",
                other.format()
            ),
        }
    }
}
