use anyhow::Result;
use filterchain_core::{Filter, ImageBuf};

/// Collapses color images to BT.709 luminance, dropping alpha.
///
/// Grayscale input comes back as an unchanged copy, so a pipeline that
/// starts with this stage accepts gray files too.
pub struct Grayscale;

impl Filter<ImageBuf> for Grayscale {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        Ok(ImageBuf::Gray(image.to_luma8()))
    }
}
