use anyhow::{Result, bail};
use filterchain_core::{Filter, ImageBuf};
use image::{GrayImage, Luma};
use imageproc::gradients::sobel_gradients;

/// Sobel gradient magnitude, saturated to 8 bits.
pub struct SobelEdges;

impl Filter<ImageBuf> for SobelEdges {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        let ImageBuf::Gray(gray) = image else {
            bail!("SobelEdges expects a grayscale image, got {:?}", image.format());
        };
        let gradients = sobel_gradients(gray);
        let edges = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([gradients.get_pixel(x, y)[0].min(255) as u8])
        });
        Ok(ImageBuf::Gray(edges))
    }
}
