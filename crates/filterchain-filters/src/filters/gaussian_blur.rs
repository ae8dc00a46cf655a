use anyhow::{Result, ensure};
use filterchain_core::{Filter, ImageBuf};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian blur for noise reduction. Works on every pixel layout.
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    pub sigma: f32,
}

impl GaussianBlur {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl Filter<ImageBuf> for GaussianBlur {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        // imageproc panics on a non-positive sigma
        ensure!(
            self.sigma.is_finite() && self.sigma > 0.0,
            "GaussianBlur sigma must be positive, got {}",
            self.sigma
        );
        let blurred = match image {
            ImageBuf::Gray(img) => ImageBuf::Gray(gaussian_blur_f32(img, self.sigma)),
            ImageBuf::Rgb(img) => ImageBuf::Rgb(gaussian_blur_f32(img, self.sigma)),
            ImageBuf::Rgba(img) => ImageBuf::Rgba(gaussian_blur_f32(img, self.sigma)),
        };
        Ok(blurred)
    }
}
