use anyhow::{Result, bail, ensure};
use filterchain_core::{Filter, ImageBuf};
use image::{GrayImage, Luma};

/// Linearly maps `[low, high]` onto `[0, 255]`, clamping outside the range.
#[derive(Debug, Clone)]
pub struct ContrastStretch {
    pub low: u8,
    pub high: u8,
}

impl ContrastStretch {
    pub fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    fn map(&self, value: u8) -> u8 {
        if value <= self.low {
            0
        } else if value >= self.high {
            255
        } else {
            let span = (self.high - self.low) as f32;
            ((value - self.low) as f32 * 255.0 / span).round() as u8
        }
    }
}

impl Filter<ImageBuf> for ContrastStretch {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        ensure!(
            self.low <= self.high,
            "ContrastStretch range is inverted: low {} > high {}",
            self.low,
            self.high
        );
        let ImageBuf::Gray(gray) = image else {
            bail!("ContrastStretch expects a grayscale image, got {:?}", image.format());
        };
        let stretched = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([self.map(gray.get_pixel(x, y)[0])])
        });
        Ok(ImageBuf::Gray(stretched))
    }
}
