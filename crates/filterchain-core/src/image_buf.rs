use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Channel layout of an [`ImageBuf`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// 8-bit pixel buffer passed between pipeline stages.
///
/// Each variant exclusively owns its pixel storage; dropping the buffer
/// releases it. Stages never mutate their input, they return a new buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageBuf {
    Gray(GrayImage),
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl ImageBuf {
    /// Zero-filled buffer of the given size and layout.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        match format {
            PixelFormat::Gray8 => Self::Gray(GrayImage::new(width, height)),
            PixelFormat::Rgb8 => Self::Rgb(RgbImage::new(width, height)),
            PixelFormat::Rgba8 => Self::Rgba(RgbaImage::new(width, height)),
        }
    }

    /// Wrap tightly packed pixel bytes, validating the length against the geometry.
    pub fn from_data(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(format.channels()))
            .ok_or_else(|| {
                Error::InvalidBitmap(format!("{width}x{height} {format:?} does not fit in memory"))
            })?;
        if data.len() != expected {
            return Err(Error::InvalidBitmap(format!(
                "expected {expected} bytes for {width}x{height} {format:?}, got {}",
                data.len()
            )));
        }
        let buf = match format {
            PixelFormat::Gray8 => GrayImage::from_raw(width, height, data).map(Self::Gray),
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, data).map(Self::Rgb),
            PixelFormat::Rgba8 => RgbaImage::from_raw(width, height, data).map(Self::Rgba),
        };
        buf.ok_or_else(|| Error::InvalidBitmap(format!("{width}x{height} {format:?} buffer rejected")))
    }

    pub fn width(&self) -> u32 {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
            Self::Rgba(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
            Self::Rgba(img) => img.height(),
        }
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Gray(_) => PixelFormat::Gray8,
            Self::Rgb(_) => PixelFormat::Rgb8,
            Self::Rgba(_) => PixelFormat::Rgba8,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Interleaved pixel bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Gray(img) => img.as_raw(),
            Self::Rgb(img) => img.as_raw(),
            Self::Rgba(img) => img.as_raw(),
        }
    }

    /// Luminance view of the buffer. Color pixels are weighted with BT.709
    /// coefficients; alpha is ignored.
    pub fn to_luma8(&self) -> GrayImage {
        match self {
            Self::Gray(img) => img.clone(),
            Self::Rgb(img) => GrayImage::from_fn(img.width(), img.height(), |x, y| {
                let [r, g, b] = img.get_pixel(x, y).0;
                Luma([luminance(r, g, b)])
            }),
            Self::Rgba(img) => GrayImage::from_fn(img.width(), img.height(), |x, y| {
                let [r, g, b, _] = img.get_pixel(x, y).0;
                Luma([luminance(r, g, b)])
            }),
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        self.clone().into_dynamic()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img),
            Self::Rgb(img) => DynamicImage::ImageRgb8(img),
            Self::Rgba(img) => DynamicImage::ImageRgba8(img),
        }
    }
}

impl From<GrayImage> for ImageBuf {
    fn from(img: GrayImage) -> Self {
        Self::Gray(img)
    }
}

impl From<RgbImage> for ImageBuf {
    fn from(img: RgbImage) -> Self {
        Self::Rgb(img)
    }
}

impl From<RgbaImage> for ImageBuf {
    fn from(img: RgbaImage) -> Self {
        Self::Rgba(img)
    }
}

/// BT.709 luma of an 8-bit RGB triple.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}
