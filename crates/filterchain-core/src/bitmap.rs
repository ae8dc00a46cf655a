//! Entry adapters that turn decoded bitmaps and raw pixel regions into
//! pipeline buffers.

use image::DynamicImage;

use crate::error::{Error, Result};
use crate::image_buf::{ImageBuf, PixelFormat};

/// Byte layout of a raw bitmap region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapFormat {
    Gray8,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
}

impl BitmapFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapFormat::Gray8 => 1,
            BitmapFormat::Rgb8 | BitmapFormat::Bgr8 => 3,
            BitmapFormat::Rgba8 | BitmapFormat::Bgra8 => 4,
        }
    }
}

/// Borrowed view of locked bitmap memory.
///
/// Rows are `stride` bytes apart; only the first `width * bytes_per_pixel`
/// bytes of each row are pixels.
#[derive(Clone, Copy, Debug)]
pub struct BitmapData<'a> {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: BitmapFormat,
    pub pixels: &'a [u8],
}

impl<'a> BitmapData<'a> {
    pub fn new(width: u32, height: u32, stride: usize, format: BitmapFormat, pixels: &'a [u8]) -> Self {
        Self {
            width,
            height,
            stride,
            format,
            pixels,
        }
    }

    /// Region without row padding.
    pub fn packed(width: u32, height: u32, format: BitmapFormat, pixels: &'a [u8]) -> Self {
        let stride = (width as usize).saturating_mul(format.bytes_per_pixel());
        Self::new(width, height, stride, format, pixels)
    }

    /// Checks the geometry against the pixel slice and returns the number of
    /// pixel bytes in one row.
    fn validate(&self) -> Result<usize> {
        let row_bytes = (self.width as usize)
            .checked_mul(self.format.bytes_per_pixel())
            .ok_or_else(|| {
                Error::InvalidBitmap(format!(
                    "a {}-pixel {:?} row does not fit in memory",
                    self.width, self.format
                ))
            })?;
        if self.stride < row_bytes {
            return Err(Error::InvalidBitmap(format!(
                "stride {} is shorter than a {}-pixel {:?} row ({row_bytes} bytes)",
                self.stride, self.width, self.format
            )));
        }
        let required = match self.height {
            0 => Some(0),
            h => self
                .stride
                .checked_mul(h as usize - 1)
                .and_then(|bytes| bytes.checked_add(row_bytes)),
        };
        let Some(required) = required else {
            return Err(Error::InvalidBitmap(format!(
                "{} rows of stride {} overflow the address space",
                self.height, self.stride
            )));
        };
        if self.pixels.len() < required {
            return Err(Error::InvalidBitmap(format!(
                "{}x{} {:?} region needs {required} bytes, got {}",
                self.width,
                self.height,
                self.format,
                self.pixels.len()
            )));
        }
        Ok(row_bytes)
    }

    /// Pixel bytes of each row, padding stripped. Geometry must have passed
    /// `validate`.
    fn rows(&self, row_bytes: usize) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let pixels = self.pixels;
        let stride = self.stride;
        (0..self.height as usize).map(move |row| {
            let start = row * stride;
            &pixels[start..start + row_bytes]
        })
    }
}

/// Conversion from platform bitmaps into a pipeline buffer.
pub trait FromBitmap: Sized {
    fn from_bitmap(bitmap: &DynamicImage) -> Result<Self>;
    fn from_bitmap_data(data: &BitmapData<'_>) -> Result<Self>;
}

impl FromBitmap for ImageBuf {
    fn from_bitmap(bitmap: &DynamicImage) -> Result<Self> {
        let buf = match bitmap {
            DynamicImage::ImageLuma8(img) => ImageBuf::Gray(img.clone()),
            DynamicImage::ImageRgb8(img) => ImageBuf::Rgb(img.clone()),
            DynamicImage::ImageRgba8(img) => ImageBuf::Rgba(img.clone()),
            other if other.color().has_alpha() => ImageBuf::Rgba(other.to_rgba8()),
            other if other.color().channel_count() == 1 => ImageBuf::Gray(other.to_luma8()),
            other => ImageBuf::Rgb(other.to_rgb8()),
        };
        Ok(buf)
    }

    fn from_bitmap_data(data: &BitmapData<'_>) -> Result<Self> {
        let row_bytes = data.validate()?;

        let (format, swap_red_blue) = match data.format {
            BitmapFormat::Gray8 => (PixelFormat::Gray8, false),
            BitmapFormat::Rgb8 => (PixelFormat::Rgb8, false),
            BitmapFormat::Bgr8 => (PixelFormat::Rgb8, true),
            BitmapFormat::Rgba8 => (PixelFormat::Rgba8, false),
            BitmapFormat::Bgra8 => (PixelFormat::Rgba8, true),
        };

        let mut packed = Vec::with_capacity(row_bytes * data.height as usize);
        for row in data.rows(row_bytes) {
            packed.extend_from_slice(row);
        }
        if swap_red_blue {
            for pixel in packed.chunks_exact_mut(data.format.bytes_per_pixel()) {
                pixel.swap(0, 2);
            }
        }

        ImageBuf::from_data(data.width, data.height, format, packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn bitmap_keeps_native_layout() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let buf = ImageBuf::from_bitmap(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgb8);
        assert_eq!(&buf.as_bytes()[3..6], &[10, 20, 30]);
    }

    #[test]
    fn bitmap_widens_unusual_layouts() {
        let luma_alpha = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(1, 1));
        let buf = ImageBuf::from_bitmap(&luma_alpha).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba8);

        let luma16 = DynamicImage::ImageLuma16(image::ImageBuffer::new(1, 1));
        let buf = ImageBuf::from_bitmap(&luma16).unwrap();
        assert_eq!(buf.format(), PixelFormat::Gray8);
    }

    #[test]
    fn gray_bitmap_is_copied() {
        let img = GrayImage::from_pixel(3, 1, Luma([42]));
        let buf = ImageBuf::from_bitmap(&DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(buf.as_bytes(), &[42, 42, 42]);
    }

    #[test]
    fn strided_rows_drop_padding() {
        // 2x2 gray with two bytes of padding per row
        let pixels = [1, 2, 0xAA, 0xAA, 3, 4, 0xAA, 0xAA];
        let data = BitmapData::new(2, 2, 4, BitmapFormat::Gray8, &pixels);
        let buf = ImageBuf::from_bitmap_data(&data).unwrap();
        assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn last_row_may_omit_padding() {
        let pixels = [1, 2, 0, 3, 4];
        let data = BitmapData::new(2, 2, 3, BitmapFormat::Gray8, &pixels);
        let buf = ImageBuf::from_bitmap_data(&data).unwrap();
        assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn bgr_is_swizzled_to_rgb() {
        let pixels = [30, 20, 10, 255];
        let data = BitmapData::packed(1, 1, BitmapFormat::Bgra8, &pixels);
        let buf = ImageBuf::from_bitmap_data(&data).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba8);
        assert_eq!(buf.as_bytes(), &[10, 20, 30, 255]);
    }

    #[test]
    fn short_stride_is_rejected() {
        let pixels = [0u8; 12];
        let data = BitmapData::new(2, 2, 5, BitmapFormat::Rgb8, &pixels);
        assert!(matches!(
            ImageBuf::from_bitmap_data(&data),
            Err(Error::InvalidBitmap(_))
        ));
    }

    #[test]
    fn truncated_region_is_rejected() {
        let pixels = [0u8; 5];
        let data = BitmapData::packed(3, 2, BitmapFormat::Gray8, &pixels);
        assert!(matches!(
            ImageBuf::from_bitmap_data(&data),
            Err(Error::InvalidBitmap(_))
        ));
    }

    #[test]
    fn overflowing_stride_is_rejected() {
        let pixels = [0u8; 4];
        let data = BitmapData::new(1, 3, usize::MAX / 2 + 1, BitmapFormat::Gray8, &pixels);
        assert!(matches!(
            ImageBuf::from_bitmap_data(&data),
            Err(Error::InvalidBitmap(_))
        ));
    }

    #[test]
    fn huge_packed_region_is_rejected() {
        let pixels = [0u8; 16];
        let data = BitmapData::packed(u32::MAX, u32::MAX, BitmapFormat::Bgra8, &pixels);
        assert!(matches!(
            ImageBuf::from_bitmap_data(&data),
            Err(Error::InvalidBitmap(_))
        ));
    }

    #[test]
    fn empty_region_converts() {
        let data = BitmapData::packed(0, 0, BitmapFormat::Rgb8, &[]);
        let buf = ImageBuf::from_bitmap_data(&data).unwrap();
        assert_eq!(buf.pixel_count(), 0);
    }
}
