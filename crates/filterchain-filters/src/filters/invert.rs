use anyhow::Result;
use filterchain_core::{Filter, ImageBuf};
use image::imageops;

/// Photographic negative. Alpha is left as is.
pub struct Invert;

impl Filter<ImageBuf> for Invert {
    fn apply(&self, image: &ImageBuf) -> Result<ImageBuf> {
        let mut output = image.clone();
        match &mut output {
            ImageBuf::Gray(img) => imageops::invert(img),
            ImageBuf::Rgb(img) => imageops::invert(img),
            ImageBuf::Rgba(img) => imageops::invert(img),
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use filterchain_core::PixelFormat;

    use super::*;

    #[test]
    fn inverts_gray() {
        let buf = ImageBuf::from_data(3, 1, PixelFormat::Gray8, vec![0, 100, 255]).unwrap();
        let result = Invert.apply(&buf).unwrap();
        assert_eq!(result.as_bytes(), &[255, 155, 0]);
        assert_eq!(buf.as_bytes(), &[0, 100, 255]);
    }

    #[test]
    fn inverts_rgb() {
        let buf = ImageBuf::from_data(1, 1, PixelFormat::Rgb8, vec![10, 20, 30]).unwrap();
        let result = Invert.apply(&buf).unwrap();
        assert_eq!(result.as_bytes(), &[245, 235, 225]);
    }

    #[test]
    fn twice_is_identity() {
        let buf = ImageBuf::from_data(2, 1, PixelFormat::Rgb8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let once = Invert.apply(&buf).unwrap();
        let twice = Invert.apply(&once).unwrap();
        assert_eq!(twice, buf);
    }
}
