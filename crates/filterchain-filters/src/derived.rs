//! Filters whose parameters are computed from the image they are about to
//! process. Each factory runs again on every invocation.

use std::sync::Arc;

use filterchain_core::{Filter, FilterAdapter, FilterFactory, ImageBuf};
use imageproc::contrast::otsu_level;

use crate::filters::{ContrastStretch, Threshold};

/// Threshold at the Otsu level of the incoming grayscale image.
pub fn otsu_threshold() -> FilterAdapter<ImageBuf> {
    FilterAdapter::Derived(otsu_factory())
}

pub fn otsu_factory() -> Arc<FilterFactory<ImageBuf>> {
    Arc::new(|image: &ImageBuf| -> Box<dyn Filter<ImageBuf>> {
        let level = otsu_level(&image.to_luma8());
        Box::new(Threshold::new(level))
    })
}

/// Stretch the incoming image's own luma range to full scale.
pub fn auto_contrast() -> FilterAdapter<ImageBuf> {
    FilterAdapter::Derived(auto_contrast_factory())
}

pub fn auto_contrast_factory() -> Arc<FilterFactory<ImageBuf>> {
    Arc::new(|image: &ImageBuf| -> Box<dyn Filter<ImageBuf>> {
        let (low, high) = luma_range(image);
        Box::new(ContrastStretch::new(low, high))
    })
}

/// Darkest and brightest luma values; the full range for an empty image.
fn luma_range(image: &ImageBuf) -> (u8, u8) {
    let luma = image.to_luma8();
    let mut pixels = luma.as_raw().iter().copied();
    let Some(first) = pixels.next() else {
        return (0, 255);
    };
    pixels.fold((first, first), |(low, high), v| (low.min(v), high.max(v)))
}
