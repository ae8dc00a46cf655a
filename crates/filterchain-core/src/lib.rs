//! Sequential image filter engine.
//!
//! A [`ProcessingEngine`] runs one image through the ordered stages of a
//! [`PipelineDefinition`], publishes a [`ProcessingEvent`] for the input and
//! after every stage, and projects the final buffer into a result.
//!
//! ```text
//! bitmap / bitmap data -> ImageBuf -> stage 0 -> ... -> stage n-1 -> result
//!                            |           |                  |
//!                         Original   Filter[0]      ...  Filter[n-1]   (events)
//! ```
//!
//! [`OptionsEngine`] wraps an engine with an immutable options value and
//! re-publishes every event with it attached.

pub mod bitmap;
pub mod error;
pub mod image_buf;
pub mod pipeline;

pub use bitmap::{BitmapData, BitmapFormat, FromBitmap};
pub use error::{Error, Result};
pub use image_buf::{ImageBuf, PixelFormat};
pub use pipeline::bus::{EventBus, Subscription, SubscriptionId};
pub use pipeline::events::{ORIGINAL_STAGE, OptionsEvent, ProcessingEvent};
pub use pipeline::filter::{Filter, FilterAdapter, FilterFactory};
pub use pipeline::options::OptionsEngine;
pub use pipeline::{PipelineDefinition, ProcessingEngine};

/// `a::b::Name<c::D>` -> `Name`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
