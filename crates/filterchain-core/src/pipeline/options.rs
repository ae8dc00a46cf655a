use std::sync::Arc;

use image::DynamicImage;

use super::bus::Subscription;
use super::events::{OptionsEvent, ProcessingEvent};
use super::{PipelineDefinition, ProcessingEngine};
use crate::bitmap::{BitmapData, FromBitmap};
use crate::error::{Error, Result};

/// A [`ProcessingEngine`] carrying an immutable options value.
///
/// Besides the engine's own event channel it offers a second one,
/// [`subscribe_with_options`](Self::subscribe_with_options), whose events
/// carry the options alongside the stage data.
pub struct OptionsEngine<B, D, O> {
    engine: ProcessingEngine<B, D>,
    options: Arc<O>,
}

impl<B, D, O> OptionsEngine<B, D, O>
where
    B: 'static,
    D: PipelineDefinition<B>,
    O: Send + Sync + 'static,
{
    /// Fails with [`Error::InvalidConfiguration`] when `options` is `None`.
    pub fn new(engine: ProcessingEngine<B, D>, options: Option<O>) -> Result<Self> {
        let options = options.ok_or_else(|| {
            Error::InvalidConfiguration(format!("{} needs an options value", engine.name()))
        })?;
        Ok(Self {
            engine,
            options: Arc::new(options),
        })
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    pub fn engine(&self) -> &ProcessingEngine<B, D> {
        &self.engine
    }

    pub fn into_engine(self) -> ProcessingEngine<B, D> {
        self.engine
    }

    /// Subscribe to undecorated events.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProcessingEvent<'_, B>) + Send + Sync + 'static,
    {
        self.engine.subscribe(callback)
    }

    /// Subscribe to events stamped with this engine's options.
    pub fn subscribe_with_options<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OptionsEvent<'_, B, O>) + Send + Sync + 'static,
    {
        let options = Arc::clone(&self.options);
        self.engine.subscribe(move |event| {
            callback(&OptionsEvent::new(event, options.as_ref()));
        })
    }

    pub fn process(&self, image: &B) -> Result<D::Output> {
        self.engine.process(image)
    }

    pub fn process_bitmap(&self, bitmap: &DynamicImage) -> Result<D::Output>
    where
        B: FromBitmap,
    {
        self.engine.process_bitmap(bitmap)
    }

    pub fn process_bitmap_data(&self, data: &BitmapData<'_>) -> Result<D::Output>
    where
        B: FromBitmap,
    {
        self.engine.process_bitmap_data(data)
    }
}
