pub mod bus;
pub mod events;
pub mod filter;
pub mod options;

use std::any::type_name;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::bitmap::{BitmapData, FromBitmap};
use crate::error::{Error, Result};
use crate::short_type_name;
use bus::{EventBus, Subscription};
use events::ProcessingEvent;
use filter::FilterAdapter;

/// Supplies the stages and the result projection of a [`ProcessingEngine`].
pub trait PipelineDefinition<B> {
    type Output;

    /// Ordered stages for one run. Called once per `process` call, so the
    /// list may change between runs.
    fn filters(&self) -> Vec<FilterAdapter<B>>;

    /// Convert the terminal buffer into the caller-visible result. With no
    /// stages this receives the caller's original buffer.
    fn result(&self, image: &B) -> anyhow::Result<Self::Output>;

    /// Engine name carried by every event. Defaults to the unqualified type name.
    fn name(&self) -> &str {
        short_type_name(type_name::<Self>())
    }
}

/// Runs an image through the stages of a [`PipelineDefinition`], publishing
/// a [`ProcessingEvent`] for the input and after every stage.
///
/// ```text
/// input -> Original event -> stage 0 -> event -> ... -> stage n-1 -> event -> result
/// ```
///
/// The caller's buffer is only borrowed. Every buffer a stage produces is
/// owned by the engine and dropped right after the next stage's event (or,
/// for the last one, after the projection), including when a later stage fails.
pub struct ProcessingEngine<B, D> {
    definition: D,
    events: EventBus<B>,
}

impl<B: 'static, D: PipelineDefinition<B>> ProcessingEngine<B, D> {
    pub fn new(definition: D) -> Self {
        Self {
            definition,
            events: EventBus::new(),
        }
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn events(&self) -> &EventBus<B> {
        &self.events
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProcessingEvent<'_, B>) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Convert a decoded bitmap and process it. The converted buffer is
    /// released when the call returns, whether it succeeds or not.
    pub fn process_bitmap(&self, bitmap: &DynamicImage) -> Result<D::Output>
    where
        B: FromBitmap,
    {
        let image = B::from_bitmap(bitmap)?;
        self.process(&image)
    }

    /// Convert a raw bitmap region and process it. The converted buffer is
    /// released when the call returns, whether it succeeds or not.
    pub fn process_bitmap_data(&self, data: &BitmapData<'_>) -> Result<D::Output>
    where
        B: FromBitmap,
    {
        let image = B::from_bitmap_data(data)?;
        self.process(&image)
    }

    pub fn process(&self, image: &B) -> Result<D::Output> {
        let engine = self.name();
        let filters = self.definition.filters();

        self.events.publish(&ProcessingEvent::original(engine, image));

        // Buffers produced by this run. `image` stays with the caller.
        let mut current: Option<B> = None;

        for (index, stage) in filters.iter().enumerate() {
            let input = current.as_ref().unwrap_or(image);

            let started = Instant::now();
            let (filter, output) = stage.run(input).inspect_err(|err| {
                warn!(engine, index, error = %err, "stage failed");
            })?;
            let elapsed = started.elapsed();

            {
                let event = ProcessingEvent::stage(engine, filter, index, &output, elapsed);
                debug!(engine, stage = event.stage_name(), ?elapsed, "stage complete");
                self.events.publish(&event);
            }

            // Replacing the slot drops the previous intermediate buffer.
            current = Some(output);
        }

        let terminal = current.as_ref().unwrap_or(image);
        let result = self.definition.result(terminal).map_err(Error::Projection);
        drop(current);
        result
    }
}

#[cfg(test)]
pub(crate) mod testing;
