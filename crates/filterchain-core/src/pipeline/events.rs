use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Stage name of the event published for the untransformed input.
pub const ORIGINAL_STAGE: &str = "Original";

/// State of the pipeline right after one stage.
///
/// The event borrows the stage's buffer; subscribers see it only for the
/// duration of their callback.
pub struct ProcessingEvent<'a, B> {
    stage: Cow<'static, str>,
    index: Option<usize>,
    engine: &'a str,
    image: &'a B,
    elapsed: Duration,
}

impl<'a, B> ProcessingEvent<'a, B> {
    pub(crate) fn original(engine: &'a str, image: &'a B) -> Self {
        Self {
            stage: Cow::Borrowed(ORIGINAL_STAGE),
            index: None,
            engine,
            image,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn stage(
        engine: &'a str,
        filter: &str,
        index: usize,
        image: &'a B,
        elapsed: Duration,
    ) -> Self {
        Self {
            stage: Cow::Owned(format!("{filter}[{index}]")),
            index: Some(index),
            engine,
            image,
            elapsed,
        }
    }

    /// "Original" or `<Filter>[<index>]`.
    pub fn stage_name(&self) -> &str {
        &self.stage
    }

    /// Position in the filter list; `None` for the original image.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn engine(&self) -> &'a str {
        self.engine
    }

    pub fn image(&self) -> &'a B {
        self.image
    }

    /// Wall-clock time spent in this stage's transform.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_original(&self) -> bool {
        self.index.is_none()
    }
}

impl<B> fmt::Debug for ProcessingEvent<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingEvent")
            .field("stage", &self.stage)
            .field("engine", &self.engine)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// A [`ProcessingEvent`] stamped with the options of the engine that
/// produced it.
pub struct OptionsEvent<'a, B, O> {
    event: &'a ProcessingEvent<'a, B>,
    options: &'a O,
}

impl<'a, B, O> OptionsEvent<'a, B, O> {
    pub(crate) fn new(event: &'a ProcessingEvent<'a, B>, options: &'a O) -> Self {
        Self { event, options }
    }

    pub fn event(&self) -> &'a ProcessingEvent<'a, B> {
        self.event
    }

    pub fn options(&self) -> &'a O {
        self.options
    }

    pub fn stage_name(&self) -> &'a str {
        self.event.stage_name()
    }

    pub fn index(&self) -> Option<usize> {
        self.event.index()
    }

    pub fn engine(&self) -> &'a str {
        self.event.engine()
    }

    pub fn image(&self) -> &'a B {
        self.event.image()
    }

    pub fn elapsed(&self) -> Duration {
        self.event.elapsed()
    }
}

impl<B, O: fmt::Debug> fmt::Debug for OptionsEvent<'_, B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsEvent")
            .field("event", self.event)
            .field("options", self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_event_has_zero_elapsed() {
        let image = 7u8;
        let event = ProcessingEvent::original("Engine", &image);
        assert_eq!(event.stage_name(), "Original");
        assert_eq!(event.index(), None);
        assert!(event.is_original());
        assert_eq!(event.elapsed(), Duration::ZERO);
        assert_eq!(*event.image(), 7);
    }

    #[test]
    fn stage_event_name_carries_index() {
        let image = 0u8;
        let event =
            ProcessingEvent::stage("Engine", "Threshold", 1, &image, Duration::from_millis(3));
        assert_eq!(event.stage_name(), "Threshold[1]");
        assert_eq!(event.index(), Some(1));
        assert_eq!(event.engine(), "Engine");
        assert_eq!(event.elapsed(), Duration::from_millis(3));
    }

    #[test]
    fn options_event_forwards_fields() {
        let image = 1u8;
        let options = String::from("opts");
        let event = ProcessingEvent::stage("Engine", "Blur", 0, &image, Duration::from_micros(5));
        let stamped = OptionsEvent::new(&event, &options);
        assert_eq!(stamped.stage_name(), "Blur[0]");
        assert_eq!(stamped.engine(), "Engine");
        assert_eq!(stamped.elapsed(), Duration::from_micros(5));
        assert!(std::ptr::eq(stamped.image(), &image));
        assert!(std::ptr::eq(stamped.options(), &options));
    }
}
