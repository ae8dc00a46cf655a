use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::short_type_name;

/// A single transformation applied by one pipeline stage.
///
/// `apply` must return a newly allocated buffer and must not keep the input
/// past the call.
pub trait Filter<B>: Send + Sync {
    /// Label used in stage names. Defaults to the unqualified type name.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }

    fn apply(&self, image: &B) -> anyhow::Result<B>;
}

/// Builds a filter from the image it is about to process.
pub type FilterFactory<B> = dyn Fn(&B) -> Box<dyn Filter<B>> + Send + Sync;

/// One pipeline stage.
pub enum FilterAdapter<B> {
    /// A pre-built filter, reused on every invocation.
    Fixed(Arc<dyn Filter<B>>),
    /// A factory consulted on every invocation; its filter is never cached.
    Derived(Arc<FilterFactory<B>>),
}

impl<B> FilterAdapter<B> {
    pub fn fixed<F>(filter: F) -> Self
    where
        F: Filter<B> + 'static,
    {
        Self::Fixed(Arc::new(filter))
    }

    pub fn derived<F>(factory: F) -> Self
    where
        F: Fn(&B) -> Box<dyn Filter<B>> + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(factory))
    }

    /// Build a stage from optional parts. Exactly one of `filter` and
    /// `factory` must be present.
    pub fn from_parts(
        filter: Option<Arc<dyn Filter<B>>>,
        factory: Option<Arc<FilterFactory<B>>>,
    ) -> Result<Self> {
        match (filter, factory) {
            (Some(filter), None) => Ok(Self::Fixed(filter)),
            (None, Some(factory)) => Ok(Self::Derived(factory)),
            (None, None) => Err(Error::InvalidConfiguration(
                "a filter stage needs either a filter or a factory".into(),
            )),
            (Some(_), Some(_)) => Err(Error::InvalidConfiguration(
                "a filter stage takes a filter or a factory, not both".into(),
            )),
        }
    }

    /// Apply this stage to `image`, returning the new buffer. The input is
    /// left untouched and stays owned by the caller.
    pub fn transform(&self, image: &B) -> Result<B> {
        self.run(image).map(|(_, output)| output)
    }

    /// Like [`transform`](Self::transform), also reporting the name of the
    /// filter that actually ran.
    pub(crate) fn run(&self, image: &B) -> Result<(&'static str, B)> {
        match self {
            Self::Fixed(filter) => apply(filter.as_ref(), image),
            Self::Derived(factory) => {
                let filter = factory(image);
                debug!(filter = filter.name(), "derived filter from image");
                apply(filter.as_ref(), image)
            }
        }
    }
}

fn apply<B>(filter: &dyn Filter<B>, image: &B) -> Result<(&'static str, B)> {
    let output = filter.apply(image).map_err(Error::FilterFailure)?;
    Ok((filter.name(), output))
}

impl<B> Clone for FilterAdapter<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(filter) => Self::Fixed(Arc::clone(filter)),
            Self::Derived(factory) => Self::Derived(Arc::clone(factory)),
        }
    }
}

impl<B> fmt::Debug for FilterAdapter<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(filter) => f.debug_tuple("Fixed").field(&filter.name()).finish(),
            Self::Derived(_) => f.write_str("Derived"),
        }
    }
}
