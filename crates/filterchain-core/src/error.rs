use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required collaborator (filter, factory, options) was missing or ambiguous.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Raised by a filter during a stage. Display and source are the filter's own.
    #[error(transparent)]
    FilterFailure(anyhow::Error),

    #[error("result projection failed: {0}")]
    Projection(#[source] anyhow::Error),

    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),
}

pub type Result<T> = std::result::Result<T, Error>;
