//! Reference filters for `filterchain-core` and the JSON configuration that
//! assembles them into pipelines.

pub mod config;
pub mod derived;
pub mod filters;
pub mod pipeline;

pub use config::{ConfigError, DerivedKind, FilterKind, PipelineConfig, RunOptions, StageConfig};
pub use derived::{auto_contrast, otsu_threshold};
pub use filters::{ContrastStretch, GaussianBlur, Grayscale, Invert, SobelEdges, Threshold};
pub use pipeline::ConfiguredPipeline;
