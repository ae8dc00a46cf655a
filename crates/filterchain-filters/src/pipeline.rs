use filterchain_core::{FilterAdapter, ImageBuf, PipelineDefinition};
use image::DynamicImage;

use crate::config::{ConfigError, PipelineConfig};

/// A named, fixed list of stages producing a [`DynamicImage`].
#[derive(Clone, Debug)]
pub struct ConfiguredPipeline {
    name: String,
    stages: Vec<FilterAdapter<ImageBuf>>,
}

impl ConfiguredPipeline {
    pub fn new(name: impl Into<String>, stages: Vec<FilterAdapter<ImageBuf>>) -> Self {
        Self {
            name: name.into(),
            stages,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.name.clone(), config.adapters()?))
    }

    pub fn stages(&self) -> &[FilterAdapter<ImageBuf>] {
        &self.stages
    }
}

impl PipelineDefinition<ImageBuf> for ConfiguredPipeline {
    type Output = DynamicImage;

    fn filters(&self) -> Vec<FilterAdapter<ImageBuf>> {
        self.stages.clone()
    }

    fn result(&self, image: &ImageBuf) -> anyhow::Result<DynamicImage> {
        Ok(image.to_dynamic())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
