//! JSON pipeline configuration.
//!
//! ```json
//! {
//!   "name": "scan-cleanup",
//!   "stages": [
//!     { "filter": { "type": "grayscale" } },
//!     { "derive": { "type": "otsu_threshold" } }
//!   ],
//!   "options": { "run_name": "scan", "stage_dir": "out/stages" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filterchain_core::{Filter, FilterAdapter, FilterFactory, ImageBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::derived::{auto_contrast_factory, otsu_factory};
use crate::filters::{ContrastStretch, GaussianBlur, Grayscale, Invert, SobelEdges, Threshold};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read pipeline config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed pipeline config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stage {index} is invalid")]
    Stage {
        index: usize,
        #[source]
        source: filterchain_core::Error,
    },
    #[error("stage {index}: {reason}")]
    InvalidParameter { index: usize, reason: String },
}

/// A pre-built filter and its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    Grayscale,
    Threshold {
        #[serde(default = "default_level")]
        level: u8,
    },
    GaussianBlur {
        sigma: f32,
    },
    Invert,
    SobelEdges,
    ContrastStretch {
        low: u8,
        high: u8,
    },
}

fn default_level() -> u8 {
    Threshold::default().level
}

fn shared<F: Filter<ImageBuf> + 'static>(filter: F) -> Arc<dyn Filter<ImageBuf>> {
    Arc::new(filter)
}

impl FilterKind {
    pub fn build(&self) -> Result<Arc<dyn Filter<ImageBuf>>, String> {
        let filter = match *self {
            Self::Grayscale => shared(Grayscale),
            Self::Threshold { level } => shared(Threshold::new(level)),
            Self::GaussianBlur { sigma } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(format!("gaussian_blur sigma must be positive, got {sigma}"));
                }
                shared(GaussianBlur::new(sigma))
            }
            Self::Invert => shared(Invert),
            Self::SobelEdges => shared(SobelEdges),
            Self::ContrastStretch { low, high } => {
                if low > high {
                    return Err(format!("contrast_stretch low {low} exceeds high {high}"));
                }
                shared(ContrastStretch::new(low, high))
            }
        };
        Ok(filter)
    }
}

/// A filter computed from each incoming image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedKind {
    OtsuThreshold,
    AutoContrast,
}

impl DerivedKind {
    pub fn factory(&self) -> Arc<FilterFactory<ImageBuf>> {
        match self {
            Self::OtsuThreshold => otsu_factory(),
            Self::AutoContrast => auto_contrast_factory(),
        }
    }
}

/// One stage entry. Exactly one of `filter` and `derive` must be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive: Option<DerivedKind>,
}

impl StageConfig {
    pub fn fixed(kind: FilterKind) -> Self {
        Self {
            filter: Some(kind),
            derive: None,
        }
    }

    pub fn derived(kind: DerivedKind) -> Self {
        Self {
            filter: None,
            derive: Some(kind),
        }
    }

    pub fn to_adapter(&self, index: usize) -> Result<FilterAdapter<ImageBuf>, ConfigError> {
        let filter = self
            .filter
            .as_ref()
            .map(FilterKind::build)
            .transpose()
            .map_err(|reason| ConfigError::InvalidParameter { index, reason })?;
        let factory = self.derive.as_ref().map(DerivedKind::factory);
        FilterAdapter::from_parts(filter, factory)
            .map_err(|source| ConfigError::Stage { index, source })
    }
}

/// Per-run settings handed to the options-aware engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Prefix for files written by the stage writer.
    #[serde(default = "default_run_name")]
    pub run_name: String,
    /// Where to write every intermediate stage, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_dir: Option<PathBuf>,
}

fn default_run_name() -> String {
    "run".into()
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            run_name: default_run_name(),
            stage_dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub stages: Vec<StageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RunOptions>,
}

fn default_name() -> String {
    "pipeline".into()
}

impl PipelineConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            name = %config.name,
            stages = config.stages.len(),
            "loaded pipeline config"
        );
        Ok(config)
    }

    /// Parse and validate. Every stage is built once so that bad entries
    /// fail here rather than on the first run.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.adapters()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn adapters(&self) -> Result<Vec<FilterAdapter<ImageBuf>>, ConfigError> {
        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| stage.to_adapter(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use filterchain_core::PixelFormat;

    use super::*;

    const SCAN: &str = r#"{
        "name": "scan-cleanup",
        "stages": [
            { "filter": { "type": "grayscale" } },
            { "filter": { "type": "gaussian_blur", "sigma": 1.5 } },
            { "filter": { "type": "threshold" } },
            { "derive": { "type": "auto_contrast" } }
        ],
        "options": { "run_name": "scan", "stage_dir": "out/stages" }
    }"#;

    #[test]
    fn parses_stages_and_options() {
        let config = PipelineConfig::from_json(SCAN).unwrap();
        assert_eq!(config.name, "scan-cleanup");
        assert_eq!(
            config.stages,
            vec![
                StageConfig::fixed(FilterKind::Grayscale),
                StageConfig::fixed(FilterKind::GaussianBlur { sigma: 1.5 }),
                StageConfig::fixed(FilterKind::Threshold { level: 128 }),
                StageConfig::derived(DerivedKind::AutoContrast),
            ]
        );
        let options = config.options.unwrap();
        assert_eq!(options.run_name, "scan");
        assert_eq!(options.stage_dir, Some(PathBuf::from("out/stages")));
    }

    #[test]
    fn builds_matching_adapters() {
        let config = PipelineConfig::from_json(SCAN).unwrap();
        let adapters = config.adapters().unwrap();
        assert_eq!(adapters.len(), 4);
        assert_eq!(format!("{:?}", adapters[0]), "Fixed(\"Grayscale\")");
        assert_eq!(format!("{:?}", adapters[1]), "Fixed(\"GaussianBlur\")");
        assert!(matches!(adapters[3], FilterAdapter::Derived(_)));

        let gray = ImageBuf::from_data(1, 1, PixelFormat::Rgb8, vec![255, 255, 255]).unwrap();
        assert_eq!(adapters[0].transform(&gray).unwrap().as_bytes(), &[255]);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = PipelineConfig::from_json(r#"{ "stages": [] }"#).unwrap();
        assert_eq!(config.name, "pipeline");
        assert!(config.options.is_none());

        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RunOptions::default());
    }

    #[test]
    fn survives_serialization() {
        let config = PipelineConfig::from_json(SCAN).unwrap();
        let again = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn stage_without_filter_or_factory_is_rejected() {
        let err = PipelineConfig::from_json(r#"{ "stages": [ {} ] }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Stage {
                index: 0,
                source: filterchain_core::Error::InvalidConfiguration(_)
            }
        ));
    }

    #[test]
    fn stage_with_both_is_rejected() {
        let json = r#"{ "stages": [
            { "filter": { "type": "invert" } },
            { "filter": { "type": "invert" }, "derive": { "type": "otsu_threshold" } }
        ] }"#;
        let err = PipelineConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Stage { index: 1, .. }));
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let blur = r#"{ "stages": [ { "filter": { "type": "gaussian_blur", "sigma": 0.0 } } ] }"#;
        assert!(matches!(
            PipelineConfig::from_json(blur),
            Err(ConfigError::InvalidParameter { index: 0, .. })
        ));
        let stretch =
            r#"{ "stages": [ { "filter": { "type": "contrast_stretch", "low": 9, "high": 3 } } ] }"#;
        assert!(matches!(
            PipelineConfig::from_json(stretch),
            Err(ConfigError::InvalidParameter { index: 0, .. })
        ));
    }

    #[test]
    fn unknown_kinds_and_fields_are_json_errors() {
        let kind = r#"{ "stages": [ { "filter": { "type": "sharpen" } } ] }"#;
        assert!(matches!(PipelineConfig::from_json(kind), Err(ConfigError::Json(_))));
        let field = r#"{ "stages": [ { "filters": { "type": "invert" } } ] }"#;
        assert!(matches!(PipelineConfig::from_json(field), Err(ConfigError::Json(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCAN.as_bytes()).unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.stages.len(), 4);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
