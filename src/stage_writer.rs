//! Dumps every stage of an options-aware run to disk as PNG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filterchain_core::{ImageBuf, OptionsEvent, ProcessingEvent};
use filterchain_filters::RunOptions;

/// `<dir>/<run>-<seq>-<stage>.png`, where `seq` is 0 for the original and
/// `index + 1` for each stage.
pub fn stage_path(dir: &Path, run_name: &str, event: &ProcessingEvent<'_, ImageBuf>) -> PathBuf {
    let seq = event.index().map_or(0, |index| index + 1);
    dir.join(format!("{run_name}-{seq:02}-{}.png", slug(event.stage_name())))
}

/// Write the event's image if the run has a stage directory. Returns the
/// written path.
pub fn write_stage(event: &OptionsEvent<'_, ImageBuf, RunOptions>) -> Result<Option<PathBuf>> {
    let options = event.options();
    let Some(dir) = &options.stage_dir else {
        return Ok(None);
    };
    let path = stage_path(dir, &options.run_name, event.event());
    event
        .image()
        .to_dynamic()
        .save(&path)
        .with_context(|| format!("failed to write stage {}", path.display()))?;
    Ok(Some(path))
}

/// "Threshold[1]" -> "threshold-1".
fn slug(stage: &str) -> String {
    let mut out = String::with_capacity(stage.len());
    for c in stage.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slug("Original"), "original");
        assert_eq!(slug("Threshold[1]"), "threshold-1");
        assert_eq!(slug("GaussianBlur[12]"), "gaussianblur-12");
    }
}
