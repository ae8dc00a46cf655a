use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use filterchain_core::{ImageBuf, OptionsEngine, ProcessingEngine, ProcessingEvent};
use filterchain_filters::{ConfiguredPipeline, PipelineConfig, RunOptions};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::stage_writer::write_stage;

/// Name and duration of every event seen during a run.
pub type Timings = Vec<(String, Duration)>;

pub fn run(args: &Args) -> Result<Timings> {
    let mut config = PipelineConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(dir) = &args.stage_dir {
        config.options.get_or_insert_with(RunOptions::default).stage_dir = Some(dir.clone());
    }

    let input = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    info!(
        path = %args.input.display(),
        width = input.width(),
        height = input.height(),
        pipeline = %config.name,
        "processing"
    );

    let engine = ProcessingEngine::new(ConfiguredPipeline::from_config(&config)?);
    let timings: Arc<Mutex<Timings>> = Arc::default();
    let sink = Arc::clone(&timings);
    let _log = engine.subscribe(move |event| {
        log_stage(event);
        sink.lock()
            .push((event.stage_name().to_string(), event.elapsed()));
    });

    let output = match config.options.take() {
        Some(options) => {
            if let Some(dir) = &options.stage_dir {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            let engine = OptionsEngine::new(engine, Some(options))?;
            let _writer = engine.subscribe_with_options(|event| match write_stage(event) {
                Ok(Some(path)) => debug!(path = %path.display(), "wrote stage"),
                Ok(None) => {}
                Err(err) => warn!(error = %format!("{err:#}"), "stage not written"),
            });
            engine.process_bitmap(&input)
        }
        None => engine.process_bitmap(&input),
    }
    .with_context(|| format!("pipeline {} failed", config.name))?;

    output
        .save(&args.output)
        .with_context(|| format!("failed to save {}", args.output.display()))?;
    info!(path = %args.output.display(), "saved result");

    let timings = std::mem::take(&mut *timings.lock());
    Ok(timings)
}

fn log_stage(event: &ProcessingEvent<'_, ImageBuf>) {
    let image = event.image();
    info!(
        engine = event.engine(),
        stage = event.stage_name(),
        elapsed_ms = event.elapsed().as_secs_f64() * 1000.0,
        width = image.width(),
        height = image.height(),
        format = ?image.format(),
        "stage"
    );
}
