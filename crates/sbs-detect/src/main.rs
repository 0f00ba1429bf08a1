use std::fs;
use std::str::FromStr;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use sbs_detect::cli::{CliArgs, DisplayBackend};
use sbs_detect::pipeline::run_pipeline;
use sbs_detect::settings::{self, EffectiveSettings};
use sbs_detect_core::{DetectorConfig, SbsDetector};
use sbs_detect_display::{DisplayModeLatch, NoopController};
use sbs_detect_source::{Backend, Configuration, FrameError};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), FrameError> {
    env_logger::init();
    let args = CliArgs::parse();

    if args.list_backends {
        print_available_backends();
        return Ok(());
    }

    let settings = settings::resolve(&args)
        .map_err(|err| FrameError::configuration(err.to_string()))?;
    run(settings).await
}

async fn run(settings: EffectiveSettings) -> Result<(), FrameError> {
    let mut config = Configuration::from_env()?;
    if let Some(backend) = settings.backend.as_deref() {
        config.backend = Backend::from_str(backend)?;
    }
    if let Some(input) = settings.input.clone() {
        config.input = Some(input);
    }

    if !Configuration::available_backends().contains(&config.backend) {
        return Err(FrameError::unsupported(config.backend.as_str()));
    }

    let detector = SbsDetector::new(DetectorConfig {
        target_width: settings.target_size as usize,
        target_height: settings.target_size as usize,
        correlation_threshold: settings.threshold,
    })
    .map_err(|err| FrameError::configuration(err.to_string()))?;

    let mut latch = match settings.display {
        DisplayBackend::Noop => DisplayModeLatch::new(Box::new(NoopController)),
        DisplayBackend::Off => DisplayModeLatch::unavailable(),
    };

    let provider = config.create_provider()?;
    let progress = build_progress(provider.total_frames(), settings.max_frames);

    let outcome = run_pipeline(
        provider,
        &detector,
        &mut latch,
        settings.max_frames,
        |_| progress.inc(1),
    )
    .await;
    progress.finish_and_clear();

    if let Some(path) = settings.json_output.as_ref() {
        let json = serde_json::to_string_pretty(&outcome.reports).map_err(|err| {
            FrameError::configuration(format!("failed to serialize report: {err}"))
        })?;
        fs::write(path, json)?;
    }

    let summary = &outcome.summary;
    println!(
        "processed {} frames: {} stereo, {} monoscopic, {} rejected (3D {})",
        summary.frames,
        summary.stereo_frames,
        summary.mono_frames,
        summary.rejected_frames,
        if latch.is_3d_enabled() { "on" } else { "off" },
    );
    Ok(())
}

fn build_progress(total: Option<u64>, limit: Option<u64>) -> ProgressBar {
    let total = match (total, limit) {
        (Some(total), Some(limit)) => Some(total.min(limit)),
        (Some(total), None) => Some(total),
        (None, Some(limit)) => Some(limit),
        (None, None) => None,
    };
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} frames")
                    .expect("progress template"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

fn print_available_backends() {
    println!("available backends:");
    for backend in Configuration::available_backends() {
        println!("  {backend}");
    }
}
