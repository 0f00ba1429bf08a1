use log::{info, warn};
use serde::Serialize;
use tokio_stream::StreamExt;

use sbs_detect_core::SbsDetector;
use sbs_detect_display::DisplayModeLatch;
use sbs_detect_source::DynSurfaceProvider;

/// Per-frame record carried into the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_index: Option<u64>,
    pub correlation: f32,
    pub is_sbs: bool,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PipelineSummary {
    pub frames: u64,
    pub stereo_frames: u64,
    pub mono_frames: u64,
    pub rejected_frames: u64,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub summary: PipelineSummary,
    pub reports: Vec<FrameReport>,
}

/// Streams frames from the provider, classifies each one, and drives the
/// display latch with the result.
///
/// Frame-level failures (a backend decode error, a frame too narrow to
/// split) are logged and counted but do not stop the stream; a single bad
/// frame must not tear down a running session.
pub async fn run_pipeline(
    provider: DynSurfaceProvider,
    detector: &SbsDetector,
    latch: &mut DisplayModeLatch,
    max_frames: Option<u64>,
    mut on_frame: impl FnMut(&FrameReport),
) -> PipelineOutcome {
    let mut stream = provider.into_stream();
    let mut summary = PipelineSummary::default();
    let mut reports = Vec::new();
    let threshold = detector.config().correlation_threshold;

    while let Some(event) = stream.next().await {
        if let Some(limit) = max_frames {
            if summary.frames + summary.rejected_frames >= limit {
                break;
            }
        }

        let surface = match event {
            Ok(surface) => surface,
            Err(err) => {
                warn!("frame source error: {err}");
                summary.rejected_frames += 1;
                continue;
            }
        };

        let frame_index = surface.frame_index();
        let view = surface.view();
        let detection = view
            .split_vertical()
            .and_then(|(left, right)| detector.classify(&left, &right));
        let detection = match detection {
            Ok(detection) => detection,
            Err(err) => {
                warn!("frame {frame_index:?} rejected: {err}");
                summary.rejected_frames += 1;
                continue;
            }
        };

        latch.apply(detection.is_sbs);
        info!(
            "frame {}: correlation={:.3}, threshold={threshold:.3}, result={}",
            frame_index.map_or_else(|| "?".into(), |index| index.to_string()),
            detection.correlation,
            if detection.is_sbs { "SBS" } else { "2D" }
        );

        summary.frames += 1;
        if detection.is_sbs {
            summary.stereo_frames += 1;
        } else {
            summary.mono_frames += 1;
        }

        let report = FrameReport {
            frame_index,
            correlation: detection.correlation,
            is_sbs: detection.is_sbs,
        };
        on_frame(&report);
        reports.push(report);
    }

    PipelineOutcome { summary, reports }
}
