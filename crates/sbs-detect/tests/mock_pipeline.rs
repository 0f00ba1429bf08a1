use sbs_detect::pipeline::run_pipeline;
use sbs_detect_core::{DetectorConfig, SbsDetector};
use sbs_detect_display::{DisplayModeLatch, RecordingController, Transition};
use sbs_detect_source::backends::mock::MockProvider;

#[tokio::test(flavor = "multi_thread")]
async fn mock_stream_classifies_and_latches_end_to_end() {
    let provider = Box::new(MockProvider::new(Some(30), None));
    let detector = SbsDetector::new(DetectorConfig::default()).unwrap();
    let controller = RecordingController::new();
    let transitions = controller.transitions();
    let mut latch = DisplayModeLatch::new(Box::new(controller));

    let outcome = run_pipeline(provider, &detector, &mut latch, None, |_| {}).await;

    assert_eq!(outcome.summary.frames, 30);
    assert_eq!(outcome.summary.rejected_frames, 0);
    assert_eq!(outcome.summary.stereo_frames, 10);
    assert_eq!(outcome.summary.mono_frames, 20);
    for report in &outcome.reports {
        let index = report.frame_index.unwrap();
        assert_eq!(
            report.is_sbs,
            MockProvider::frame_is_stereo(index),
            "frame {index}"
        );
        if !report.is_sbs {
            assert_eq!(report.correlation, 1.0, "frame {index}");
        }
    }

    // Ten-frame runs: 3D turns on at frame 10 and back off at frame 20.
    assert!(!latch.is_3d_enabled());
    let transitions = transitions.lock().unwrap();
    assert_eq!(
        transitions.as_slice(),
        &[Transition::On { sub_mode: 1 }, Transition::Off]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn max_frames_bounds_the_run() {
    let provider = Box::new(MockProvider::new(Some(30), None));
    let detector = SbsDetector::new(DetectorConfig::default()).unwrap();
    let mut latch = DisplayModeLatch::unavailable();

    let mut seen = 0u64;
    let outcome = run_pipeline(provider, &detector, &mut latch, Some(7), |_| seen += 1).await;

    assert_eq!(outcome.summary.frames, 7);
    assert_eq!(seen, 7);
    assert_eq!(outcome.reports.len(), 7);
}
