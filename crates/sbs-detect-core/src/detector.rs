use sbs_detect_types::{DetectError, DetectResult, SbsDetection, SurfaceView};

use crate::downsample::downsample_pair;
use crate::sad::correlation;

/// Canonical luma grid dimensions.
pub const DEFAULT_TARGET_WIDTH: usize = 64;
pub const DEFAULT_TARGET_HEIGHT: usize = 64;

/// Correlation at or above this value means the two halves show the same
/// monoscopic scene.
pub const DEFAULT_CORRELATION_THRESHOLD: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub target_width: usize,
    pub target_height: usize,
    pub correlation_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
        }
    }
}

/// Stateless SBS classifier.
///
/// Each call is an independent pure computation; the detector holds only
/// its configuration and is safe to share across threads.
#[derive(Debug, Clone)]
pub struct SbsDetector {
    config: DetectorConfig,
}

impl SbsDetector {
    pub fn new(config: DetectorConfig) -> DetectResult<Self> {
        if config.target_width == 0 {
            return Err(DetectError::invalid_dimension("target_width", 0));
        }
        if config.target_height == 0 {
            return Err(DetectError::invalid_dimension("target_height", 0));
        }
        let threshold = config.correlation_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(DetectError::InvalidThreshold { value: threshold });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classifies a pair of half-frame surfaces.
    ///
    /// The surfaces must have equal dimensions; neither is retained past
    /// the call.
    pub fn classify(
        &self,
        left: &SurfaceView<'_>,
        right: &SurfaceView<'_>,
    ) -> DetectResult<SbsDetection> {
        let (grid_left, grid_right) = downsample_pair(
            left,
            right,
            self.config.target_width,
            self.config.target_height,
        )?;
        let score = correlation(&grid_left, &grid_right)?;
        Ok(SbsDetection {
            is_sbs: score < self.config.correlation_threshold,
            correlation: score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbs_detect_types::BYTES_PER_PIXEL;

    fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&rgba);
        }
        data
    }

    fn checkerboard(width: u32, height: u32, invert: bool) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let on = ((x + y) % 2 == 0) != invert;
                let value = if on { 255 } else { 0 };
                data.extend_from_slice(&[value, value, value, 255]);
            }
        }
        data
    }

    fn detector() -> SbsDetector {
        SbsDetector::new(DetectorConfig::default()).unwrap()
    }

    #[test]
    fn identical_halves_classify_as_monoscopic() {
        let data = uniform(128, 128, [200, 200, 200, 255]);
        let view = SurfaceView::new(128, 128, 128 * BYTES_PER_PIXEL, &data).unwrap();
        let detection = detector().classify(&view, &view).unwrap();
        assert_eq!(detection.correlation, 1.0);
        assert!(!detection.is_sbs);
    }

    #[test]
    fn maximal_luma_delta_classifies_as_stereo() {
        let white = uniform(128, 128, [255, 255, 255, 255]);
        let black = uniform(128, 128, [0, 0, 0, 255]);
        let stride = 128 * BYTES_PER_PIXEL;
        let left = SurfaceView::new(128, 128, stride, &white).unwrap();
        let right = SurfaceView::new(128, 128, stride, &black).unwrap();
        let detection = detector().classify(&left, &right).unwrap();
        assert_eq!(detection.correlation, 0.0);
        assert!(detection.is_sbs);
    }

    #[test]
    fn inverted_checkerboard_classifies_as_stereo() {
        let plain = checkerboard(64, 64, false);
        let inverted = checkerboard(64, 64, true);
        let stride = 64 * BYTES_PER_PIXEL;
        let left = SurfaceView::new(64, 64, stride, &plain).unwrap();
        let right = SurfaceView::new(64, 64, stride, &inverted).unwrap();
        let detection = detector().classify(&left, &right).unwrap();
        assert_eq!(detection.correlation, 0.0);
        assert!(detection.is_sbs);
    }

    #[test]
    fn threshold_is_configurable() {
        let config = DetectorConfig {
            correlation_threshold: 0.5,
            ..DetectorConfig::default()
        };
        let detector = SbsDetector::new(config).unwrap();
        let light = uniform(64, 64, [140, 140, 140, 255]);
        let dark = uniform(64, 64, [100, 100, 100, 255]);
        let stride = 64 * BYTES_PER_PIXEL;
        let left = SurfaceView::new(64, 64, stride, &light).unwrap();
        let right = SurfaceView::new(64, 64, stride, &dark).unwrap();
        // Uniform 40-level delta: correlation ~0.84, stereo only under the
        // default threshold.
        let detection = detector.classify(&left, &right).unwrap();
        assert!(!detection.is_sbs);
        let strict = SbsDetector::new(DetectorConfig::default()).unwrap();
        assert!(strict.classify(&left, &right).unwrap().is_sbs);
    }

    #[test]
    fn alternate_grid_sizes_are_supported() {
        let config = DetectorConfig {
            target_width: 16,
            target_height: 16,
            ..DetectorConfig::default()
        };
        let detector = SbsDetector::new(config).unwrap();
        let data = uniform(100, 80, [90, 90, 90, 255]);
        let view = SurfaceView::new(100, 80, 100 * BYTES_PER_PIXEL, &data).unwrap();
        let detection = detector.classify(&view, &view).unwrap();
        assert_eq!(detection.correlation, 1.0);
        assert!(!detection.is_sbs);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(
            SbsDetector::new(DetectorConfig {
                target_width: 0,
                ..DetectorConfig::default()
            }),
            Err(DetectError::InvalidDimension { .. })
        ));
        for threshold in [0.0, -0.5, 1.5, f32::NAN] {
            assert!(matches!(
                SbsDetector::new(DetectorConfig {
                    correlation_threshold: threshold,
                    ..DetectorConfig::default()
                }),
                Err(DetectError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let a = uniform(64, 64, [0, 0, 0, 255]);
        let b = uniform(32, 64, [0, 0, 0, 255]);
        let left = SurfaceView::new(64, 64, 64 * BYTES_PER_PIXEL, &a).unwrap();
        let right = SurfaceView::new(32, 64, 32 * BYTES_PER_PIXEL, &b).unwrap();
        assert!(matches!(
            detector().classify(&left, &right),
            Err(DetectError::DimensionMismatch { .. })
        ));
    }
}
