//! Core SBS classification: deterministic luma downsampling plus the
//! normalized sum-of-absolute-differences similarity scorer.
//!
//! Everything in this crate is a pure, synchronous computation over
//! caller-owned buffers. There is no shared mutable state; a
//! [`SbsDetector`] may be used concurrently from any number of threads on
//! independent inputs.

pub mod detector;
pub mod downsample;
pub mod sad;

pub use detector::{DetectorConfig, SbsDetector};
pub use downsample::{downsample, downsample_pair};
pub use sad::{correlation, sum_abs_diff};

pub use sbs_detect_types::{DetectError, DetectResult, LuminanceGrid, SbsDetection, SurfaceView};
