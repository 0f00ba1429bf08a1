//! Stereo-candidate frame acquisition for the sbs-detect workspace.
//!
//! Backends produce full SBS candidate frames (RGBA8) as an async stream;
//! the pipeline splits each frame into its half surfaces and classifies
//! them. Backends are feature-gated so the crate builds without any image
//! codec when only the synthetic source is needed.

pub mod backends;
pub mod config;
pub mod core;

pub use config::{Backend, Configuration};
pub use crate::core::{
    DynSurfaceProvider, SurfaceProvider, SurfaceStream, spawn_stream_from_channel,
};
pub use sbs_detect_types::{FrameError, FrameResult, PixelSurface};
