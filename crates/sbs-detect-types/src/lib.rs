//! Shared domain models for the sbs-detect workspace.
//!
//! This crate centralizes the pixel-surface data model and the error
//! taxonomy used by the classifier core, the frame sources, and the CLI.
//! Keep it backend-agnostic and free of platform-specific dependencies so
//! every crate can depend on it without pulling native SDKs or heavy
//! features.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;
pub type FrameResult<T> = Result<T, FrameError>;

/// Bytes per pixel of the only supported pixel format (RGBA, 8 bits per
/// channel, R first in memory).
pub const BYTES_PER_PIXEL: usize = 4;

/// Immutable borrowed view of an RGBA8 pixel buffer.
///
/// The view never owns the pixels. Callers guarantee the buffer stays valid
/// and unchanged for the duration of a call; nothing downstream retains the
/// view past that call.
#[derive(Clone, Copy)]
pub struct SurfaceView<'a> {
    width: u32,
    height: u32,
    stride: usize,
    data: &'a [u8],
}

impl fmt::Debug for SurfaceView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceView")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl<'a> SurfaceView<'a> {
    /// Wraps a caller-owned pixel buffer.
    ///
    /// `stride` is in bytes and may exceed `width * 4` for row padding. The
    /// buffer must cover every pixel row; trailing padding after the last
    /// row's pixels is not required.
    pub fn new(width: u32, height: u32, stride: usize, data: &'a [u8]) -> DetectResult<Self> {
        if width == 0 {
            return Err(DetectError::invalid_dimension("width", width as i64));
        }
        if height == 0 {
            return Err(DetectError::invalid_dimension("height", height as i64));
        }
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        if stride < row_bytes {
            return Err(DetectError::InvalidStride {
                stride,
                min: row_bytes,
            });
        }
        let required = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(DetectError::InsufficientData {
                data_len: data.len(),
                required: usize::MAX,
            })?;
        if data.len() < required {
            return Err(DetectError::InsufficientData {
                data_len: data.len(),
                required,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes of row `y`, padding excluded.
    ///
    /// Panics if `y >= height`; row indices come from loops bounded by
    /// `height`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    /// Splits an SBS candidate frame into its left and right half views.
    ///
    /// Both halves are `width / 2` pixels wide and share the parent stride.
    /// The trailing column of an odd-width frame belongs to neither half.
    pub fn split_vertical(&self) -> DetectResult<(SurfaceView<'a>, SurfaceView<'a>)> {
        let half = self.width / 2;
        if half == 0 {
            return Err(DetectError::invalid_dimension("half width", half as i64));
        }
        let left = SurfaceView::new(half, self.height, self.stride, self.data)?;
        let offset = half as usize * BYTES_PER_PIXEL;
        let right = SurfaceView::new(half, self.height, self.stride, &self.data[offset..])?;
        Ok((left, right))
    }
}

/// Owned RGBA8 frame as produced by the source backends.
#[derive(Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    stride: usize,
    frame_index: Option<u64>,
    timestamp: Option<Duration>,
    data: Arc<[u8]>,
}

impl fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("timestamp", &self.timestamp)
            .field("bytes", &self.data.len())
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

impl PixelSurface {
    pub fn from_owned(
        width: u32,
        height: u32,
        stride: usize,
        timestamp: Option<Duration>,
        data: Vec<u8>,
    ) -> DetectResult<Self> {
        SurfaceView::new(width, height, stride, &data)?;
        Ok(Self {
            width,
            height,
            stride,
            timestamp,
            data: Arc::from(data.into_boxed_slice()),
            frame_index: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn with_frame_index(mut self, index: Option<u64>) -> Self {
        self.frame_index = index;
        self
    }

    pub fn set_frame_index(&mut self, index: Option<u64>) {
        self.frame_index = index;
    }

    /// Borrows the pixel data as a [`SurfaceView`] for a classification
    /// call.
    pub fn view(&self) -> SurfaceView<'_> {
        SurfaceView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

/// Dense row-major grid of 8-bit luma samples, no padding.
///
/// Grids are produced fresh by the downsampler for each classification call
/// and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl fmt::Debug for LuminanceGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuminanceGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl LuminanceGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn same_dimensions(&self, other: &LuminanceGrid) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Outcome of a single SBS classification.
///
/// `is_sbs` is `true` when the two halves are uncorrelated enough to be
/// independent stereo views, `false` when they show one monoscopic scene.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SbsDetection {
    pub is_sbs: bool,
    pub correlation: f32,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid dimension: {name} must be positive (got {value})")]
    InvalidDimension { name: &'static str, value: i64 },

    #[error("row stride {stride} is below the {min}-byte minimum for the surface width")]
    InvalidStride { stride: usize, min: usize },

    #[error("insufficient pixel data: got {data_len} bytes, need at least {required}")]
    InsufficientData { data_len: usize, required: usize },

    #[error(
        "dimensions differ: left {left_width}x{left_height}, right {right_width}x{right_height}"
    )]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    #[error("correlation threshold must be in (0, 1] (got {value})")]
    InvalidThreshold { value: f32 },
}

impl DetectError {
    pub fn invalid_dimension(name: &'static str, value: i64) -> Self {
        Self::InvalidDimension { name, value }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("backend {backend} is not supported in this build")]
    Unsupported { backend: &'static str },

    #[error("{backend} backend failed: {message}")]
    BackendFailure {
        backend: &'static str,
        message: String,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    pub fn unsupported(backend: &'static str) -> Self {
        Self::Unsupported { backend }
    }

    pub fn backend_failure(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        Self::InvalidFrame {
            reason: reason.into(),
        }
    }
}

impl From<DetectError> for FrameError {
    fn from(err: DetectError) -> Self {
        FrameError::InvalidFrame {
            reason: err.to_string(),
        }
    }
}
