//! Display-mode boundary: the capability that physically switches a panel
//! between 2D and 3D rendering.
//!
//! The classifier core never talks to vendor display machinery; it produces
//! a boolean that the host forwards through a [`DisplayModeLatch`]. How a
//! concrete controller is obtained (dynamic loading of a vendor module,
//! linking, IPC) is the host's concern — this crate defines the seam and
//! two reference controllers.

pub mod backends;
mod latch;

pub use backends::{NoopController, RecordingController, Transition};
pub use latch::DisplayModeLatch;

use thiserror::Error;

pub type DisplayResult<T> = Result<T, DisplayError>;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("{backend} display backend failed: {message}")]
    BackendFailure {
        backend: &'static str,
        message: String,
    },
}

impl DisplayError {
    pub fn backend_failure(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend,
            message: message.into(),
        }
    }
}

/// Vendor display capability: one-shot 3D-on / 3D-off controls.
///
/// Implementations are expected to be cheap to call repeatedly; the latch
/// in front of them already suppresses redundant transitions.
pub trait StereoModeController: Send {
    /// Stable backend name used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Switches the panel into 3D rendering with a vendor sub-mode.
    fn set_3d_on(&mut self, sub_mode: i32) -> DisplayResult<()>;

    /// Switches the panel back to 2D rendering.
    fn set_3d_off(&mut self) -> DisplayResult<()>;
}
