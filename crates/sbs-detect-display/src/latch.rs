use log::{info, warn};

use crate::StereoModeController;

/// Vendor sub-mode forwarded when 3D is switched on.
const DEFAULT_SUB_MODE_3D: i32 = 1;

/// Idempotent latch in front of a [`StereoModeController`].
///
/// Requests matching the current state are no-ops, so the host may apply a
/// classification on every frame without hammering the backend. Controller
/// failures are logged and absorbed; they never reach the caller, so
/// classification results stay independent of the display backend's
/// health. The latch tracks the requested state, not the backend's
/// success.
///
/// The latch is not internally synchronized; a host driving it from more
/// than one thread must serialize access.
pub struct DisplayModeLatch {
    controller: Option<Box<dyn StereoModeController>>,
    sub_mode_3d: i32,
    current_3d: bool,
}

impl DisplayModeLatch {
    pub fn new(controller: Box<dyn StereoModeController>) -> Self {
        Self {
            controller: Some(controller),
            sub_mode_3d: DEFAULT_SUB_MODE_3D,
            current_3d: false,
        }
    }

    /// Latch with no backing controller; every request is a no-op.
    pub fn unavailable() -> Self {
        Self {
            controller: None,
            sub_mode_3d: DEFAULT_SUB_MODE_3D,
            current_3d: false,
        }
    }

    /// Overrides the vendor sub-mode passed on 3D-on transitions.
    pub fn with_sub_mode(mut self, sub_mode: i32) -> Self {
        self.sub_mode_3d = sub_mode;
        self
    }

    pub fn is_available(&self) -> bool {
        self.controller.is_some()
    }

    pub fn is_3d_enabled(&self) -> bool {
        self.current_3d
    }

    /// Requests the display mode implied by a classification result.
    ///
    /// Returns `true` when a controller transition was attempted.
    pub fn apply(&mut self, enable_3d: bool) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };
        if enable_3d == self.current_3d {
            return false;
        }
        let result = if enable_3d {
            controller.set_3d_on(self.sub_mode_3d)
        } else {
            controller.set_3d_off()
        };
        match result {
            Ok(()) => info!(
                "{}: 3D {}",
                controller.name(),
                if enable_3d { "on" } else { "off" }
            ),
            Err(err) => warn!("{}: mode switch failed: {err}", controller.name()),
        }
        self.current_3d = enable_3d;
        true
    }
}
