use log::info;

use crate::{DisplayResult, StereoModeController};

/// Controller used when no vendor display backend is wired in; transitions
/// are observable in the logs only.
#[derive(Debug, Default)]
pub struct NoopController;

impl StereoModeController for NoopController {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn set_3d_on(&mut self, sub_mode: i32) -> DisplayResult<()> {
        info!("noop display: 3D on (sub-mode {sub_mode})");
        Ok(())
    }

    fn set_3d_off(&mut self) -> DisplayResult<()> {
        info!("noop display: 3D off");
        Ok(())
    }
}
