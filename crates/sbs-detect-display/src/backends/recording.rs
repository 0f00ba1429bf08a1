use std::sync::{Arc, Mutex};

use crate::{DisplayError, DisplayResult, StereoModeController};

/// A controller transition observed by [`RecordingController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    On { sub_mode: i32 },
    Off,
}

/// Controller that records every transition; used by tests and
/// diagnostics.
#[derive(Debug, Default)]
pub struct RecordingController {
    transitions: Arc<Mutex<Vec<Transition>>>,
    fail_calls: bool,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the transition log; stays valid after the
    /// controller is boxed into a latch.
    pub fn transitions(&self) -> Arc<Mutex<Vec<Transition>>> {
        Arc::clone(&self.transitions)
    }

    /// Makes every call report a backend failure. The transition is still
    /// recorded so tests can observe the attempt.
    pub fn fail_calls(mut self) -> Self {
        self.fail_calls = true;
        self
    }

    fn outcome(&self) -> DisplayResult<()> {
        if self.fail_calls {
            Err(DisplayError::backend_failure("recording", "forced failure"))
        } else {
            Ok(())
        }
    }
}

impl StereoModeController for RecordingController {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn set_3d_on(&mut self, sub_mode: i32) -> DisplayResult<()> {
        self.transitions
            .lock()
            .expect("transition log poisoned")
            .push(Transition::On { sub_mode });
        self.outcome()
    }

    fn set_3d_off(&mut self) -> DisplayResult<()> {
        self.transitions
            .lock()
            .expect("transition log poisoned")
            .push(Transition::Off);
        self.outcome()
    }
}
