mod noop;
mod recording;

pub use noop::NoopController;
pub use recording::{RecordingController, Transition};
