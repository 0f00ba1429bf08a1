use std::pin::Pin;

use futures_core::Stream;
use futures_util::stream::unfold;
use tokio::sync::mpsc::{self, Sender};

use sbs_detect_types::{FrameResult, PixelSurface};

/// Ordered stream of SBS candidate frames from a single source.
pub type SurfaceStream = Pin<Box<dyn Stream<Item = FrameResult<PixelSurface>> + Send>>;

pub type DynSurfaceProvider = Box<dyn SurfaceProvider>;

pub trait SurfaceProvider: Send + 'static {
    /// Total frame count when the backend knows it up front.
    fn total_frames(&self) -> Option<u64> {
        None
    }

    fn into_stream(self: Box<Self>) -> SurfaceStream;
}

/// Bridges a blocking producer onto a [`SurfaceStream`] through a bounded
/// channel. The producer runs on the blocking thread pool and stops when
/// the receiving side is dropped.
pub fn spawn_stream_from_channel(
    capacity: usize,
    task: impl FnOnce(Sender<FrameResult<PixelSurface>>) + Send + 'static,
) -> SurfaceStream {
    let (tx, rx) = mpsc::channel(capacity);
    tokio::task::spawn_blocking(move || task(tx));
    let stream = unfold(rx, |mut receiver| async {
        receiver.recv().await.map(|item| (item, receiver))
    });
    Box::pin(stream)
}
