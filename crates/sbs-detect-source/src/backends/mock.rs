use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::Sender;

use crate::core::{DynSurfaceProvider, SurfaceProvider, SurfaceStream, spawn_stream_from_channel};
use sbs_detect_types::{BYTES_PER_PIXEL, FrameResult, PixelSurface};

// Frames per mono/stereo run in the synthetic sequence.
const RUN_LENGTH: u64 = 10;
// Horizontal disparity, in source pixels, applied to the right half of
// synthetic stereo frames.
const STEREO_DISPARITY: usize = 24;

/// Synthetic frame source: runs of monoscopic frames (identical halves)
/// alternating with runs of stereo frames (right half shifted by a fixed
/// disparity). Deterministic per frame index.
pub struct MockProvider {
    width: u32,
    height: u32,
    frame_count: u64,
    frame_interval: Duration,
    channel_capacity: usize,
}

impl MockProvider {
    const DEFAULT_CHANNEL_CAPACITY: usize = 8;
    const DEFAULT_FRAME_COUNT: u64 = 60;

    pub fn new(frame_count: Option<u64>, channel_capacity: Option<usize>) -> Self {
        Self {
            width: 256,
            height: 128,
            frame_count: frame_count.unwrap_or(Self::DEFAULT_FRAME_COUNT),
            frame_interval: Duration::ZERO,
            channel_capacity: channel_capacity
                .unwrap_or(Self::DEFAULT_CHANNEL_CAPACITY)
                .max(1),
        }
    }

    /// Paces frame emission, simulating a live source.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Whether the synthetic frame at `index` carries stereo content.
    pub fn frame_is_stereo(index: u64) -> bool {
        (index / RUN_LENGTH) % 2 == 1
    }

    fn emit_frames(&self, tx: Sender<FrameResult<PixelSurface>>) {
        for index in 0..self.frame_count {
            if tx.is_closed() {
                break;
            }
            let frame = synthesize_frame(self.width, self.height, index)
                .map(|frame| frame.with_frame_index(Some(index)));
            if tx.blocking_send(frame).is_err() {
                break;
            }
            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }
    }
}

impl SurfaceProvider for MockProvider {
    fn total_frames(&self) -> Option<u64> {
        Some(self.frame_count)
    }

    fn into_stream(self: Box<Self>) -> SurfaceStream {
        let provider = *self;
        let capacity = provider.channel_capacity;
        spawn_stream_from_channel(capacity, move |tx| provider.emit_frames(tx))
    }
}

pub fn boxed_mock(
    frame_count: Option<u64>,
    channel_capacity: Option<usize>,
) -> FrameResult<DynSurfaceProvider> {
    Ok(Box::new(MockProvider::new(frame_count, channel_capacity)))
}

fn synthesize_frame(width: u32, height: u32, index: u64) -> FrameResult<PixelSurface> {
    let stride = width as usize * BYTES_PER_PIXEL;
    let mut data = vec![0u8; stride * height as usize];
    let half = width as usize / 2;
    let stereo = MockProvider::frame_is_stereo(index);

    for y in 0..height as usize {
        let row = &mut data[y * stride..(y + 1) * stride];
        for x in 0..width as usize {
            let scene_x = if x < half {
                x
            } else if stereo {
                (x - half) + STEREO_DISPARITY
            } else {
                x - half
            };
            let value = scene_luma(scene_x, y, index);
            let px = &mut row[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL];
            px[0] = value;
            px[1] = value;
            px[2] = value;
            px[3] = 0xFF;
        }
    }

    let timestamp = Duration::from_millis(index * 16);
    PixelSurface::from_owned(width, height, stride, Some(timestamp), data).map_err(Into::into)
}

// High-frequency pattern so a small disparity produces a large SAD.
fn scene_luma(x: usize, y: usize, index: u64) -> u8 {
    (((x * 7) ^ (y * 13)) as u64).wrapping_add(index.wrapping_mul(5)) as u8
}
