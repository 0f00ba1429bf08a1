use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use tokio::sync::mpsc::Sender;

use crate::core::{DynSurfaceProvider, SurfaceProvider, SurfaceStream, spawn_stream_from_channel};
use sbs_detect_types::{BYTES_PER_PIXEL, FrameError, FrameResult, PixelSurface};

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Frame source that replays a directory of still images, sorted by file
/// name. Each image is one SBS candidate frame.
pub struct ImageDirProvider {
    files: Vec<PathBuf>,
    channel_capacity: usize,
}

impl ImageDirProvider {
    const DEFAULT_CHANNEL_CAPACITY: usize = 4;

    pub fn new(dir: PathBuf, channel_capacity: Option<usize>) -> FrameResult<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && has_supported_extension(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(FrameError::configuration(format!(
                "no image files found in {}",
                dir.display()
            )));
        }
        files.sort();
        Ok(Self {
            files,
            channel_capacity: channel_capacity
                .unwrap_or(Self::DEFAULT_CHANNEL_CAPACITY)
                .max(1),
        })
    }

    fn emit_frames(&self, tx: Sender<FrameResult<PixelSurface>>) {
        for (index, path) in self.files.iter().enumerate() {
            if tx.is_closed() {
                break;
            }
            let frame = load_surface(path).map(|frame| frame.with_frame_index(Some(index as u64)));
            if let Err(err) = &frame {
                warn!("skipping {}: {err}", path.display());
            }
            if tx.blocking_send(frame).is_err() {
                break;
            }
        }
    }
}

impl SurfaceProvider for ImageDirProvider {
    fn total_frames(&self) -> Option<u64> {
        Some(self.files.len() as u64)
    }

    fn into_stream(self: Box<Self>) -> SurfaceStream {
        let provider = *self;
        let capacity = provider.channel_capacity;
        spawn_stream_from_channel(capacity, move |tx| provider.emit_frames(tx))
    }
}

pub fn boxed_images(
    dir: PathBuf,
    channel_capacity: Option<usize>,
) -> FrameResult<DynSurfaceProvider> {
    Ok(Box::new(ImageDirProvider::new(dir, channel_capacity)?))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_surface(path: &Path) -> FrameResult<PixelSurface> {
    let decoded = image::open(path).map_err(|err| {
        FrameError::backend_failure("images", format!("failed to decode {}: {err}", path.display()))
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let stride = width as usize * BYTES_PER_PIXEL;
    PixelSurface::from_owned(width, height, stride, None, rgba.into_raw()).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn write_test_image(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
        let mut img = image::RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([rgb[0], rgb[1], rgb[2], 255]);
        }
        img.save(path).unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn image_directory_replays_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(&dir.path().join("b.png"), 8, 4, [0, 255, 0]);
        write_test_image(&dir.path().join("a.png"), 8, 4, [255, 0, 0]);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let provider: DynSurfaceProvider =
            Box::new(ImageDirProvider::new(dir.path().to_path_buf(), None).unwrap());
        assert_eq!(provider.total_frames(), Some(2));

        let mut stream = provider.into_stream();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.frame_index(), Some(0));
        assert_eq!(first.view().row(0)[0], 255);
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.view().row(0)[1], 255);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn empty_directory_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageDirProvider::new(dir.path().to_path_buf(), None),
            Err(FrameError::Configuration { .. })
        ));
    }
}
