#[cfg(feature = "detector-parallel")]
use rayon::prelude::*;

use sbs_detect_types::{BYTES_PER_PIXEL, DetectError, DetectResult, LuminanceGrid, SurfaceView};

// Rec. 601 weights applied to the R/G/B channels; alpha is dropped and no
// gamma correction is performed.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Nearest-neighbor downsample of an RGBA8 surface into a luma grid.
///
/// Source coordinates truncate (`src_x = trunc(x * width / target_width)`)
/// rather than round. The resulting bias toward lower-indexed source pixels
/// is part of the classifier's calibration and must not change. Coordinates
/// are clamped to the surface bounds, so a target larger than the source
/// stays memory-safe and repeats edge pixels.
pub fn downsample(
    surface: &SurfaceView<'_>,
    target_width: usize,
    target_height: usize,
) -> DetectResult<LuminanceGrid> {
    if target_width == 0 {
        return Err(DetectError::invalid_dimension("target_width", 0));
    }
    if target_height == 0 {
        return Err(DetectError::invalid_dimension("target_height", 0));
    }

    let width = surface.width() as usize;
    let height = surface.height() as usize;
    let scale_x = width as f32 / target_width as f32;
    let scale_y = height as f32 / target_height as f32;

    let mut grid = LuminanceGrid::new(target_width, target_height);

    let fill_row = |ty: usize, out_row: &mut [u8]| {
        let src_y = ((ty as f32 * scale_y) as usize).min(height - 1);
        let src_row = surface.row(src_y);
        for (tx, out) in out_row.iter_mut().enumerate() {
            let src_x = ((tx as f32 * scale_x) as usize).min(width - 1);
            let offset = src_x * BYTES_PER_PIXEL;
            *out = luma(src_row[offset], src_row[offset + 1], src_row[offset + 2]);
        }
    };

    #[cfg(feature = "detector-parallel")]
    {
        grid.data_mut()
            .par_chunks_mut(target_width)
            .enumerate()
            .for_each(|(ty, out_row)| fill_row(ty, out_row));
    }

    #[cfg(not(feature = "detector-parallel"))]
    {
        for (ty, out_row) in grid.data_mut().chunks_mut(target_width).enumerate() {
            fill_row(ty, out_row);
        }
    }

    Ok(grid)
}

/// Downsamples both halves of a stereo candidate, enforcing the equal-size
/// precondition on the two surfaces.
pub fn downsample_pair(
    left: &SurfaceView<'_>,
    right: &SurfaceView<'_>,
    target_width: usize,
    target_height: usize,
) -> DetectResult<(LuminanceGrid, LuminanceGrid)> {
    if left.width() != right.width() || left.height() != right.height() {
        return Err(DetectError::DimensionMismatch {
            left_width: left.width() as usize,
            left_height: left.height() as usize,
            right_width: right.width() as usize,
            right_height: right.height() as usize,
        });
    }
    let grid_left = downsample(left, target_width, target_height)?;
    let grid_right = downsample(right, target_width, target_height)?;
    Ok((grid_left, grid_right))
}

#[inline(always)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32) as u8
}
