#[cfg(target_arch = "aarch64")]
use std::arch::is_aarch64_feature_detected;
#[cfg(target_arch = "x86_64")]
use std::arch::is_x86_feature_detected;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m128i, __m256i, _mm_add_epi64, _mm_loadu_si128, _mm_sad_epu8, _mm_setzero_si128,
    _mm_storeu_si128, _mm256_add_epi64, _mm256_loadu_si256, _mm256_sad_epu8,
    _mm256_setzero_si256, _mm256_storeu_si256,
};

use sbs_detect_types::{DetectError, DetectResult, LuminanceGrid};

/// Maximum absolute difference between two 8-bit luma samples.
const MAX_SAMPLE_DELTA: f32 = 255.0;

/// Integer sum of absolute differences over two equal-length sample slices.
///
/// Dispatches to a wide-vector kernel when the CPU has one; the scalar loop
/// covers the remainder lanes and platforms without vector support. Every
/// path produces the same integer sum, so the choice of kernel never
/// changes a classification.
pub fn sum_abs_diff(left: &[u8], right: &[u8]) -> u64 {
    debug_assert_eq!(left.len(), right.len());

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return unsafe { sum_abs_diff_avx2(left, right) };
        }
        if is_x86_feature_detected!("sse2") {
            return unsafe { sum_abs_diff_sse2(left, right) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if is_aarch64_feature_detected!("neon") {
            return unsafe { sum_abs_diff_neon(left, right) };
        }
    }

    sum_abs_diff_scalar(left, right)
}

fn sum_abs_diff_scalar(left: &[u8], right: &[u8]) -> u64 {
    left.iter()
        .zip(right.iter())
        .map(|(&l, &r)| l.abs_diff(r) as u64)
        .sum()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sum_abs_diff_avx2(left: &[u8], right: &[u8]) -> u64 {
    let len = left.len();
    let mut acc = _mm256_setzero_si256();
    let mut i = 0usize;
    while i + 32 <= len {
        let l = _mm256_loadu_si256(left.as_ptr().add(i) as *const __m256i);
        let r = _mm256_loadu_si256(right.as_ptr().add(i) as *const __m256i);
        // _mm256_sad_epu8 leaves four 64-bit partial sums, one per lane.
        acc = _mm256_add_epi64(acc, _mm256_sad_epu8(l, r));
        i += 32;
    }
    let mut lanes = [0u64; 4];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, acc);
    lanes.iter().sum::<u64>() + sum_abs_diff_scalar(&left[i..], &right[i..])
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn sum_abs_diff_sse2(left: &[u8], right: &[u8]) -> u64 {
    let len = left.len();
    let mut acc = _mm_setzero_si128();
    let mut i = 0usize;
    while i + 16 <= len {
        let l = _mm_loadu_si128(left.as_ptr().add(i) as *const __m128i);
        let r = _mm_loadu_si128(right.as_ptr().add(i) as *const __m128i);
        acc = _mm_add_epi64(acc, _mm_sad_epu8(l, r));
        i += 16;
    }
    let mut lanes = [0u64; 2];
    _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, acc);
    lanes[0] + lanes[1] + sum_abs_diff_scalar(&left[i..], &right[i..])
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn sum_abs_diff_neon(left: &[u8], right: &[u8]) -> u64 {
    use std::arch::aarch64::{vabdq_u8, vaddlvq_u16, vaddq_u16, vld1q_u8, vpaddlq_u8};

    let len = left.len();
    let mut total = 0u64;
    let mut i = 0usize;
    // 64 samples per iteration; four widened partial sums stay far below
    // the u16 lane limit before the horizontal add.
    while i + 64 <= len {
        let d0 = vabdq_u8(vld1q_u8(left.as_ptr().add(i)), vld1q_u8(right.as_ptr().add(i)));
        let d1 = vabdq_u8(
            vld1q_u8(left.as_ptr().add(i + 16)),
            vld1q_u8(right.as_ptr().add(i + 16)),
        );
        let d2 = vabdq_u8(
            vld1q_u8(left.as_ptr().add(i + 32)),
            vld1q_u8(right.as_ptr().add(i + 32)),
        );
        let d3 = vabdq_u8(
            vld1q_u8(left.as_ptr().add(i + 48)),
            vld1q_u8(right.as_ptr().add(i + 48)),
        );
        let sum = vaddq_u16(
            vaddq_u16(vpaddlq_u8(d0), vpaddlq_u8(d1)),
            vaddq_u16(vpaddlq_u8(d2), vpaddlq_u8(d3)),
        );
        total += vaddlvq_u16(sum) as u64;
        i += 64;
    }
    total + sum_abs_diff_scalar(&left[i..], &right[i..])
}

/// Correlation score in [0, 1] between two luma grids: 1.0 means
/// pixel-identical luminance, 0.0 a full 255-magnitude average difference.
///
/// The accumulator is integer throughout; floats appear only in the final
/// normalization.
pub fn correlation(left: &LuminanceGrid, right: &LuminanceGrid) -> DetectResult<f32> {
    if !left.same_dimensions(right) {
        return Err(DetectError::DimensionMismatch {
            left_width: left.width(),
            left_height: left.height(),
            right_width: right.width(),
            right_height: right.height(),
        });
    }
    if left.is_empty() {
        return Err(DetectError::invalid_dimension("cell count", 0));
    }
    let total = sum_abs_diff(left.data(), right.data());
    let normalized = total as f32 / (MAX_SAMPLE_DELTA * left.len() as f32);
    Ok(1.0 - normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(width: usize, height: usize, fill: impl Fn(usize) -> u8) -> LuminanceGrid {
        let mut grid = LuminanceGrid::new(width, height);
        for (i, cell) in grid.data_mut().iter_mut().enumerate() {
            *cell = fill(i);
        }
        grid
    }

    #[test]
    fn scalar_and_dispatched_sums_agree() {
        // One exact batch multiple (4096 = 64x64), several that are not.
        for len in [0usize, 1, 15, 100, 130, 4095, 4096, 5000] {
            let left: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
            let right: Vec<u8> = (0..len).map(|i| (i * 101 + 13) as u8).collect();
            assert_eq!(
                sum_abs_diff(&left, &right),
                sum_abs_diff_scalar(&left, &right),
                "len {len}"
            );
        }
    }

    #[test]
    fn identical_grids_have_unit_correlation() {
        let grid = grid_from(64, 64, |i| (i % 251) as u8);
        assert_eq!(correlation(&grid, &grid).unwrap(), 1.0);
    }

    #[test]
    fn maximal_difference_has_zero_correlation() {
        let white = grid_from(64, 64, |_| 255);
        let black = grid_from(64, 64, |_| 0);
        assert_eq!(sum_abs_diff(white.data(), black.data()), 64 * 64 * 255);
        assert_eq!(correlation(&white, &black).unwrap(), 0.0);
    }

    #[test]
    fn summation_order_is_irrelevant() {
        let a = grid_from(32, 9, |i| (i * 3) as u8);
        let b = grid_from(32, 9, |i| (i * 7 + 40) as u8);
        assert_eq!(
            correlation(&a, &b).unwrap(),
            correlation(&b, &a).unwrap()
        );
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let a = LuminanceGrid::new(64, 64);
        let b = LuminanceGrid::new(64, 32);
        assert!(matches!(
            correlation(&a, &b),
            Err(DetectError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_grids_are_rejected() {
        let a = LuminanceGrid::new(0, 0);
        let b = LuminanceGrid::new(0, 0);
        assert!(matches!(
            correlation(&a, &b),
            Err(DetectError::InvalidDimension { .. })
        ));
    }
}
