//! Color-space helpers shared by the assignment kernels and the update step.

use crate::image::Rgb;

/// Squared Euclidean distance between two colors.
#[inline]
pub(crate) fn dist_sq(a: Rgb, b: Rgb) -> u32 {
    let d0 = i32::from(a[0]) - i32::from(b[0]);
    let d1 = i32::from(a[1]) - i32::from(b[1]);
    let d2 = i32::from(a[2]) - i32::from(b[2]);
    (d0 * d0 + d1 * d1 + d2 * d2) as u32
}

/// Euclidean distance between two colors, truncated toward zero.
///
/// Both the nearest-centroid search and the convergence gap compare these
/// truncated values, so two centroids whose real distances differ by less
/// than one unit can tie.
#[inline]
pub(crate) fn color_dist(a: Rgb, b: Rgb) -> u32 {
    f64::from(dist_sq(a, b)).sqrt() as u32
}

/// Integer mean of a channel sum, truncating toward zero.
#[inline]
pub(crate) fn trunc_mean(sum: u64, count: u64) -> u8 {
    debug_assert!(count > 0);
    (sum / count).min(u64::from(u8::MAX)) as u8
}
