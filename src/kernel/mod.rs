//! Nearest-centroid assignment kernels and per-label accumulation.
//!
//! The assignment step is independent per pixel, so kernels are free to split
//! the image by rows. The accumulation step is the only reduction of an
//! iteration: it must see every label written by the assignment before the
//! centroids can be recomputed.

use crate::image::{ImageView, Rgb};
use crate::util::math::color_dist;
use crate::util::{ColorSegError, ColorSegResult};

/// Kernel trait for the assignment step.
pub trait AssignKernel {
    /// Writes the nearest-centroid label of every pixel into `labels`
    /// (row-major, `width * height` entries).
    fn assign(image: ImageView<'_, Rgb>, centroids: &[Rgb], labels: &mut [u8])
        -> ColorSegResult<()>;

    /// Sums channels and counts pixels per label for labels `0..k`.
    fn accumulate(image: ImageView<'_, Rgb>, labels: &[u8], k: usize)
        -> ColorSegResult<ClusterSums>;
}

/// Per-label channel sums and pixel counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterSums {
    /// Channel sums indexed by label.
    pub sums: Vec<[u64; 3]>,
    /// Pixel counts indexed by label.
    pub counts: Vec<u64>,
}

impl ClusterSums {
    /// Creates zeroed sums for `k` labels.
    pub fn zeros(k: usize) -> Self {
        Self {
            sums: vec![[0u64; 3]; k],
            counts: vec![0u64; k],
        }
    }

    /// Adds one pixel to `label`; labels outside `0..k` are rejected.
    #[inline]
    pub(crate) fn add(&mut self, label: u8, px: Rgb) -> ColorSegResult<()> {
        let idx = label as usize;
        let (sum, count) = match (self.sums.get_mut(idx), self.counts.get_mut(idx)) {
            (Some(sum), Some(count)) => (sum, count),
            _ => return Err(ColorSegError::InvalidInput("label outside cluster range")),
        };
        sum[0] += u64::from(px[0]);
        sum[1] += u64::from(px[1]);
        sum[2] += u64::from(px[2]);
        *count += 1;
        Ok(())
    }

    /// Merges another partial accumulation into this one.
    pub(crate) fn merge(mut self, other: Self) -> Self {
        for (dst, src) in self.sums.iter_mut().zip(other.sums.iter()) {
            dst[0] += src[0];
            dst[1] += src[1];
            dst[2] += src[2];
        }
        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += *src;
        }
        self
    }
}

/// Returns the label of the closest centroid, lowest index on ties.
///
/// A later centroid replaces the running best only when it is strictly
/// closer, so equal distances keep the earlier label.
#[inline]
pub(crate) fn nearest_centroid(px: Rgb, centroids: &[Rgb]) -> u8 {
    let mut best_label = 0usize;
    let mut best_dist = color_dist(px, centroids[0]);
    for (idx, &centroid) in centroids.iter().enumerate().skip(1) {
        let dist = color_dist(px, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_label = idx;
        }
    }
    best_label as u8
}

pub(crate) fn check_assign_args(
    image: ImageView<'_, Rgb>,
    centroids: &[Rgb],
    labels: &[u8],
) -> ColorSegResult<()> {
    if centroids.is_empty() {
        return Err(ColorSegError::InvalidInput("no centroids"));
    }
    if centroids.len() > usize::from(u8::MAX) + 1 {
        return Err(ColorSegError::InvalidInput("more centroids than u8 labels"));
    }
    if labels.len() != image.len() {
        return Err(ColorSegError::BufferTooSmall {
            needed: image.len(),
            got: labels.len(),
        });
    }
    Ok(())
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;
