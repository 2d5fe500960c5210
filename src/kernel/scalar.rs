//! Scalar reference kernel.

use crate::image::{ImageView, Rgb};
use crate::kernel::{check_assign_args, nearest_centroid, AssignKernel, ClusterSums};
use crate::util::{ColorSegError, ColorSegResult};

/// Single-threaded row-major assignment.
pub struct AssignScalar;

impl AssignKernel for AssignScalar {
    fn assign(
        image: ImageView<'_, Rgb>,
        centroids: &[Rgb],
        labels: &mut [u8],
    ) -> ColorSegResult<()> {
        check_assign_args(image, centroids, labels)?;
        let width = image.width();
        for (y, out) in labels.chunks_exact_mut(width).enumerate() {
            let row = image.row(y).ok_or(ColorSegError::BufferTooSmall {
                needed: image.len(),
                got: image.as_slice().len(),
            })?;
            for (dst, &px) in out.iter_mut().zip(row) {
                *dst = nearest_centroid(px, centroids);
            }
        }
        Ok(())
    }

    fn accumulate(
        image: ImageView<'_, Rgb>,
        labels: &[u8],
        k: usize,
    ) -> ColorSegResult<ClusterSums> {
        if labels.len() != image.len() {
            return Err(ColorSegError::BufferTooSmall {
                needed: image.len(),
                got: labels.len(),
            });
        }
        let mut sums = ClusterSums::zeros(k);
        for (row, row_labels) in image.rows().zip(labels.chunks_exact(image.width())) {
            for (&px, &label) in row.iter().zip(row_labels) {
                sums.add(label, px)?;
            }
        }
        Ok(sums)
    }
}
