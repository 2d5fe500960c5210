//! Rayon-parallel kernel (feature-gated).
//!
//! Rows are assigned independently; accumulation folds per-row partial sums
//! and reduces them once every row has been labelled. Output is bit-identical
//! to [`AssignScalar`](crate::kernel::scalar::AssignScalar).

use crate::image::{ImageView, Rgb};
use crate::kernel::{check_assign_args, nearest_centroid, AssignKernel, ClusterSums};
use crate::util::{ColorSegError, ColorSegResult};
use rayon::prelude::*;

/// Row-parallel assignment.
pub struct AssignRayon;

impl AssignKernel for AssignRayon {
    fn assign(
        image: ImageView<'_, Rgb>,
        centroids: &[Rgb],
        labels: &mut [u8],
    ) -> ColorSegResult<()> {
        check_assign_args(image, centroids, labels)?;
        labels
            .par_chunks_exact_mut(image.width())
            .enumerate()
            .try_for_each(|(y, out)| -> ColorSegResult<()> {
                let row = image.row(y).ok_or(ColorSegError::BufferTooSmall {
                    needed: image.len(),
                    got: image.as_slice().len(),
                })?;
                for (dst, &px) in out.iter_mut().zip(row) {
                    *dst = nearest_centroid(px, centroids);
                }
                Ok(())
            })
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
        labels
            .par_chunks_exact(image.width())
            .enumerate()
            .try_fold(
                || ClusterSums::zeros(k),
                |mut acc, (y, row_labels)| -> ColorSegResult<ClusterSums> {
                    let row = image.row(y).ok_or(ColorSegError::BufferTooSmall {
                        needed: image.len(),
                        got: image.as_slice().len(),
                    })?;
                    for (&px, &label) in row.iter().zip(row_labels) {
                        acc.add(label, px)?;
                    }
                    Ok(acc)
                },
            )
            .try_reduce(|| ClusterSums::zeros(k), |a, b| Ok(a.merge(b)))
    }
}
