//! Per-pixel cluster labels produced by the segmenter.

use crate::image::{ImageView, OwnedImage};
use crate::util::ColorSegResult;

/// Mask value for pixels selected by [`LabelGrid::mask_for`].
pub const MASK_ON: u8 = 255;

/// Row-major grid holding one cluster label per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGrid {
    labels: Vec<u8>,
    width: usize,
    height: usize,
}

impl LabelGrid {
    /// Wraps a row-major label buffer of exactly `width * height` entries.
    pub fn from_vec(labels: Vec<u8>, width: usize, height: usize) -> ColorSegResult<Self> {
        let owned = OwnedImage::new(labels, width, height)?;
        Ok(Self {
            width: owned.width(),
            height: owned.height(),
            labels: owned.into_vec(),
        })
    }

    pub(crate) fn from_parts(labels: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(labels.len(), width * height);
        Self {
            labels,
            width,
            height,
        }
    }

    /// Returns the grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the labels in row-major order.
    pub fn as_slice(&self) -> &[u8] {
        &self.labels
    }

    /// Returns the label at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels.get(y * self.width + x).copied()
    }

    /// Returns a borrowed view over the labels.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView::from_slice(&self.labels, self.width, self.height)
            .expect("label grid dimensions are validated on creation")
    }

    /// Counts pixels per label for labels `0..k`; labels `>= k` are ignored.
    pub fn counts(&self, k: usize) -> Vec<usize> {
        let mut counts = vec![0usize; k];
        for &label in &self.labels {
            if let Some(slot) = counts.get_mut(label as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// Binary mask with [`MASK_ON`] where the pixel carries `label`, 0 elsewhere.
    pub fn mask_for(&self, label: u8) -> OwnedImage<u8> {
        let data = self
            .labels
            .iter()
            .map(|&l| if l == label { MASK_ON } else { 0 })
            .collect();
        OwnedImage::new(data, self.width, self.height)
            .expect("label grid dimensions are validated on creation")
    }
}

#[cfg(test)]
mod tests {
    use super::{LabelGrid, MASK_ON};

    #[test]
    fn mask_selects_single_label() {
        let grid = LabelGrid::from_vec(vec![0, 1, 2, 1], 2, 2).unwrap();
        let mask = grid.mask_for(1);
        assert_eq!(mask.data(), &[0, MASK_ON, 0, MASK_ON]);
    }

    #[test]
    fn counts_ignore_out_of_range_labels() {
        let grid = LabelGrid::from_vec(vec![0, 1, 3, 1], 2, 2).unwrap();
        assert_eq!(grid.counts(2), vec![1, 2]);
    }
}
