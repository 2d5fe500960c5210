//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage, Rgb};
use crate::labels::LabelGrid;
use crate::util::{ColorSegError, ColorSegResult};
use std::path::Path;

/// Creates an owned color image from an 8-bit RGB buffer.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> ColorSegResult<OwnedImage<Rgb>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.pixels().map(|px| px.0).collect();
    OwnedImage::new(data, width, height)
}

/// Creates an owned color image from a dynamic image, dropping alpha.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> ColorSegResult<OwnedImage<Rgb>> {
    owned_from_rgb_image(&img.to_rgb8())
}

/// Loads an image from disk and converts it to an owned RGB image.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> ColorSegResult<OwnedImage<Rgb>> {
    let img = image::open(path).map_err(|err| ColorSegError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Writes a single-channel view to disk; the format follows the extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, view: ImageView<'_, u8>) -> ColorSegResult<()> {
    let width = u32::try_from(view.width()).map_err(|_| ColorSegError::InvalidDimensions {
        width: view.width(),
        height: view.height(),
    })?;
    let height = u32::try_from(view.height()).map_err(|_| ColorSegError::InvalidDimensions {
        width: view.width(),
        height: view.height(),
    })?;
    let owned = OwnedImage::from_view(view)?;
    let buffer = image::GrayImage::from_raw(width, height, owned.into_vec())
        .ok_or(ColorSegError::InvalidInput("gray buffer does not match dimensions"))?;
    buffer.save(path).map_err(|err| ColorSegError::ImageIo {
        reason: err.to_string(),
    })
}

/// Renders labels as gray levels (`label * scale`, saturating) for inspection.
pub fn labels_to_gray(grid: &LabelGrid, scale: u8) -> ColorSegResult<OwnedImage<u8>> {
    let data = grid
        .as_slice()
        .iter()
        .map(|&label| label.saturating_mul(scale))
        .collect();
    OwnedImage::new(data, grid.width(), grid.height())
}
