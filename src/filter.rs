//! Gaussian pre-blur for color images.
//!
//! Blurring before clustering suppresses sensor noise and thin texture so
//! that pixels of one surface fall into one color cluster. The kernel follows
//! the `ksize`/`sigma` convention of the clustering pipeline; the separable
//! convolution itself runs through `imageproc` on an `f32` copy of the image
//! and is rounded back to `u8`. Pixels outside the image repeat the nearest
//! edge pixel.

use crate::image::{ImageView, OwnedImage, Rgb};
use crate::util::{ColorSegError, ColorSegResult};
use image::{ImageBuffer, Rgb as RgbPixel};
use imageproc::filter::separable_filter_equal;

/// Sigma used when the caller passes a non-positive value.
///
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`, the usual derivation from the
/// kernel length.
pub fn sigma_for_kernel(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Builds a normalized 1D Gaussian kernel of odd length `ksize`.
pub fn gaussian_kernel(ksize: usize, sigma: f32) -> ColorSegResult<Vec<f32>> {
    if ksize == 0 || ksize % 2 == 0 {
        return Err(ColorSegError::InvalidInput("kernel length must be odd"));
    }
    if !sigma.is_finite() {
        return Err(ColorSegError::InvalidInput("sigma must be finite"));
    }
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_for_kernel(ksize)
    };
    let radius = (ksize / 2) as f32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - radius;
            (-(x * x) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    Ok(kernel)
}

/// Blurs an RGB image with a `ksize x ksize` Gaussian.
///
/// `ksize` must be odd; `ksize == 1` returns a copy. A non-positive `sigma`
/// is derived from `ksize` via [`sigma_for_kernel`].
pub fn gaussian_blur_rgb(
    image: ImageView<'_, Rgb>,
    ksize: usize,
    sigma: f32,
) -> ColorSegResult<OwnedImage<Rgb>> {
    let kernel = gaussian_kernel(ksize, sigma)?;
    if ksize == 1 {
        return OwnedImage::from_view(image);
    }
    let (width, height) = (image.width(), image.height());
    let dims_err = ColorSegError::InvalidDimensions { width, height };
    let w = u32::try_from(width).map_err(|_| dims_err.clone())?;
    let h = u32::try_from(height).map_err(|_| dims_err.clone())?;

    let mut channels = Vec::with_capacity(image.len() * 3);
    for row in image.rows() {
        for px in row {
            channels.extend(px.iter().map(|&c| f32::from(c)));
        }
    }
    let src: ImageBuffer<RgbPixel<f32>, Vec<f32>> =
        ImageBuffer::from_raw(w, h, channels).ok_or(dims_err)?;
    let blurred = separable_filter_equal(&src, &kernel);

    let out = blurred
        .pixels()
        .map(|px| {
            let [c1, c2, c3] = px.0;
            [to_u8(c1), to_u8(c2), to_u8(c3)]
        })
        .collect();
    OwnedImage::new(out, width, height)
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{gaussian_blur_rgb, gaussian_kernel, sigma_for_kernel};
    use crate::image::ImageView;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7, 0.0).unwrap();
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..3 {
            assert!((kernel[i] - kernel[6 - i]).abs() < 1e-7);
        }
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn derived_sigma_for_fifteen_tap_kernel() {
        assert!((sigma_for_kernel(15) - 2.6).abs() < 1e-5);
    }

    #[test]
    fn even_kernel_is_rejected() {
        assert!(gaussian_kernel(4, 1.0).is_err());
        assert!(gaussian_kernel(0, 1.0).is_err());
    }

    #[test]
    fn border_repeats_the_edge_pixel() {
        let pixels = [[255u8, 255, 255], [0, 0, 0]];
        let view = ImageView::from_slice(&pixels, 2, 1).unwrap();
        let blurred = gaussian_blur_rgb(view, 3, 1.0).unwrap();
        let kernel = gaussian_kernel(3, 1.0).unwrap();
        // Left neighbour of x = 0 reads x = 0 again.
        let expected = ((kernel[0] + kernel[1]) * 255.0).round();
        assert!((f32::from(blurred.data()[0][0]) - expected).abs() <= 1.0);
        let expected = (kernel[0] * 255.0).round();
        assert!((f32::from(blurred.data()[1][0]) - expected).abs() <= 1.0);
    }

    #[test]
    fn strided_input_is_blurred_by_visible_pixels_only() {
        // Padding column holds 255; it must not leak into the result.
        let mut pixels = vec![[255u8, 255, 255]; 4 * 3];
        for y in 0..3 {
            for x in 0..3 {
                pixels[y * 4 + x] = [10, 20, 30];
            }
        }
        let view = ImageView::new(&pixels, 3, 3, 4).unwrap();
        let blurred = gaussian_blur_rgb(view, 5, 0.0).unwrap();
        assert_eq!(blurred.width(), 3);
        assert!(blurred.data().iter().all(|&px| px == [10, 20, 30]));
    }

    #[test]
    fn constant_image_is_a_fixed_point() {
        let pixels = vec![[40u8, 80, 120]; 5 * 4];
        let view = ImageView::from_slice(&pixels, 5, 4).unwrap();
        let blurred = gaussian_blur_rgb(view, 15, 0.0).unwrap();
        assert!(blurred.data().iter().all(|&px| px == [40, 80, 120]));
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut pixels = vec![[0u8, 0, 0]; 9 * 9];
        pixels[4 * 9 + 4] = [255, 255, 255];
        let view = ImageView::from_slice(&pixels, 9, 9).unwrap();
        let blurred = gaussian_blur_rgb(view, 3, 1.0).unwrap();
        let center = blurred.data()[4 * 9 + 4][0];
        let neighbor = blurred.data()[4 * 9 + 5][0];
        assert!(center < 255);
        assert!(neighbor > 0);
        assert!(center > neighbor);
        assert_eq!(blurred.data()[0], [0, 0, 0]);
    }
}
