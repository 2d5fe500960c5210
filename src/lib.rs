//! colorseg is a CPU-first k-means color segmenter with pinned centroids.
//!
//! The core [`Segmenter`] clusters the pixels of a (pre-blurred) color image
//! into `k` labels with Lloyd's iteration, keeping any caller-pinned centroid
//! colors fixed. Around it the crate provides a Gaussian pre-blur, binary
//! morphology for turning one label into a thin-line mask, optional row
//! parallelism via the `rayon` feature, and file I/O via `image-io`.

pub mod filter;
pub mod image;
pub mod kernel;
pub mod labels;
pub mod morph;
pub mod segment;
mod trace;
pub mod util;

pub use filter::gaussian_blur_rgb;
pub use image::{ImageView, OwnedImage, Rgb};
pub use labels::LabelGrid;
pub use morph::{extract_lines, LineExtractConfig, LineExtraction, StructuringElement};
pub use segment::{
    segment_pixels, CancelToken, Centroid, Convergence, IterationStats, SegmentConfig,
    Segmentation, Segmenter,
};
pub use util::{ColorSegError, ColorSegResult, ConfigError};

#[cfg(feature = "image-io")]
pub use image::io;
