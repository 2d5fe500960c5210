//! Error types for colorseg.

use thiserror::Error;

/// Result alias for colorseg operations.
pub type ColorSegResult<T> = std::result::Result<T, ColorSegError>;

/// Errors that can occur when running colorseg algorithms.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ColorSegError {
    /// Width or height is zero or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The segmenter configuration was rejected before any iteration ran.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// The iteration cap was reached with the gap still above threshold.
    #[error("k-means did not converge after {iterations} iterations (gap {gap})")]
    DidNotConverge { iterations: usize, gap: u32 },
    /// The run was stopped through its cancel token.
    #[error("segmentation cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
    /// Image decoding or encoding failed.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

/// Reasons a segmentation configuration is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cluster count must be at least 1")]
    ZeroClusters,
    #[error("cluster count {k} exceeds the 256 labels a u8 grid can hold")]
    TooManyClusters { k: usize },
    #[error("fixed centroid label {label} is outside [0, {k})")]
    FixedLabelOutOfRange { label: usize, k: usize },
    #[error("max_iterations must be at least 1 when set")]
    ZeroIterationCap,
    #[error("image has no pixels")]
    EmptyImage,
}
