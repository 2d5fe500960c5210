//! K-means color segmentation with optional pinned centroids.
//!
//! The segmenter runs Lloyd's iteration in 3-channel color space:
//! assign every pixel to its nearest centroid, recompute each free centroid as
//! the truncating integer mean of its pixels, and stop once the mean centroid
//! movement (the *gap*) drops to the configured threshold. Pinned centroids
//! keep their configured color for the whole run. A free centroid that loses
//! all of its pixels is re-seeded with a random color rather than frozen.
//!
//! Distances are Euclidean and truncated to integers before comparison, both
//! for the nearest-centroid search (lowest label wins ties) and for the gap.

mod cancel;
mod init;

pub use cancel::CancelToken;

use crate::image::{ImageView, Rgb};
#[cfg(feature = "rayon")]
use crate::kernel::rayon::AssignRayon;
use crate::kernel::scalar::AssignScalar;
use crate::kernel::AssignKernel;
use crate::labels::LabelGrid;
use crate::trace::{enter_span, trace_event};
use crate::util::math::{color_dist, trunc_mean};
use crate::util::{ColorSegError, ColorSegResult, ConfigError};
use init::{init_centroids, random_color};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Largest cluster count representable by `u8` labels.
pub const MAX_CLUSTERS: usize = u8::MAX as usize + 1;

/// Configuration for a segmentation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Number of clusters; labels are `0..k`.
    pub k: usize,
    /// Labels pinned to a known color. Pinned centroids are never recomputed.
    pub fixed_centroids: BTreeMap<usize, Rgb>,
    /// Iteration stops once the gap is less than or equal to this value.
    pub convergence_threshold: u32,
    /// Safety cap on iterations; `None` loops until convergence.
    pub max_iterations: Option<usize>,
    /// Seed for the centroid generator; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Use the row-parallel kernel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            k: 4,
            fixed_centroids: BTreeMap::new(),
            convergence_threshold: 1,
            max_iterations: Some(100),
            seed: None,
            parallel: false,
        }
    }
}

impl SegmentConfig {
    /// Pins `label` to `color`, replacing any earlier pin for that label.
    pub fn with_fixed(mut self, label: usize, color: Rgb) -> Self {
        self.fixed_centroids.insert(label, color);
        self
    }

    /// Checks the configuration without touching any image.
    pub fn validate(&self) -> ColorSegResult<()> {
        if self.k == 0 {
            return Err(ConfigError::ZeroClusters.into());
        }
        if self.k > MAX_CLUSTERS {
            return Err(ConfigError::TooManyClusters { k: self.k }.into());
        }
        if let Some((&label, _)) = self.fixed_centroids.range(self.k..).next() {
            return Err(ConfigError::FixedLabelOutOfRange { label, k: self.k }.into());
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::ZeroIterationCap.into());
        }
        Ok(())
    }
}

/// Cluster representative color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Centroid {
    /// Current mean color of the cluster.
    pub color: Rgb,
    /// Pinned centroids keep their color for the whole run.
    pub fixed: bool,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// The gap fell to the threshold.
    Converged,
    /// The iteration cap was reached first; `gap` is the last measured gap.
    DidNotConverge { gap: u32 },
}

/// Diagnostics for one assign/update/measure cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationStats {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Mean movement of the free centroids during this iteration.
    pub gap: u32,
    /// Free labels that received no pixels and were re-seeded.
    pub reinitialized: Vec<usize>,
    /// Centroids used by this iteration's assignment step.
    pub centroids: Vec<Centroid>,
    /// Pixels per label after the assignment step.
    pub counts: Vec<usize>,
}

/// Result of a segmentation run.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Labels from the last assignment step.
    pub labels: LabelGrid,
    /// Centroids after the last update step.
    pub centroids: Vec<Centroid>,
    /// Per-iteration diagnostics, in order.
    pub iterations: Vec<IterationStats>,
    /// Whether the gap reached the threshold.
    pub convergence: Convergence,
}

impl Segmentation {
    /// Returns true when the run converged.
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    /// Number of iterations performed.
    pub fn iteration_count(&self) -> usize {
        self.iterations.len()
    }

    /// Gap measured by the last iteration.
    pub fn final_gap(&self) -> Option<u32> {
        self.iterations.last().map(|it| it.gap)
    }

    /// Returns the labels, or `DidNotConverge` if the iteration cap was hit.
    pub fn into_converged(self) -> ColorSegResult<LabelGrid> {
        match self.convergence {
            Convergence::Converged => Ok(self.labels),
            Convergence::DidNotConverge { gap } => Err(ColorSegError::DidNotConverge {
                iterations: self.iterations.len(),
                gap,
            }),
        }
    }
}

/// Validated k-means color segmenter.
///
/// A segmenter holds only its configuration; every call to
/// [`segment`](Self::segment) is an independent run.
#[derive(Clone, Debug)]
pub struct Segmenter {
    cfg: SegmentConfig,
    cancel: Option<CancelToken>,
}

impl Segmenter {
    /// Validates `cfg` and creates a segmenter.
    pub fn new(cfg: SegmentConfig) -> ColorSegResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, cancel: None })
    }

    /// Attaches a token polled at every iteration boundary.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SegmentConfig {
        &self.cfg
    }

    /// Segments `image` with a generator seeded from the configuration.
    pub fn segment(&self, image: ImageView<'_, Rgb>) -> ColorSegResult<Segmentation> {
        let mut rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.segment_with_rng(image, &mut rng)
    }

    /// Segments `image` drawing random centroids from `rng`.
    pub fn segment_with_rng<R: Rng + ?Sized>(
        &self,
        image: ImageView<'_, Rgb>,
        rng: &mut R,
    ) -> ColorSegResult<Segmentation> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return self.run::<AssignRayon, R>(image, rng);
        }
        self.run::<AssignScalar, R>(image, rng)
    }

    fn run<K: AssignKernel, R: Rng + ?Sized>(
        &self,
        image: ImageView<'_, Rgb>,
        rng: &mut R,
    ) -> ColorSegResult<Segmentation> {
        if image.is_empty() {
            return Err(ConfigError::EmptyImage.into());
        }
        let cfg = &self.cfg;
        let k = cfg.k;
        let _span = enter_span!(
            "segment",
            k = k,
            width = image.width(),
            height = image.height()
        );

        let mut centroids = init_centroids(cfg, rng);
        let mut labels = vec![0u8; image.len()];
        let mut colors: Vec<Rgb> = Vec::with_capacity(k);
        let mut history: Vec<IterationStats> = Vec::new();

        let convergence = loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(ColorSegError::Cancelled {
                    iterations: history.len(),
                });
            }
            let iteration = history.len() + 1;
            let used = centroids.clone();

            colors.clear();
            colors.extend(centroids.iter().map(|c| c.color));
            K::assign(image, &colors, &mut labels)?;
            let sums = K::accumulate(image, &labels, k)?;

            let mut reinitialized = Vec::new();
            let mut moved = 0u32;
            for (label, centroid) in centroids.iter_mut().enumerate() {
                if centroid.fixed {
                    continue;
                }
                let previous = centroid.color;
                let count = sums.counts[label];
                if count > 0 {
                    let sum = sums.sums[label];
                    centroid.color = [
                        trunc_mean(sum[0], count),
                        trunc_mean(sum[1], count),
                        trunc_mean(sum[2], count),
                    ];
                } else {
                    centroid.color = random_color(rng);
                    reinitialized.push(label);
                    trace_event!(
                        debug,
                        "cluster_reinitialized",
                        label = label,
                        iteration = iteration
                    );
                }
                moved += color_dist(centroid.color, previous);
            }
            let gap = moved / k as u32;
            trace_event!(info, "kmeans_iteration", iteration = iteration, gap = gap);

            history.push(IterationStats {
                iteration,
                gap,
                reinitialized,
                centroids: used,
                counts: sums.counts.iter().map(|&c| c as usize).collect(),
            });

            if gap <= cfg.convergence_threshold {
                break Convergence::Converged;
            }
            if cfg.max_iterations.is_some_and(|cap| iteration >= cap) {
                break Convergence::DidNotConverge { gap };
            }
        };

        let converged = convergence == Convergence::Converged;
        trace_event!(
            info,
            "kmeans_done",
            iterations = history.len(),
            converged = converged
        );

        Ok(Segmentation {
            labels: LabelGrid::from_parts(labels, image.width(), image.height()),
            centroids,
            iterations: history,
            convergence,
        })
    }
}

/// One-shot segmentation of a contiguous row-major buffer.
///
/// The configuration is validated first; a buffer with zero pixels is then
/// reported as [`ConfigError::EmptyImage`].
pub fn segment_pixels(
    data: &[Rgb],
    width: usize,
    height: usize,
    cfg: &SegmentConfig,
) -> ColorSegResult<Segmentation> {
    let segmenter = Segmenter::new(cfg.clone())?;
    if width == 0 || height == 0 || data.is_empty() {
        return Err(ConfigError::EmptyImage.into());
    }
    let image = ImageView::from_slice(data, width, height)?;
    segmenter.segment(image)
}

#[cfg(test)]
mod tests {
    use super::{Convergence, SegmentConfig, Segmenter};
    use crate::image::ImageView;
    use crate::util::{ColorSegError, ConfigError};

    #[test]
    fn all_pinned_run_stops_after_one_iteration() {
        let cfg = SegmentConfig {
            k: 2,
            seed: Some(3),
            ..SegmentConfig::default()
        }
        .with_fixed(0, [0, 0, 0])
        .with_fixed(1, [255, 255, 255]);
        let pixels = [[10u8, 10, 10], [240, 240, 240], [20, 0, 0]];
        let view = ImageView::from_slice(&pixels, 3, 1).unwrap();
        let seg = Segmenter::new(cfg).unwrap().segment(view).unwrap();
        assert_eq!(seg.iteration_count(), 1);
        assert_eq!(seg.final_gap(), Some(0));
        assert_eq!(seg.convergence, Convergence::Converged);
        assert_eq!(seg.labels.as_slice(), &[0, 1, 0]);
    }

    #[test]
    fn single_cluster_lands_on_truncated_mean() {
        let cfg = SegmentConfig {
            k: 1,
            seed: Some(11),
            convergence_threshold: 0,
            ..SegmentConfig::default()
        };
        let pixels = [[10u8, 20, 31], [11, 21, 30]];
        let view = ImageView::from_slice(&pixels, 2, 1).unwrap();
        let seg = Segmenter::new(cfg).unwrap().segment(view).unwrap();
        assert!(seg.converged());
        assert_eq!(seg.labels.as_slice(), &[0, 0]);
        assert_eq!(seg.centroids[0].color, [10, 20, 30]);
    }

    #[test]
    fn rejects_fixed_label_outside_k() {
        let cfg = SegmentConfig {
            k: 2,
            ..SegmentConfig::default()
        }
        .with_fixed(5, [1, 2, 3]);
        let err = Segmenter::new(cfg).err().unwrap();
        assert_eq!(
            err,
            ColorSegError::InvalidConfiguration(ConfigError::FixedLabelOutOfRange { label: 5, k: 2 })
        );
    }

    #[test]
    fn rejects_zero_iteration_cap() {
        let cfg = SegmentConfig {
            max_iterations: Some(0),
            ..SegmentConfig::default()
        };
        let err = Segmenter::new(cfg).err().unwrap();
        assert_eq!(
            err,
            ColorSegError::InvalidConfiguration(ConfigError::ZeroIterationCap)
        );
    }
}
