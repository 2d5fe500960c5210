//! Centroid seeding.

use crate::image::Rgb;
use crate::segment::{Centroid, SegmentConfig};
use rand::Rng;

/// Exclusive upper bound for random channel values.
const RANDOM_CHANNEL_END: u8 = 255;

/// Draws a color with every channel uniform in `0..255`, channels in order.
pub(crate) fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let c0 = rng.random_range(0..RANDOM_CHANNEL_END);
    let c1 = rng.random_range(0..RANDOM_CHANNEL_END);
    let c2 = rng.random_range(0..RANDOM_CHANNEL_END);
    [c0, c1, c2]
}

/// Builds the starting centroids in label order.
///
/// Pinned labels take their configured color and never consume random draws,
/// so adding a pinned label shifts the draws seen by later free labels.
pub(crate) fn init_centroids<R: Rng + ?Sized>(cfg: &SegmentConfig, rng: &mut R) -> Vec<Centroid> {
    (0..cfg.k)
        .map(|label| match cfg.fixed_centroids.get(&label) {
            Some(&color) => Centroid { color, fixed: true },
            None => Centroid {
                color: random_color(rng),
                fixed: false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{init_centroids, random_color};
    use crate::segment::SegmentConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_channels_stay_below_255() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let color = random_color(&mut rng);
            assert!(color.iter().all(|&c| c < 255));
        }
    }

    #[test]
    fn pinned_labels_are_marked_fixed() {
        let cfg = SegmentConfig {
            k: 3,
            ..SegmentConfig::default()
        }
        .with_fixed(1, [10, 20, 30]);
        let mut rng = StdRng::seed_from_u64(1);
        let centroids = init_centroids(&cfg, &mut rng);
        assert_eq!(centroids.len(), 3);
        assert!(!centroids[0].fixed);
        assert!(centroids[1].fixed);
        assert_eq!(centroids[1].color, [10, 20, 30]);
        assert!(!centroids[2].fixed);
    }
}
