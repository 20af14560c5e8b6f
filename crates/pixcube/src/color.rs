//! Color quantization and the redmean distance metric
//!
//! Colors are reduced to a 3:3:2-bit bucket scheme: 8 levels of red,
//! 8 of green and 4 of blue, 256 buckets total. Both the sample palette
//! and rendered pixels pass through the same reduction, so matching only
//! ever compares quantized triples.

use crate::types::BlockRef;

/// Number of distinct quantized buckets (8 × 8 × 4)
pub const BUCKET_COUNT: usize = 256;

/// A color reduced to the 3:3:2-bit bucket scheme
///
/// Channel ranges after reduction: red and green 0-7, blue 0-3.
///
/// # Example
///
/// ```
/// use pixcube::Quantized;
///
/// let white = Quantized::from_rgb(255, 255, 255);
/// assert_eq!(white, Quantized::new(7, 7, 3));
///
/// let black = Quantized::from_rgb(0, 0, 0);
/// assert_eq!(black, Quantized::new(0, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantized {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Quantized {
    /// Create a bucket from already-reduced channel values
    ///
    /// Channels are masked to their bucket ranges (red and green to
    /// 0-7, blue to 0-3), so every constructed bucket has a valid
    /// [`index`](Self::index).
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r & 0b111,
            g: g & 0b111,
            b: b & 0b11,
        }
    }

    /// Quantize an 8-bit RGB color: red and green keep their top 3 bits,
    /// blue its top 2
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r >> 5,
            g: g >> 5,
            b: b >> 6,
        }
    }

    /// Flat index into a dense 256-entry table
    pub const fn index(self) -> usize {
        ((self.r as usize) << 5) | ((self.g as usize) << 2) | self.b as usize
    }

    /// Inverse of [`index`](Self::index)
    pub const fn from_index(index: usize) -> Self {
        Self {
            r: ((index >> 5) & 0b111) as u8,
            g: ((index >> 2) & 0b111) as u8,
            b: (index & 0b11) as u8,
        }
    }

    /// Channel values as an array, for distance computation
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Redmean-weighted Euclidean distance between two RGB triples
///
/// A cheap approximation of perceptual color difference that weights the
/// red and blue terms by the mean red level instead of converting to LAB
/// space:
///
/// ```text
/// d = sqrt((2 + rmean/256)·ΔR² + 4·ΔG² + (2 + (255 - rmean)/256)·ΔB²)
/// ```
///
/// Identical triples are at distance exactly zero, and the distance is
/// non-negative and symmetric.
pub fn redmean_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let rmean = (a[0] as f64 + b[0] as f64) / 2.0;
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;

    ((2.0 + rmean / 256.0) * dr * dr
        + 4.0 * dg * dg
        + (2.0 + (255.0 - rmean) / 256.0) * db * db)
        .sqrt()
}

/// Find the sample nearest to `target` under the redmean metric
///
/// Linear scan over the sample list. The comparison is strict, so ties
/// keep the first entry encountered; with a fixed sample order the result
/// is fully deterministic. Returns `None` for an empty sample set, which
/// callers surface as a configuration error.
pub fn nearest_sample(target: Quantized, samples: &[(Quantized, BlockRef)]) -> Option<BlockRef> {
    let mut best: Option<(f64, BlockRef)> = None;

    for (color, block) in samples {
        let distance = redmean_distance(target.channels(), color.channels());
        match best {
            Some((min, _)) if distance >= min => {}
            _ => best = Some((distance, *block)),
        }
    }

    best.map(|(_, block)| block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_colors_distance_zero() {
        for index in 0..BUCKET_COUNT {
            let color = Quantized::from_index(index).channels();
            assert_eq!(redmean_distance(color, color), 0.0);
        }
        assert_eq!(redmean_distance([255, 128, 64], [255, 128, 64]), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = [7, 0, 3];
        let b = [0, 7, 1];
        assert_eq!(redmean_distance(a, b), redmean_distance(b, a));
    }

    #[test]
    fn test_quantize_from_rgb() {
        assert_eq!(Quantized::from_rgb(0, 0, 0), Quantized::new(0, 0, 0));
        assert_eq!(Quantized::from_rgb(255, 255, 255), Quantized::new(7, 7, 3));
        // 128 >> 5 = 4, 64 >> 5 = 2, 192 >> 6 = 3
        assert_eq!(Quantized::from_rgb(128, 64, 192), Quantized::new(4, 2, 3));
        // Values below one quantization step collapse to zero
        assert_eq!(Quantized::from_rgb(31, 31, 63), Quantized::new(0, 0, 0));
    }

    #[test]
    fn test_new_masks_out_of_range_channels() {
        // Out-of-range channels wrap into their bucket ranges instead
        // of producing an index past the table
        assert_eq!(Quantized::new(8, 9, 4), Quantized::new(0, 1, 0));
        assert!(Quantized::new(255, 255, 255).index() < BUCKET_COUNT);
        assert_eq!(Quantized::new(255, 255, 255), Quantized::new(7, 7, 3));
    }

    #[test]
    fn test_index_bijective() {
        for index in 0..BUCKET_COUNT {
            assert_eq!(Quantized::from_index(index).index(), index);
        }
    }

    #[test]
    fn test_nearest_empty_set() {
        assert_eq!(nearest_sample(Quantized::new(0, 0, 0), &[]), None);
    }

    #[test]
    fn test_nearest_two_sample_scenario() {
        // Near-black bucket against a black and a white sample: the
        // black sample wins by a wide margin under redmean
        // (≈1.73 vs ≈17.5).
        let samples = vec![
            (Quantized::new(0, 0, 0), BlockRef::new(1, 0)),
            (Quantized::new(7, 7, 3), BlockRef::new(2, 0)),
        ];

        let found = nearest_sample(Quantized::new(0, 0, 1), &samples);
        assert_eq!(found, Some(BlockRef::new(1, 0)));
    }

    #[test]
    fn test_nearest_tie_keeps_first() {
        // (0,0,0) and (0,0,2) are equidistant from (0,0,1); the first
        // entry in scan order must win.
        let samples = vec![
            (Quantized::new(0, 0, 0), BlockRef::new(1, 0)),
            (Quantized::new(0, 0, 2), BlockRef::new(2, 0)),
        ];

        let found = nearest_sample(Quantized::new(0, 0, 1), &samples);
        assert_eq!(found, Some(BlockRef::new(1, 0)));

        // Reversed order flips the winner
        let reversed: Vec<_> = samples.into_iter().rev().collect();
        let found = nearest_sample(Quantized::new(0, 0, 1), &reversed);
        assert_eq!(found, Some(BlockRef::new(2, 0)));
    }

    #[test]
    fn test_nearest_exact_match() {
        let samples = vec![
            (Quantized::new(3, 3, 1), BlockRef::new(5, 0)),
            (Quantized::new(4, 4, 2), BlockRef::new(6, 0)),
        ];

        assert_eq!(
            nearest_sample(Quantized::new(4, 4, 2), &samples),
            Some(BlockRef::new(6, 0))
        );
    }

    #[test]
    fn test_nearest_deterministic() {
        let samples = vec![
            (Quantized::new(1, 2, 1), BlockRef::new(1, 0)),
            (Quantized::new(6, 5, 2), BlockRef::new(2, 0)),
            (Quantized::new(3, 3, 3), BlockRef::new(3, 0)),
        ];

        let first = nearest_sample(Quantized::new(4, 4, 2), &samples);
        for _ in 0..10 {
            assert_eq!(nearest_sample(Quantized::new(4, 4, 2), &samples), first);
        }
    }
}
