//! Sample loading and the dense palette index
//!
//! Each reference image stands for one placeable block: its pixels are
//! averaged to a single color, quantized, and keyed by the block
//! reference encoded in the file name (`<id>-<variant>.png`, e.g.
//! `35-2.png`). The full 256-bucket index is then precomputed once so
//! that rendering resolves every pixel with a single table read.

use crate::color::{nearest_sample, Quantized, BUCKET_COUNT};
use crate::types::{BlockRef, PixcubeError, Result};
use image::RgbImage;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Quantized average colors of the loaded sample images, in load order
///
/// At most one entry exists per quantized bucket. A later sample landing
/// in an occupied bucket replaces the earlier block reference in place,
/// so the bucket keeps its original position in the scan order and
/// nearest-search tie-breaking stays stable across reloads.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    entries: Vec<(Quantized, BlockRef)>,
}

impl SampleSet {
    /// Create an empty sample set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every readable sample file in a directory, in listing order
    ///
    /// Files that cannot be decoded or whose names do not parse are
    /// logged and skipped; loading continues with the remaining files.
    /// Only a directory-level read failure is an error. An empty result
    /// is not an error here — [`PaletteIndex::build`] rejects it before
    /// any render can start.
    pub fn load_dir(path: &Path) -> Result<Self> {
        let dir = fs::read_dir(path).map_err(|source| PixcubeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut set = SampleSet::new();
        for entry in dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(dir = %path.display(), %error, "skipping unreadable directory entry");
                    continue;
                }
            };

            let file = entry.path();
            if !file.is_file() {
                continue;
            }

            if let Err(error) = set.load_file(&file) {
                warn!(path = %file.display(), %error, "skipping sample");
            }
        }

        Ok(set)
    }

    /// Load a single sample image and insert its quantized average color
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let block = parse_block_ref(path)?;
        let image = image::open(path)
            .map_err(|source| PixcubeError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let [r, g, b] = average_rgb(&image);
        self.insert(Quantized::from_rgb(r, g, b), block);
        Ok(())
    }

    /// Insert an entry, replacing the value in place when the bucket is
    /// already taken (last write wins, position preserved)
    pub fn insert(&mut self, color: Quantized, block: BlockRef) {
        if let Some(entry) = self.entries.iter_mut().find(|(taken, _)| *taken == color) {
            entry.1 = block;
        } else {
            self.entries.push((color, block));
        }
    }

    /// Loaded entries in scan order
    pub fn entries(&self) -> &[(Quantized, BlockRef)] {
        &self.entries
    }

    /// Number of distinct buckets loaded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no samples were loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Average color of an image, integer-truncated per channel
///
/// The denominator starts at one, so a zero-pixel image degenerates to
/// black instead of faulting; every average is therefore taken over
/// `pixel_count + 1`. Existing sample palettes were quantized with this
/// exact truncation, so the denominator must not change.
fn average_rgb(image: &RgbImage) -> [u8; 3] {
    let mut sum = [0u64; 3];
    let mut count = 1u64;

    for pixel in image.pixels() {
        sum[0] += pixel[0] as u64;
        sum[1] += pixel[1] as u64;
        sum[2] += pixel[2] as u64;
        count += 1;
    }

    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

/// Parse `<id>-<variant>` from a sample file stem
fn parse_block_ref(path: &Path) -> Result<BlockRef> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| PixcubeError::SampleName(path.display().to_string()))?;

    let (id, variant) = stem
        .split_once('-')
        .ok_or_else(|| PixcubeError::SampleName(stem.to_string()))?;

    let id = id
        .parse()
        .map_err(|_| PixcubeError::SampleName(stem.to_string()))?;
    let variant = variant
        .parse()
        .map_err(|_| PixcubeError::SampleName(stem.to_string()))?;

    Ok(BlockRef::new(id, variant))
}

/// Dense mapping from every quantized bucket to the nearest sample's block
///
/// Built once by resolving each of the 256 buckets against the sample
/// set, trading a fixed O(256 × samples) construction cost for O(1)
/// lookups while rendering — a single image can be tens of thousands of
/// pixels. Immutable after construction and freely shareable across any
/// number of renders.
#[derive(Debug, Clone)]
pub struct PaletteIndex {
    table: Vec<BlockRef>,
}

impl PaletteIndex {
    /// Resolve every bucket against the sample set
    ///
    /// # Errors
    ///
    /// Returns [`PixcubeError::EmptyPalette`] when the sample set is
    /// empty — there is nothing to match against, and rendering must not
    /// start.
    pub fn build(samples: &SampleSet) -> Result<Self> {
        if samples.is_empty() {
            return Err(PixcubeError::EmptyPalette);
        }

        let mut table = Vec::with_capacity(BUCKET_COUNT);
        for index in 0..BUCKET_COUNT {
            let bucket = Quantized::from_index(index);
            let block =
                nearest_sample(bucket, samples.entries()).ok_or(PixcubeError::EmptyPalette)?;
            table.push(block);
        }

        Ok(Self { table })
    }

    /// Block for a quantized bucket, O(1)
    pub fn lookup(&self, color: Quantized) -> BlockRef {
        self.table[color.index()]
    }

    /// Number of buckets in the index, always [`BUCKET_COUNT`]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// The index is never empty once built
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_denominator_off_by_one() {
        // A single pixel of 255 averages to 255 / 2 = 127
        let mut image = RgbImage::new(1, 1);
        image.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        assert_eq!(average_rgb(&image), [127, 127, 127]);
    }

    #[test]
    fn test_average_empty_image() {
        // Zero pixels must not fault; the floor denominator yields black
        let image = RgbImage::new(0, 0);
        assert_eq!(average_rgb(&image), [0, 0, 0]);
    }

    #[test]
    fn test_average_larger_image() {
        // 4x4 of 255: 4080 / 17 = 240, which still quantizes to the
        // white bucket
        let image = RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
        let [r, g, b] = average_rgb(&image);
        assert_eq!([r, g, b], [240, 240, 240]);
        assert_eq!(Quantized::from_rgb(r, g, b), Quantized::new(7, 7, 3));
    }

    #[test]
    fn test_parse_block_ref() {
        assert_eq!(
            parse_block_ref(Path::new("samples/35-2.png")).unwrap(),
            BlockRef::new(35, 2)
        );
        assert_eq!(
            parse_block_ref(Path::new("1-0.png")).unwrap(),
            BlockRef::new(1, 0)
        );

        assert!(parse_block_ref(Path::new("stone.png")).is_err());
        assert!(parse_block_ref(Path::new("a-b.png")).is_err());
        assert!(parse_block_ref(Path::new("12.png")).is_err());
    }

    #[test]
    fn test_insert_last_write_wins_in_place() {
        let mut set = SampleSet::new();
        set.insert(Quantized::new(0, 0, 0), BlockRef::new(1, 0));
        set.insert(Quantized::new(7, 7, 3), BlockRef::new(2, 0));
        set.insert(Quantized::new(0, 0, 0), BlockRef::new(9, 9));

        assert_eq!(set.len(), 2);
        // The colliding bucket keeps its original scan position
        assert_eq!(
            set.entries()[0],
            (Quantized::new(0, 0, 0), BlockRef::new(9, 9))
        );
        assert_eq!(
            set.entries()[1],
            (Quantized::new(7, 7, 3), BlockRef::new(2, 0))
        );
    }

    #[test]
    fn test_build_empty_set_fails() {
        let set = SampleSet::new();
        assert!(matches!(
            PaletteIndex::build(&set),
            Err(PixcubeError::EmptyPalette)
        ));
    }

    #[test]
    fn test_index_covers_all_buckets() {
        let mut set = SampleSet::new();
        set.insert(Quantized::new(0, 0, 0), BlockRef::new(1, 0));
        set.insert(Quantized::new(7, 7, 3), BlockRef::new(2, 0));

        let index = PaletteIndex::build(&set).unwrap();
        assert_eq!(index.len(), BUCKET_COUNT);

        // Every bucket resolves to one of the loaded blocks
        for bucket in 0..BUCKET_COUNT {
            let block = index.lookup(Quantized::from_index(bucket));
            assert!(block == BlockRef::new(1, 0) || block == BlockRef::new(2, 0));
        }
    }

    #[test]
    fn test_lookup_with_out_of_range_channels() {
        let mut set = SampleSet::new();
        set.insert(Quantized::new(0, 0, 0), BlockRef::new(1, 0));
        let index = PaletteIndex::build(&set).unwrap();

        // Constructor masking keeps any channel values inside the table
        assert_eq!(index.lookup(Quantized::new(8, 9, 4)), BlockRef::new(1, 0));
        assert_eq!(
            index.lookup(Quantized::new(255, 255, 255)),
            BlockRef::new(1, 0)
        );
    }

    #[test]
    fn test_sample_is_own_nearest_neighbor() {
        let mut set = SampleSet::new();
        set.insert(Quantized::new(1, 2, 1), BlockRef::new(10, 0));
        set.insert(Quantized::new(5, 5, 2), BlockRef::new(11, 0));
        set.insert(Quantized::new(7, 0, 3), BlockRef::new(12, 1));

        let index = PaletteIndex::build(&set).unwrap();
        for (color, block) in set.entries() {
            assert_eq!(index.lookup(*color), *block);
        }
    }

    #[test]
    fn test_single_sample_fills_index() {
        let mut set = SampleSet::new();
        set.insert(Quantized::new(3, 3, 1), BlockRef::new(4, 0));

        let index = PaletteIndex::build(&set).unwrap();
        for bucket in 0..BUCKET_COUNT {
            assert_eq!(
                index.lookup(Quantized::from_index(bucket)),
                BlockRef::new(4, 0)
            );
        }
    }
}
