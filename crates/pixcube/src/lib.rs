//! Pixcube - Raster images to voxel world pixel art
//!
//! This crate converts a raster image into blocks placed in a remote voxel
//! world. Each pixel is matched against a palette built from reference
//! sample images, one image per placeable block type, and resolved to the
//! closest block under a redmean-weighted color distance.
//!
//! # Pipeline
//!
//! ```text
//! Sample images (<id>-<variant>.png)
//!     ↓ SampleSet::load_dir (average color, 3:3:2 quantization)
//! SampleSet
//!     ↓ PaletteIndex::build (dense 256-bucket nearest-sample table)
//! PaletteIndex
//!     ↓ FrameRenderer (row-major traversal, orientation, axis mapping)
//! PlacementCommand stream
//!     ↓ BlockSink (HTTP world server)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pixcube::{Axis, FrameRenderer, Orientation, PaletteIndex, SampleSet, WorldClient};
//! use pixcube::render::DEFAULT_ROW_DELAY;
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build the palette once from the sample folder
//!     let samples = SampleSet::load_dir(Path::new("samples"))?;
//!     let palette = PaletteIndex::build(&samples)?;
//!
//!     // Anchor the render at the player's position
//!     let client = WorldClient::new("http://localhost:4711");
//!     let anchor = client.player_position().await?;
//!
//!     // Stream the image into the world, one row at a time
//!     let frame = image::open("picture.png")?.to_rgba8();
//!     let renderer =
//!         FrameRenderer::new(frame, &palette, Axis::X, anchor, Orientation::default());
//!     let placed = renderer
//!         .paint(&client, DEFAULT_ROW_DELAY, &CancellationToken::new())
//!         .await?;
//!     println!("Placed {} blocks", placed);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod color;
pub mod palette;
pub mod render;
pub mod types;

// Re-export main types for convenience
pub use client::{BlockSink, WorldClient, DEFAULT_SERVER_URL};
pub use color::{nearest_sample, redmean_distance, Quantized, BUCKET_COUNT};
pub use palette::{PaletteIndex, SampleSet};
pub use render::{Axis, FrameRenderer, Orientation};
pub use types::{BlockRef, PixcubeError, PlacementCommand, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{BlockSink, WorldClient};
    pub use crate::color::Quantized;
    pub use crate::palette::{PaletteIndex, SampleSet};
    pub use crate::render::{Axis, FrameRenderer, Orientation};
    pub use crate::types::{BlockRef, PixcubeError, PlacementCommand, Result};
}
