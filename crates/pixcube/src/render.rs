//! Frame rendering: traversal, orientation and axis coordinate mapping
//!
//! A frame is walked row-major (rows top to bottom, columns within each
//! row), every pixel resolved to a block through the palette index, and
//! the resulting placements streamed out one at a time. Orientation
//! transforms compose in a fixed order: flips rewrite the logical image
//! first, mirroring then negates the column index within each row.

use crate::client::BlockSink;
use crate::color::Quantized;
use crate::palette::PaletteIndex;
use crate::types::{BlockRef, PixcubeError, PlacementCommand, Result};
use glam::IVec3;
use image::{imageops, RgbaImage};
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay inserted after each rendered row
///
/// Keeps a slow world server from being flooded; tune it down (or to
/// zero) when the sink handles its own flow control.
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(50);

/// World axis a frame is rendered along
///
/// `X` and `Z` lay the image flat at the anchor's height, differing in
/// which horizontal axis absorbs the columns; `Y` raises it as a wall
/// climbing from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Columns run along +x, rows along -z; flat at anchor height
    X,
    /// Columns run along -x, rows along +z; flat at anchor height
    Z,
    /// Columns run along -x, rows along +y; vertical wall
    Y,
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "z" => Ok(Axis::Z),
            "y" => Ok(Axis::Y),
            other => Err(format!("invalid axis '{}', expected x, z or y", other)),
        }
    }
}

/// Orientation switches applied before coordinate mapping
///
/// Flips reorder pixel access over the whole image; mirroring rebinds
/// the column index within each row, affecting both the pixel sampled
/// and the coordinate emitted. Mirroring twice restores the original
/// column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    pub mirror: bool,
    pub flip_vertical: bool,
    pub flip_horizontal: bool,
}

/// Resolves a frame's pixels to placement commands, row by row
///
/// Transparent pixels (alpha exactly zero) resolve to [`BlockRef::AIR`]
/// without consulting the palette; everything else is quantized and hits
/// the index in O(1). The renderer borrows the palette immutably, so one
/// index can serve any number of renderers.
#[derive(Debug)]
pub struct FrameRenderer<'a> {
    frame: RgbaImage,
    palette: &'a PaletteIndex,
    axis: Axis,
    anchor: IVec3,
    mirror: bool,
}

impl<'a> FrameRenderer<'a> {
    /// Create a renderer, applying the orientation flips up front
    pub fn new(
        frame: RgbaImage,
        palette: &'a PaletteIndex,
        axis: Axis,
        anchor: IVec3,
        orientation: Orientation,
    ) -> Self {
        let mut frame = frame;
        if orientation.flip_vertical {
            frame = imageops::flip_vertical(&frame);
        }
        if orientation.flip_horizontal {
            frame = imageops::flip_horizontal(&frame);
        }

        Self {
            frame,
            palette,
            axis,
            anchor,
            mirror: orientation.mirror,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Map image coordinates to a world position relative to the anchor
    ///
    /// The half-extent offsets floor-divide, centering the image on the
    /// anchor along the mapped axis.
    fn position(&self, col: u32, row: u32) -> IVec3 {
        let col = col as i32;
        let row = row as i32;
        let half_w = self.frame.width() as i32 / 2;
        let half_h = self.frame.height() as i32 / 2;
        let a = self.anchor;

        match self.axis {
            Axis::X => IVec3::new(a.x + col, a.y, a.z + (half_h - row)),
            Axis::Z => IVec3::new(a.x + (half_w - col), a.y, a.z + row),
            Axis::Y => IVec3::new(a.x + (half_w - col), a.y + row, a.z),
        }
    }

    /// Resolve one pixel of the (already flipped) frame
    fn resolve(&self, col: u32, row: u32) -> PlacementCommand {
        let pixel = self.frame.get_pixel(col, row);
        let block = if pixel[3] == 0 {
            BlockRef::AIR
        } else {
            self.palette
                .lookup(Quantized::from_rgb(pixel[0], pixel[1], pixel[2]))
        };

        PlacementCommand::new(self.position(col, row), block)
    }

    /// Commands for one row, in emission order
    fn row(&self, row: u32) -> impl Iterator<Item = PlacementCommand> + '_ {
        let width = self.frame.width();
        (0..width).map(move |col| {
            let col = if self.mirror { width - 1 - col } else { col };
            self.resolve(col, row)
        })
    }

    /// Every placement for the frame, row-major, produced lazily
    pub fn commands(&self) -> impl Iterator<Item = PlacementCommand> + '_ {
        (0..self.frame.height()).flat_map(|row| self.row(row))
    }

    /// Stream the frame into `sink`, pausing after each row
    ///
    /// Placements are emitted strictly in [`commands`](Self::commands)
    /// order. The cancellation token is checked once per row; a
    /// cancelled render returns [`PixcubeError::Cancelled`] without
    /// emitting the remaining rows.
    ///
    /// # Returns
    ///
    /// The number of placements delivered to the sink.
    pub async fn paint<S: BlockSink>(
        &self,
        sink: &S,
        row_delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let mut placed = 0u64;

        for row in 0..self.frame.height() {
            if cancel.is_cancelled() {
                return Err(PixcubeError::Cancelled);
            }

            for command in self.row(row) {
                sink.set_block(command).await?;
                placed += 1;
            }

            tokio::time::sleep(row_delay).await;
        }

        Ok(placed)
    }
}
