//! Domain and wire types shared across the crate
//!
//! The block reference and placement command are opaque to the color
//! matching logic; they are parsed from sample file names and carried
//! through to the world server unchanged. The serde structs mirror the
//! world server's JSON API.

use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Pixcube error types
#[derive(Debug, Error)]
pub enum PixcubeError {
    /// No samples survived loading, so nearest-search has nothing to
    /// compare against. Fatal before any render.
    #[error("no color samples loaded, cannot build palette index")]
    EmptyPalette,

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sample file name does not encode `<id>-<variant>`
    #[error("sample name '{0}' does not parse as <id>-<variant>")]
    SampleName(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("request timeout after {0}s")]
    TimeoutError(u64),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("render cancelled")]
    Cancelled,
}

/// Result type alias for pixcube operations
pub type Result<T> = std::result::Result<T, PixcubeError>;

/// A placeable block type: world material id plus sub-variant index
///
/// # Example
///
/// ```
/// use pixcube::BlockRef;
///
/// let wool_red = BlockRef::new(35, 14);
/// assert_eq!(wool_red.id, 35);
/// assert_eq!(wool_red.variant, 14);
/// assert_eq!(BlockRef::AIR, BlockRef::new(0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    /// World material identifier
    pub id: u32,
    /// Sub-variant index within the material (e.g. wool color)
    pub variant: u32,
}

impl BlockRef {
    /// Air. Fully transparent pixels resolve to this instead of a
    /// palette lookup.
    pub const AIR: BlockRef = BlockRef { id: 0, variant: 0 };

    /// Create a new block reference
    pub const fn new(id: u32, variant: u32) -> Self {
        Self { id, variant }
    }
}

/// One unit of render output: a world position and the block to set there
///
/// Produced per pixel and handed straight to the placement sink; the
/// renderer keeps no placement history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCommand {
    /// Absolute world position
    pub pos: IVec3,
    /// Block to place
    pub block: BlockRef,
}

impl PlacementCommand {
    /// Create a new placement command
    pub const fn new(pos: IVec3, block: BlockRef) -> Self {
        Self { pos, block }
    }
}

/// World server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Server state, "ready" when accepting placements
    pub status: String,

    /// Name of the currently loaded world
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world: Option<String>,

    /// Number of connected players
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<u32>,

    /// Error detail when the server is not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerStatus {
    /// Check if the server is ready to accept placements
    pub fn is_ready(&self) -> bool {
        self.status == "ready" || self.status == "ok"
    }
}

/// Player position response, used as the render anchor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionResponse {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl From<PositionResponse> for IVec3 {
    fn from(pos: PositionResponse) -> Self {
        IVec3::new(pos.x, pos.y, pos.z)
    }
}

/// Request body for a set-block call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBlockRequest {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub id: u32,
    pub variant: u32,
}

impl From<PlacementCommand> for SetBlockRequest {
    fn from(command: PlacementCommand) -> Self {
        Self {
            x: command.pos.x,
            y: command.pos.y,
            z: command.pos.z,
            id: command.block.id,
            variant: command.block.variant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_block() {
        assert_eq!(BlockRef::AIR, BlockRef::new(0, 0));
    }

    #[test]
    fn test_set_block_request_from_command() {
        let command = PlacementCommand::new(IVec3::new(10, 64, -5), BlockRef::new(35, 2));
        let request = SetBlockRequest::from(command);

        assert_eq!(request.x, 10);
        assert_eq!(request.y, 64);
        assert_eq!(request.z, -5);
        assert_eq!(request.id, 35);
        assert_eq!(request.variant, 2);
    }

    #[test]
    fn test_server_status_ready() {
        let ready = ServerStatus {
            status: "ready".to_string(),
            world: None,
            players: None,
            error: None,
        };
        assert!(ready.is_ready());

        let loading = ServerStatus {
            status: "loading".to_string(),
            world: None,
            players: None,
            error: Some("world still loading".to_string()),
        };
        assert!(!loading.is_ready());
    }

    #[test]
    fn test_position_response_to_ivec3() {
        let pos = PositionResponse { x: 1, y: 2, z: 3 };
        assert_eq!(IVec3::from(pos), IVec3::new(1, 2, 3));
    }
}
