use thiserror::Error;

use crate::geometry::{GridDims, MapLocation};
use crate::node::NodeId;

/// Unified result type for the cluster-map crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors surfaced by the layout map.
#[derive(Debug, Error)]
pub enum MapError {
    /// A locator addressed a coordinate outside the declared grid bounds.
    /// Indicates a stale locator held by the caller; never recovered here.
    #[error("location ({location}) outside grid bounds {dims}")]
    LocationOutOfBounds {
        location: MapLocation,
        dims: GridDims,
    },
    #[error("cell at ({0}) is already occupied")]
    CellOccupied(MapLocation),
    #[error("node `{0}` is already placed")]
    DuplicateNode(NodeId),
    #[error("no free cell left in the grid")]
    MapFull,
    #[error("grid dimensions must be non-zero")]
    EmptyGrid,
}
