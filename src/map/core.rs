use std::collections::HashMap;
use std::sync::Arc;

use blake3::Hash;

use crate::error::{MapError, Result};
use crate::geometry::{GridDims, MapLocation};
use crate::map::compact::{self, CompactionPolicy};
use crate::node::{Cell, ClusterNode, NodeId};

/// Addresses a cell either by grid coordinate or by node identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Location(MapLocation),
    Identity(NodeId),
}

impl Locator {
    pub fn identity(id: impl Into<NodeId>) -> Self {
        Self::Identity(id.into())
    }
}

impl From<MapLocation> for Locator {
    fn from(location: MapLocation) -> Self {
        Self::Location(location)
    }
}

/// Outcome of a lookup: the occupant, or the empty-cell indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Empty,
    Occupied(ClusterNode),
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        matches!(self, Extracted::Empty)
    }

    pub fn node(&self) -> Option<&ClusterNode> {
        match self {
            Extracted::Empty => None,
            Extracted::Occupied(node) => Some(node),
        }
    }

    pub fn into_node(self) -> Option<ClusterNode> {
        match self {
            Extracted::Empty => None,
            Extracted::Occupied(node) => Some(node),
        }
    }
}

/// Location-indexed layout map: an ordered collection of rows of cells,
/// plus an identity index so nodes can be addressed without a coordinate.
///
/// Every mutation produces a new map value; rows are shared behind `Arc`
/// so only the affected row is rewritten. Callers holding the prior value
/// keep a consistent snapshot.
#[derive(Debug, Clone)]
pub struct ClusterTableMap {
    dims: GridDims,
    compaction: CompactionPolicy,
    rows: Vec<Arc<Vec<Cell>>>,
    index: HashMap<NodeId, MapLocation>,
    fingerprint: Hash,
}

impl ClusterTableMap {
    pub fn builder(dims: GridDims) -> Result<MapBuilder> {
        MapBuilder::new(dims)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn compaction(&self) -> CompactionPolicy {
        self.compaction
    }

    /// Digest over the cell grid. Equal fingerprints mean equal grids,
    /// which makes no-op mutations cheap to detect.
    pub fn fingerprint(&self) -> Hash {
        self.fingerprint
    }

    /// Rows in declaration order, the rendering contract for row components.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|row| row.as_slice())
    }

    pub fn row(&self, row: u16) -> Option<&[Cell]> {
        self.rows.get(row as usize).map(|cells| cells.as_slice())
    }

    pub fn cell(&self, location: MapLocation) -> Result<&Cell> {
        if !self.dims.contains(location) {
            return Err(MapError::LocationOutOfBounds {
                location,
                dims: self.dims,
            });
        }
        Ok(&self.rows[location.row as usize][location.col as usize])
    }

    /// Current coordinate of a node, if it is still placed.
    pub fn location_of(&self, id: &str) -> Option<MapLocation> {
        self.index.get(id).copied()
    }

    /// Occupied cells with their coordinates, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (MapLocation, &ClusterNode)> {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.node()
                    .map(|node| (MapLocation::new(row as u16, col as u16), node))
            })
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.index.len()
    }

    /// Read-only lookup. An unoccupied slot or an identity no longer in
    /// the map yields `Extracted::Empty`; a coordinate outside the grid
    /// bounds is a caller error.
    pub fn extract_node(&self, locator: &Locator) -> Result<Extracted> {
        let Some(location) = self.resolve(locator)? else {
            return Ok(Extracted::Empty);
        };
        let cell = &self.rows[location.row as usize][location.col as usize];
        Ok(match cell {
            Cell::Empty => Extracted::Empty,
            Cell::Occupied(node) => Extracted::Occupied(node.clone()),
        })
    }

    /// Remove the addressed node, returning it together with the next map
    /// state. The slot is emptied or the row compacted per the map's
    /// compaction policy; the identity index follows any relocation.
    ///
    /// Removing an already-empty slot is a no-op, not an error: the call
    /// returns `Extracted::Empty` and a map with the same cell grid, so
    /// duplicate UI events stay safe.
    pub fn extract_and_remove_node(&self, locator: &Locator) -> Result<(Extracted, Self)> {
        let Some(location) = self.resolve(locator)? else {
            return Ok((Extracted::Empty, self.clone()));
        };
        let row = &self.rows[location.row as usize];
        let Cell::Occupied(node) = row[location.col as usize].clone() else {
            return Ok((Extracted::Empty, self.clone()));
        };

        let mut index = self.index.clone();
        index.remove(node.id());

        let mut rows = self.rows.clone();
        rows[location.row as usize] =
            Arc::new(compact::remove_from_row(row, location, self.compaction, &mut index));

        let fingerprint = fingerprint_cells(self.dims, &rows);
        let next = Self {
            dims: self.dims,
            compaction: self.compaction,
            rows,
            index,
            fingerprint,
        };
        Ok((Extracted::Occupied(node), next))
    }

    fn resolve(&self, locator: &Locator) -> Result<Option<MapLocation>> {
        match locator {
            Locator::Location(location) => {
                if !self.dims.contains(*location) {
                    return Err(MapError::LocationOutOfBounds {
                        location: *location,
                        dims: self.dims,
                    });
                }
                Ok(Some(*location))
            }
            Locator::Identity(id) => Ok(self.index.get(id).copied()),
        }
    }
}

/// Construction path for the initial node collection. Placement is
/// validated fail-fast: bounds, overlap, and identity uniqueness.
#[derive(Debug)]
pub struct MapBuilder {
    dims: GridDims,
    compaction: CompactionPolicy,
    rows: Vec<Vec<Cell>>,
    index: HashMap<NodeId, MapLocation>,
}

impl MapBuilder {
    pub fn new(dims: GridDims) -> Result<Self> {
        if dims.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        Ok(Self {
            dims,
            compaction: CompactionPolicy::default(),
            rows: vec![vec![Cell::Empty; dims.cols as usize]; dims.rows as usize],
            index: HashMap::new(),
        })
    }

    pub fn compaction(&mut self, policy: CompactionPolicy) -> &mut Self {
        self.compaction = policy;
        self
    }

    /// Place a node at a pre-assigned coordinate.
    pub fn place(&mut self, node: ClusterNode, location: MapLocation) -> Result<&mut Self> {
        if !self.dims.contains(location) {
            return Err(MapError::LocationOutOfBounds {
                location,
                dims: self.dims,
            });
        }
        if self.index.contains_key(node.id()) {
            return Err(MapError::DuplicateNode(node.id().clone()));
        }
        let cell = &mut self.rows[location.row as usize][location.col as usize];
        if !cell.is_empty() {
            return Err(MapError::CellOccupied(location));
        }
        self.index.insert(node.id().clone(), location);
        *cell = Cell::Occupied(node);
        Ok(self)
    }

    /// Place a node without a pre-assigned location into the first free
    /// slot, scanning row-major.
    pub fn place_next(&mut self, node: ClusterNode) -> Result<&mut Self> {
        let free = self
            .rows
            .iter()
            .enumerate()
            .find_map(|(row, cells)| {
                cells
                    .iter()
                    .position(Cell::is_empty)
                    .map(|col| MapLocation::new(row as u16, col as u16))
            })
            .ok_or(MapError::MapFull)?;
        self.place(node, free)
    }

    pub fn build(self) -> ClusterTableMap {
        let rows: Vec<Arc<Vec<Cell>>> = self.rows.into_iter().map(Arc::new).collect();
        let fingerprint = fingerprint_cells(self.dims, &rows);
        ClusterTableMap {
            dims: self.dims,
            compaction: self.compaction,
            rows,
            index: self.index,
            fingerprint,
        }
    }
}

fn fingerprint_cells(dims: GridDims, rows: &[Arc<Vec<Cell>>]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&dims.rows.to_le_bytes());
    hasher.update(&dims.cols.to_le_bytes());
    for row in rows {
        for cell in row.iter() {
            match cell {
                Cell::Empty => {
                    hasher.update(&[0]);
                }
                Cell::Occupied(node) => {
                    hasher.update(&[1]);
                    hasher.update(node.kind().as_str().as_bytes());
                    hasher.update(&[0]);
                    hasher.update(node.id().as_bytes());
                    hasher.update(&[0]);
                }
            }
        }
    }
    hasher.finalize()
}
