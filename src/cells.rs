use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of the single cell on ring 0.
pub const CENTRE_INDEX: usize = 0;

// Lateral (2) + inward (1) + outward (up to 2). Only the centre cell spills onto the heap, and only
// for large subdivision factors.
pub type CellIndexSmallVec = SmallVec<[usize; 6]>;

/// Position of a cell on the polar grid: the ring (0 is the centre) and the sector within the ring.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PolarCoordinate {
    pub ring: usize,
    pub sector: usize,
}

impl PolarCoordinate {
    pub fn new(ring: usize, sector: usize) -> PolarCoordinate {
        PolarCoordinate { ring, sector }
    }

    #[inline]
    pub fn centre() -> PolarCoordinate {
        PolarCoordinate::new(0, 0)
    }

    #[inline]
    pub fn is_centre(&self) -> bool {
        self.ring == 0
    }
}

impl From<(usize, usize)> for PolarCoordinate {
    fn from(ring_sector_pair: (usize, usize)) -> PolarCoordinate {
        PolarCoordinate::new(ring_sector_pair.0, ring_sector_pair.1)
    }
}

#[derive(PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartesianPoint {
    pub fn new(x: f64, y: f64, z: f64) -> CartesianPoint {
        CartesianPoint { x, y, z }
    }

    #[inline]
    pub fn origin() -> CartesianPoint {
        CartesianPoint::default()
    }

    /// Point on the z = 0 plane at `radius` from the origin, `angle_degrees` anticlockwise from the
    /// positive x axis.
    pub fn from_polar(radius: f64, angle_degrees: f64) -> CartesianPoint {
        let radians = angle_degrees.to_radians();
        CartesianPoint::new(radius * radians.cos(), radius * radians.sin(), 0.0)
    }

    pub fn distance_to(&self, other: &CartesianPoint) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A single cell of the labyrinth arena.
///
/// Everything except the carving flags is fixed when the topology is built. The flags are only
/// written by the carver, through the owning `Topology`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabyrinthCell {
    index: usize,
    coordinate: PolarCoordinate,
    location: CartesianPoint,
    neighbours: CellIndexSmallVec,
    visited: bool,
    current: bool,
}

impl LabyrinthCell {
    pub(crate) fn new(index: usize, coordinate: PolarCoordinate, location: CartesianPoint) -> LabyrinthCell {
        LabyrinthCell {
            index,
            coordinate,
            location,
            neighbours: CellIndexSmallVec::new(),
            visited: false,
            current: false,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn coordinate(&self) -> PolarCoordinate {
        self.coordinate
    }

    #[inline]
    pub fn ring(&self) -> usize {
        self.coordinate.ring
    }

    #[inline]
    pub fn sector(&self) -> usize {
        self.coordinate.sector
    }

    #[inline]
    pub fn location(&self) -> CartesianPoint {
        self.location
    }

    /// Adjacent cell indices in lateral, inward, outward order. Adjacent does not mean linked by a
    /// passage.
    #[inline]
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    #[inline]
    pub fn is_neighbour(&self, index: usize) -> bool {
        self.neighbours.contains(&index)
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        self.current
    }

    pub(crate) fn set_neighbours(&mut self, neighbours: CellIndexSmallVec) {
        self.neighbours = neighbours;
    }

    pub(crate) fn set_carving_flags(&mut self, current: bool, visited: bool) {
        self.current = current;
        self.visited = visited;
    }
}
