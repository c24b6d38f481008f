use std::collections::VecDeque;

use bit_set::BitSet;
use serde_derive::Serialize;
use tracing::debug;

use crate::cells::{CartesianPoint, CellIndexSmallVec, LabyrinthCell, PolarCoordinate, CENTRE_INDEX};
use crate::errors::*;
use crate::grid_dimensions::PolarGridDimensions;
use crate::units::{RingsCount, SubdivisionFactor};

pub const DEFAULT_BASE_RADIUS: f64 = 500.0;
pub const DEFAULT_RING_SPACING: f64 = 200.0;

/// Builds the cell arena and neighbour adjacency for a polar grid.
///
/// ```
/// use labyrinth::grid::GridBuilder;
/// use labyrinth::units::{RingsCount, SubdivisionFactor};
///
/// let topology = GridBuilder::new(RingsCount(3), SubdivisionFactor(1))
///     .base_radius(500.0)
///     .ring_spacing(200.0)
///     .build()
///     .unwrap();
/// assert_eq!(topology.len(), 7);
/// assert_eq!(topology.cell_index(2, 3), Some(6));
/// ```
#[derive(Debug, Copy, Clone)]
pub struct GridBuilder {
    rings: RingsCount,
    subdivision_factor: SubdivisionFactor,
    base_radius: f64,
    ring_spacing: f64,
}

impl GridBuilder {
    pub fn new(rings: RingsCount, subdivision_factor: SubdivisionFactor) -> GridBuilder {
        GridBuilder {
            rings,
            subdivision_factor,
            base_radius: DEFAULT_BASE_RADIUS,
            ring_spacing: DEFAULT_RING_SPACING,
        }
    }

    pub fn base_radius(mut self, base_radius: f64) -> GridBuilder {
        self.base_radius = base_radius;
        self
    }

    pub fn ring_spacing(mut self, ring_spacing: f64) -> GridBuilder {
        self.ring_spacing = ring_spacing;
        self
    }

    pub fn build(&self) -> Result<Topology> {

        validate_radii(self.base_radius, self.ring_spacing)?;
        let dimensions = PolarGridDimensions::new(self.rings, self.subdivision_factor)?;

        let mut topology = Topology {
            cells: Vec::with_capacity(dimensions.size().0),
            dimensions,
            base_radius: self.base_radius,
            ring_spacing: self.ring_spacing,
        };

        topology.cells.push(LabyrinthCell::new(CENTRE_INDEX,
                                               PolarCoordinate::centre(),
                                               CartesianPoint::origin()));
        for ring in 1..self.rings.0 {
            for sector in 0..topology.subdivisions(ring) {
                let coord = PolarCoordinate::new(ring, sector);
                let index = topology.dimensions.wrapped_index(ring, sector);
                debug_assert_eq!(index, topology.cells.len());
                let location = topology.cell_location(coord);
                topology.cells.push(LabyrinthCell::new(index, coord, location));
            }
        }

        // Second pass, every ring must be indexed before inward/outward neighbours are looked up.
        for index in 0..topology.cells.len() {
            let neighbours = topology.derive_neighbours(topology.cells[index].coordinate());
            topology.cells[index].set_neighbours(neighbours);
        }

        debug!(rings = self.rings.0,
               subdivision_factor = self.subdivision_factor.0,
               cells = topology.len(),
               "built polar grid topology");
        Ok(topology)
    }
}

pub fn validate_radii(base_radius: f64, ring_spacing: f64) -> Result<()> {
    if !(base_radius.is_finite() && base_radius > 0.0) {
        bail!(ErrorKind::InvalidConfiguration(format!("base radius must be positive, got {}", base_radius)));
    }
    if !(ring_spacing.is_finite() && ring_spacing > 0.0) {
        bail!(ErrorKind::InvalidConfiguration(format!("ring spacing must be positive, got {}", ring_spacing)));
    }
    Ok(())
}

/// The ordered cell arena of a polar labyrinth, addressed by cell index.
///
/// Immutable once built apart from the carving flags on each cell.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    cells: Vec<LabyrinthCell>,
    dimensions: PolarGridDimensions,
    base_radius: f64,
    ring_spacing: f64,
}

impl Topology {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[LabyrinthCell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, index: usize) -> Option<&LabyrinthCell> {
        self.cells.get(index)
    }

    #[inline]
    pub fn dimensions(&self) -> &PolarGridDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn rings(&self) -> RingsCount {
        self.dimensions.rings()
    }

    #[inline]
    pub fn base_radius(&self) -> f64 {
        self.base_radius
    }

    #[inline]
    pub fn ring_spacing(&self) -> f64 {
        self.ring_spacing
    }

    #[inline]
    pub fn subdivisions(&self, ring: usize) -> usize {
        self.dimensions.subdivisions(ring)
    }

    /// Index of the cell at `ring`, `sector`. The sector wraps around the ring; None if the ring
    /// is outside of the grid.
    #[inline]
    pub fn cell_index(&self, ring: usize, sector: usize) -> Option<usize> {
        self.dimensions.cell_index(PolarCoordinate::new(ring, sector))
    }

    /// Ring and sector of a cell index, None if the index is outside of the grid.
    #[inline]
    pub fn coordinate(&self, index: usize) -> Option<PolarCoordinate> {
        self.dimensions.coordinate(index)
    }

    pub fn ring_cells(&self, ring: usize) -> &[LabyrinthCell] {
        &self.cells[self.dimensions.ring_range(ring)]
    }

    /// Cells on the outermost ring. For a single ring grid that is the centre cell.
    pub fn perimeter_cells(&self) -> &[LabyrinthCell] {
        match self.dimensions.perimeter_ring() {
            Some(ring) => self.ring_cells(ring),
            None => &[],
        }
    }

    /// The cell flagged as current by a carve in progress, if any.
    pub fn current_cell(&self) -> Option<usize> {
        self.cells.iter().find(|cell| cell.is_current()).map(|cell| cell.index())
    }

    /// Radius through the middle of a ring's cells.
    pub fn mid_radius(&self, ring: usize) -> f64 {
        if ring == 0 {
            return 0.0;
        }
        self.base_radius + (ring - 1) as f64 * self.ring_spacing + self.ring_spacing * 0.5
    }

    /// Angular width of one sector on a ring, in degrees.
    pub fn angle_step(&self, ring: usize) -> f64 {
        360.0 / self.subdivisions(ring) as f64
    }

    /// Angle through the middle of a cell, in degrees.
    pub fn mid_angle(&self, coord: PolarCoordinate) -> f64 {
        (coord.sector as f64 + 0.5) * self.angle_step(coord.ring)
    }

    pub fn cell_location(&self, coord: PolarCoordinate) -> CartesianPoint {
        if coord.is_centre() {
            CartesianPoint::origin()
        } else {
            CartesianPoint::from_polar(self.mid_radius(coord.ring), self.mid_angle(coord))
        }
    }

    /// Can every cell reach every other cell by stepping between neighbours?
    pub fn is_connected(&self) -> bool {
        if self.cells.is_empty() {
            return true;
        }
        let mut seen = BitSet::with_capacity(self.cells.len());
        let mut frontier = VecDeque::new();
        seen.insert(CENTRE_INDEX);
        frontier.push_back(CENTRE_INDEX);

        while let Some(index) = frontier.pop_front() {
            for &neighbour in self.cells[index].neighbours() {
                if seen.insert(neighbour) {
                    frontier.push_back(neighbour);
                }
            }
        }
        seen.len() == self.cells.len()
    }

    /// Pairs `(a, b)` where `a` lists `b` as a neighbour but `b` does not list `a`.
    pub fn asymmetric_neighbours(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .flat_map(|cell| {
                cell.neighbours()
                    .iter()
                    .filter(move |&&n| !self.cells[n].is_neighbour(cell.index()))
                    .map(move |&n| (cell.index(), n))
            })
            .collect()
    }

    pub(crate) fn set_carving_flags(&mut self, index: usize, current: bool, visited: bool) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set_carving_flags(current, visited);
        }
    }

    pub(crate) fn clear_carving_flags(&mut self) {
        for cell in &mut self.cells {
            cell.set_carving_flags(false, false);
        }
    }

    fn derive_neighbours(&self, coord: PolarCoordinate) -> CellIndexSmallVec {
        let mut neighbours = CellIndexSmallVec::new();
        let rings = self.rings().0;

        if coord.is_centre() {
            // Every ring 1 cell borders the centre.
            neighbours.extend(self.dimensions.ring_range(1));
            return neighbours;
        }

        let PolarCoordinate { ring, sector } = coord;
        let sectors = self.subdivisions(ring);
        let mut push_unique = |index: usize| {
            if !neighbours.contains(&index) {
                neighbours.push(index);
            }
        };

        // lateral
        push_unique(self.dimensions.wrapped_index(ring, sector + sectors - 1));
        push_unique(self.dimensions.wrapped_index(ring, sector + 1));

        // inward
        if ring == 1 {
            push_unique(CENTRE_INDEX);
        } else if sectors > self.subdivisions(ring - 1) {
            push_unique(self.dimensions.wrapped_index(ring - 1, sector / 2));
        } else {
            push_unique(self.dimensions.wrapped_index(ring - 1, sector));
        }

        // outward
        if ring + 1 < rings {
            if self.subdivisions(ring + 1) > sectors {
                push_unique(self.dimensions.wrapped_index(ring + 1, sector * 2));
                push_unique(self.dimensions.wrapped_index(ring + 1, sector * 2 + 1));
            } else {
                push_unique(self.dimensions.wrapped_index(ring + 1, sector));
            }
        }

        neighbours
    }
}
