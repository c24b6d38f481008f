use std::ops::Range;

use serde_derive::Serialize;

use crate::cells::{PolarCoordinate, CENTRE_INDEX};
use crate::errors::*;
use crate::units::{EdgesCount, NodesCount, RingsCount, SubdivisionFactor};

/// Largest subdivision factor accepted when building a grid.
pub const MAX_SUBDIVISION_FACTOR: u32 = 24;

/// Upper bound on the number of cells in one labyrinth; the passage graph uses 32 bit indices.
pub const MAX_CELLS: usize = 1 << 24;

#[inline]
pub fn floor_log2(n: usize) -> u32 {
    debug_assert!(n > 0);
    (usize::BITS - 1) - n.leading_zeros()
}

/// Number of sectors on a ring: `2^(floor(log2(ring)) + subdivision_factor)`, and 1 for the centre.
#[inline]
pub fn subdivisions_for(ring: usize, subdivision_factor: SubdivisionFactor) -> usize {
    if ring == 0 {
        1
    } else {
        1usize << (floor_log2(ring) + subdivision_factor.0)
    }
}

/// Total cell count for a grid, or None if it does not fit within `MAX_CELLS`.
pub fn checked_cells_count(rings: RingsCount, subdivision_factor: SubdivisionFactor) -> Option<usize> {
    if subdivision_factor.0 > MAX_SUBDIVISION_FACTOR {
        return None;
    }
    let mut total = 0usize;
    for ring in 0..rings.0 {
        // A single ring of 2^25 sectors is already over the limit, so never shift that far.
        if floor_log2(ring.max(1)) + subdivision_factor.0 > MAX_SUBDIVISION_FACTOR {
            return None;
        }
        total += subdivisions_for(ring, subdivision_factor);
        if total > MAX_CELLS {
            return None;
        }
    }
    Some(total)
}

/// Ring and sector bookkeeping for a polar grid.
///
/// Cells are enumerated breadth first: the centre is 0, then ring 1 in sector order, then ring 2
/// and so on. `ring_offsets[r]` is the index of sector 0 on ring `r`, with one trailing entry
/// holding the total cell count.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PolarGridDimensions {
    rings: RingsCount,
    subdivision_factor: SubdivisionFactor,
    ring_offsets: Vec<usize>,
}

impl PolarGridDimensions {
    pub fn new(rings: RingsCount, subdivision_factor: SubdivisionFactor) -> Result<PolarGridDimensions> {

        if rings.0 < 1 {
            bail!(ErrorKind::InvalidConfiguration(String::from("max rings must be at least 1")));
        }
        if checked_cells_count(rings, subdivision_factor).is_none() {
            bail!(ErrorKind::InvalidConfiguration(format!("{} rings with subdivision factor {} exceeds {} cells",
                                                          rings.0,
                                                          subdivision_factor.0,
                                                          MAX_CELLS)));
        }

        let mut ring_offsets = Vec::with_capacity(rings.0 + 1);
        let mut offset = 0;
        for ring in 0..rings.0 {
            ring_offsets.push(offset);
            offset += subdivisions_for(ring, subdivision_factor);
        }
        ring_offsets.push(offset);

        Ok(PolarGridDimensions {
            rings,
            subdivision_factor,
            ring_offsets,
        })
    }

    #[inline]
    pub fn rings(&self) -> RingsCount {
        self.rings
    }

    #[inline]
    pub fn subdivision_factor(&self) -> SubdivisionFactor {
        self.subdivision_factor
    }

    #[inline]
    pub fn size(&self) -> NodesCount {
        NodesCount(self.ring_offsets.last().cloned().unwrap_or(0))
    }

    /// Node count plus the edge count of a spanning tree over every node.
    pub fn graph_size(&self) -> (NodesCount, EdgesCount) {
        let cells_count = self.size();
        (cells_count, EdgesCount(cells_count.0.saturating_sub(1)))
    }

    #[inline]
    pub fn subdivisions(&self, ring: usize) -> usize {
        subdivisions_for(ring, self.subdivision_factor)
    }

    /// The outermost ring, None for an empty grid.
    #[inline]
    pub fn perimeter_ring(&self) -> Option<usize> {
        self.rings.0.checked_sub(1)
    }

    /// Cell indices making up a ring. Empty for rings outside the grid.
    pub fn ring_range(&self, ring: usize) -> Range<usize> {
        if ring < self.rings.0 {
            self.ring_offsets[ring]..self.ring_offsets[ring + 1]
        } else {
            0..0
        }
    }

    /// Index of the cell at `ring`, `sector` (the sector wraps around the ring).
    /// Returns None if the ring is outside of the grid.
    pub fn cell_index(&self, coord: PolarCoordinate) -> Option<usize> {
        if coord.ring < self.rings.0 {
            Some(self.wrapped_index(coord.ring, coord.sector))
        } else {
            None
        }
    }

    /// Inverse of `cell_index`. Returns None if the index is outside of the grid.
    pub fn coordinate(&self, index: usize) -> Option<PolarCoordinate> {
        if index >= self.size().0 {
            return None;
        }
        if index == CENTRE_INDEX {
            return Some(PolarCoordinate::centre());
        }
        let ring = self.ring_offsets.partition_point(|&offset| offset <= index) - 1;
        Some(PolarCoordinate::new(ring, index - self.ring_offsets[ring]))
    }

    // Caller guarantees `ring` is inside the grid.
    #[inline]
    pub(crate) fn wrapped_index(&self, ring: usize, sector: usize) -> usize {
        self.ring_offsets[ring] + sector % self.subdivisions(ring)
    }
}
