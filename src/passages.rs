use std::fmt;
use std::slice;

use petgraph::algo::connected_components;
use petgraph::graph::{self, NodeIndex};
use petgraph::{Graph, Undirected};
use serde_derive::{Deserialize, Serialize};

use crate::cells::CellIndexSmallVec;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PassageLinkError {
    InvalidCellIndex,
    SelfLink,
}

/// A wall removed from the labyrinth.
///
/// This is everything a renderer needs to know to delete one wall instance: either the wall
/// shared by two adjacent cells, or the outer wall of a cell on the perimeter ring.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum Opening {
    Passage(usize, usize),
    Perimeter(usize),
}

impl Opening {
    /// The cell the opening is carved from.
    pub fn cell(&self) -> usize {
        match *self {
            Opening::Passage(from, _) => from,
            Opening::Perimeter(cell) => cell,
        }
    }

    /// The cell on the other side of the wall, None if the opening leads out of the grid.
    pub fn other_cell(&self) -> Option<usize> {
        match *self {
            Opening::Passage(_, to) => Some(to),
            Opening::Perimeter(_) => None,
        }
    }
}

impl fmt::Display for Opening {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Opening::Passage(a, b) => write!(f, "{} <-> {}", a, b),
            Opening::Perimeter(cell) => write!(f, "{} <-> outside", cell),
        }
    }
}

/// The opened connections of a labyrinth: an undirected graph with one node per cell and one edge
/// per removed wall.
#[derive(Clone)]
pub struct Passages {
    graph: Graph<(), (), Undirected, u32>,
}

impl Passages {
    pub fn new(cells_count: usize) -> Passages {
        let mut graph = Graph::with_capacity(cells_count, cells_count.saturating_sub(1));
        for _ in 0..cells_count {
            graph.add_node(());
        }
        Passages { graph }
    }

    #[inline]
    pub fn cells_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Link two cells. Linking an already linked pair does not add a parallel passage.
    pub fn link(&mut self, a: usize, b: usize) -> Result<(), PassageLinkError> {
        if a == b {
            return Err(PassageLinkError::SelfLink);
        }
        match (self.node_index(a), self.node_index(b)) {
            (Some(a_index), Some(b_index)) => {
                self.graph.update_edge(a_index, b_index, ());
                Ok(())
            }
            _ => Err(PassageLinkError::InvalidCellIndex),
        }
    }

    /// Are two cells linked by a passage? The order of the arguments does not matter.
    pub fn is_linked(&self, a: usize, b: usize) -> bool {
        if let (Some(a_index), Some(b_index)) = (self.node_index(a), self.node_index(b)) {
            self.graph.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    /// Cells that are linked to a particular cell by a passage. None for an invalid cell index.
    pub fn links(&self, cell: usize) -> Option<CellIndexSmallVec> {
        self.node_index(cell)
            .map(|node| self.graph.neighbors(node).map(|linked| linked.index()).collect())
    }

    /// Passages in the order they were carved.
    pub fn iter_links(&self) -> LinksIter {
        LinksIter { graph_edge_iter: self.graph.raw_edges().iter() }
    }

    /// Can every cell reach every other cell through passages?
    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) <= 1
    }

    #[inline]
    fn node_index(&self, cell: usize) -> Option<NodeIndex<u32>> {
        if cell < self.graph.node_count() {
            Some(NodeIndex::new(cell))
        } else {
            None
        }
    }
}

impl fmt::Debug for Passages {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Passages :: cells: {}, links: {:?}",
               self.cells_count(), self.iter_links().collect::<Vec<_>>())
    }
}

pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter.next().map(|edge| (edge.source().index(), edge.target().index()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()
