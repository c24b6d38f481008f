use fnv::FnvHashMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::cells::CENTRE_INDEX;
use crate::passages::Passages;

/// Breadth first step counts from one cell to every cell reachable through passages.
#[derive(Debug, Clone)]
pub struct Distances {
    start_cell: usize,
    distances: FnvHashMap<usize, u32>,
    max_distance: u32,
}

impl Distances {
    /// None if `start_cell` is not a cell of the passage graph.
    pub fn new(passages: &Passages, start_cell: usize) -> Option<Distances> {

        if start_cell >= passages.cells_count() {
            return None;
        }

        let mut max = 0;
        let mut distances = FnvHashMap::with_capacity_and_hasher(passages.cells_count(), Default::default());
        distances.insert(start_cell, 0);

        // Passages are unweighted so the first time a cell is reached is by a shortest route, and the
        // distances map doubles as the visited set.
        let mut frontier = vec![start_cell];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for &cell in &frontier {
                let distance_to_cell = distances[&cell];
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for &linked in passages.links(cell).unwrap_or_default().iter() {
                    if !distances.contains_key(&linked) {
                        distances.insert(linked, distance_to_cell + 1);
                        new_frontier.push(linked);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_cell,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> usize {
        self.start_cell
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    /// None for cells unreachable from the start.
    #[inline(always)]
    pub fn distance_from_start_to(&self, cell: usize) -> Option<u32> {
        self.distances.get(&cell).cloned()
    }

    /// Every cell at the maximum distance, in ascending index order.
    pub fn furthest_cells(&self) -> SmallVec<[usize; 8]> {
        self.distances
            .iter()
            .filter(|&(_, &distance)| distance == self.max_distance)
            .map(|(&cell, _)| cell)
            .sorted()
            .collect()
    }
}

/// Route from the start of `distances_from_start` to `end_cell`, both ends included.
/// None when the end cell cannot be reached.
pub fn shortest_path(passages: &Passages,
                     distances_from_start: &Distances,
                     end_cell: usize)
                     -> Option<Vec<usize>> {

    let mut current_distance = distances_from_start.distance_from_start_to(end_cell)?;
    let mut path = vec![end_cell];
    let mut current_cell = end_cell;

    while current_cell != distances_from_start.start() {

        let closest_to_start = passages.links(current_cell)?
            .iter()
            .filter_map(|&linked| distances_from_start.distance_from_start_to(linked).map(|d| (linked, d)))
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer_cell, closer_distance)) if closer_distance < current_distance => {
                current_cell = closer_cell;
                current_distance = closer_distance;
                path.push(current_cell);
            }
            // No linked cell is any closer, the distances belong to another passage graph.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// The longest route through a perfect labyrinth: the furthest cell from the centre is one end of
/// it, and the furthest cell from that end is the other. With loops or disconnected regions this is
/// only a long path, not necessarily the longest.
pub fn longest_path(passages: &Passages) -> Option<Vec<usize>> {
    let from_centre = Distances::new(passages, CENTRE_INDEX)?;
    let path_start = *from_centre.furthest_cells().first()?;

    let from_path_start = Distances::new(passages, path_start)?;
    let path_end = *from_path_start.furthest_cells().first()?;

    shortest_path(passages, &from_path_start, path_end)
}
