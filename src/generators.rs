use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::cells::CENTRE_INDEX;
use crate::errors::*;
use crate::grid::Topology;
use crate::grid_dimensions::subdivisions_for;
use crate::passages::{Opening, Passages};
use crate::units::{RingsCount, SubdivisionFactor};

/// Where the carve starts.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum EntrancePolicy {
    /// Start on the centre cell.
    Centre,
    /// Start on a random perimeter cell whose outer wall is opened before carving.
    Perimeter,
}

/// Where the single exit of the labyrinth is opened once carving is finished.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum ExitPolicy {
    /// Into the centre from the ring 1 cell reached deepest in the carve.
    Centre,
    /// Out of the grid from the perimeter cell reached deepest in the carve.
    Farest,
    /// Out of the grid from a freshly chosen random perimeter cell.
    RandomPerimeter,
}

impl FromStr for EntrancePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<EntrancePolicy> {
        match s.to_ascii_lowercase().as_str() {
            "centre" | "center" => Ok(EntrancePolicy::Centre),
            "perimeter" => Ok(EntrancePolicy::Perimeter),
            _ => bail!(ErrorKind::UnknownPolicy(s.to_owned())),
        }
    }
}

impl fmt::Display for EntrancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EntrancePolicy::Centre => write!(f, "center"),
            EntrancePolicy::Perimeter => write!(f, "perimeter"),
        }
    }
}

impl FromStr for ExitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<ExitPolicy> {
        match s.to_ascii_lowercase().as_str() {
            "centre" | "center" => Ok(ExitPolicy::Centre),
            "farest" | "farthest" | "furthest" => Ok(ExitPolicy::Farest),
            "random-perimeter" | "random_perimeter" | "randomperimeter" => Ok(ExitPolicy::RandomPerimeter),
            _ => bail!(ErrorKind::UnknownPolicy(s.to_owned())),
        }
    }
}

impl fmt::Display for ExitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExitPolicy::Centre => write!(f, "center"),
            ExitPolicy::Farest => write!(f, "farest"),
            ExitPolicy::RandomPerimeter => write!(f, "random-perimeter"),
        }
    }
}

/// Checks that the exit policy can open a wall other than the entrance and the carved passages.
///
/// Fails with `InvalidConfiguration` when the grid only leaves one wall for both: a perimeter
/// entrance and perimeter exit on a single cell perimeter ring, a perimeter entrance on a one ring
/// grid, or a centre entrance and centre exit with a single ring 1 cell.
pub fn check_openings(rings: RingsCount,
                      subdivision_factor: SubdivisionFactor,
                      entrance: EntrancePolicy,
                      exit: ExitPolicy)
                      -> Result<()> {

    let perimeter_cells = match rings.0.checked_sub(1) {
        Some(perimeter_ring) => subdivisions_for(perimeter_ring, subdivision_factor),
        None => return Ok(()),
    };

    let single_opening = match (entrance, exit) {
        (EntrancePolicy::Perimeter, ExitPolicy::Farest) |
        (EntrancePolicy::Perimeter, ExitPolicy::RandomPerimeter) => perimeter_cells < 2,
        (EntrancePolicy::Perimeter, ExitPolicy::Centre) => rings.0 < 2,
        (EntrancePolicy::Centre, ExitPolicy::Centre) => {
            rings.0 >= 2 && subdivisions_for(1, subdivision_factor) < 2
        }
        (EntrancePolicy::Centre, _) => false,
    };

    if single_opening {
        bail!(ErrorKind::InvalidConfiguration(format!("{} entrance and {} exit would share one wall with {} rings and \
                                                       subdivision factor {}",
                                                      entrance,
                                                      exit,
                                                      rings.0,
                                                      subdivision_factor.0)));
    }
    Ok(())
}

/// What a single call to `MazeCarver::step` did.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CarveStep {
    /// A passage was opened between `from` and `to`, after backtracking over `backtracked`
    /// dead ends.
    Carved { from: usize, to: usize, backtracked: usize },
    /// Every reachable cell is visited and the exit is open.
    Finished { exit: Opening },
}

/// The mutable part of one carving run. Refers to cells only by index.
#[derive(Debug, Clone)]
pub struct CarvingState {
    entrance_cell: usize,
    current_cell: usize,
    next_cell: Option<usize>,
    path_stack: Vec<usize>,
    longest_path_length: usize,
    longest_path_cell: Option<usize>,
    finished: bool,
    passages: Passages,
    entrance: Option<Opening>,
    exit: Option<Opening>,
    steps: usize,
}

impl CarvingState {
    fn new(cells_count: usize) -> CarvingState {
        CarvingState {
            entrance_cell: CENTRE_INDEX,
            current_cell: CENTRE_INDEX,
            next_cell: None,
            path_stack: Vec::new(),
            longest_path_length: 0,
            longest_path_cell: None,
            finished: false,
            passages: Passages::new(cells_count),
            entrance: None,
            exit: None,
            steps: 0,
        }
    }

    /// The cell carving started from.
    #[inline]
    pub fn entrance_cell(&self) -> usize {
        self.entrance_cell
    }

    #[inline]
    pub fn current_cell(&self) -> usize {
        self.current_cell
    }

    /// The most recently carved into cell.
    #[inline]
    pub fn next_cell(&self) -> Option<usize> {
        self.next_cell
    }

    /// Visited cells that may still have unvisited neighbours, oldest first.
    #[inline]
    pub fn path_stack(&self) -> &[usize] {
        &self.path_stack
    }

    #[inline]
    pub fn longest_path_length(&self) -> usize {
        self.longest_path_length
    }

    #[inline]
    pub fn longest_path_cell(&self) -> Option<usize> {
        self.longest_path_cell
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Passages opened by the carve so far, excluding the entrance and exit openings.
    #[inline]
    pub fn passages(&self) -> &Passages {
        &self.passages
    }

    /// The perimeter wall opened before carving, for the `Perimeter` entrance policy.
    #[inline]
    pub fn entrance(&self) -> Option<Opening> {
        self.entrance
    }

    /// The exit opening, set once the carve is finished.
    #[inline]
    pub fn exit(&self) -> Option<Opening> {
        self.exit
    }

    #[inline]
    pub fn exit_cell(&self) -> Option<usize> {
        self.exit.map(|opening| opening.cell())
    }

    /// Number of `step` calls that changed the state.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// Randomized depth-first (recursive backtracking) carving over a polar grid topology.
///
/// Starting from the entrance the carver repeatedly moves to a random unvisited neighbour of the
/// current cell, opening the wall between them and remembering where it came from. At a dead end
/// it backtracks along the remembered path until it finds a cell with unvisited neighbours. Once
/// the path is exhausted every cell reachable from the entrance has been visited and the passages
/// form a spanning tree; the exit is then opened according to the exit policy.
///
/// The carver can be stepped one passage at a time by an external driver (e.g. an animation tick)
/// or run to completion. All randomness comes from the injected generator, so a seeded generator
/// gives a reproducible labyrinth.
///
/// A centre exit with a perimeter entrance keeps the centre out of the carve, so the exit passage is
/// its only opening.
pub struct MazeCarver<R: Rng> {
    topology: Topology,
    entrance_policy: EntrancePolicy,
    exit_policy: ExitPolicy,
    rng: R,
    state: CarvingState,
}

impl<R: Rng> MazeCarver<R> {
    pub fn new(topology: Topology,
               entrance_policy: EntrancePolicy,
               exit_policy: ExitPolicy,
               rng: R)
               -> Result<MazeCarver<R>> {

        if topology.is_empty() {
            bail!(ErrorKind::EmptyTopology);
        }
        check_openings(topology.rings(),
                       topology.dimensions().subdivision_factor(),
                       entrance_policy,
                       exit_policy)?;

        let cells_count = topology.len();
        let mut carver = MazeCarver {
            topology,
            entrance_policy,
            exit_policy,
            rng,
            state: CarvingState::new(cells_count),
        };
        carver.topology.clear_carving_flags();
        carver.seed_entrance();
        Ok(carver)
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn state(&self) -> &CarvingState {
        &self.state
    }

    #[inline]
    pub fn entrance_policy(&self) -> EntrancePolicy {
        self.entrance_policy
    }

    #[inline]
    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit_policy
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn into_parts(self) -> (Topology, CarvingState) {
        (self.topology, self.state)
    }

    /// Discard the current run and start a fresh one from the entrance policy.
    /// The random generator carries on from where it was, so the next labyrinth differs.
    pub fn reset(&mut self) {
        self.topology.clear_carving_flags();
        self.state = CarvingState::new(self.topology.len());
        self.seed_entrance();
    }

    /// Carve one passage, backtracking over as many dead ends as needed to find it, or finish the
    /// labyrinth by opening its exit. Stepping a finished carve changes nothing.
    pub fn step(&mut self) -> CarveStep {

        if let Some(exit) = self.state.exit {
            return CarveStep::Finished { exit };
        }

        let mut backtracked = 0;
        loop {
            let current = self.state.current_cell;

            if let Some(next) = self.random_unvisited_neighbour(current) {
                if let Err(link_error) = self.state.passages.link(current, next) {
                    warn!(from = current, to = next, error = ?link_error, "passage not linked");
                }

                self.topology.set_carving_flags(current, false, true);
                self.topology.set_carving_flags(next, true, true);
                self.state.path_stack.push(current);
                self.state.next_cell = Some(next);
                self.state.current_cell = next;
                self.record_longest_path(current, next);
                self.state.steps += 1;

                trace!(from = current, to = next, backtracked, depth = self.state.path_stack.len(), "carved");
                return CarveStep::Carved { from: current, to: next, backtracked };
            }

            // Dead end.
            self.topology.set_carving_flags(current, false, true);
            match self.state.path_stack.pop() {
                Some(previous) => {
                    self.topology.set_carving_flags(previous, true, true);
                    self.state.current_cell = previous;
                    backtracked += 1;
                    trace!(from = current, to = previous, "backtracked");
                }
                None => {
                    let exit = self.open_exit();
                    self.state.steps += 1;
                    debug!(passages = self.state.passages.links_count(),
                           exit = %exit,
                           longest_path = self.state.longest_path_length,
                           "carve finished");
                    return CarveStep::Finished { exit };
                }
            }
        }
    }

    /// Step until the carve is finished.
    pub fn run_to_completion(&mut self) -> &CarvingState {
        while !self.state.finished {
            self.step();
        }
        &self.state
    }

    fn seed_entrance(&mut self) {
        let start = match self.entrance_policy {
            EntrancePolicy::Centre => CENTRE_INDEX,
            EntrancePolicy::Perimeter => self.random_perimeter_cell(),
        };

        self.topology.set_carving_flags(start, true, true);
        if self.exit_policy == ExitPolicy::Centre && start != CENTRE_INDEX {
            // Reserved for the exit passage.
            self.topology.set_carving_flags(CENTRE_INDEX, false, true);
        }
        self.state.entrance_cell = start;
        self.state.current_cell = start;
        if self.entrance_policy == EntrancePolicy::Perimeter {
            self.state.entrance = Some(Opening::Perimeter(start));
        }
        debug!(entrance = start, policy = %self.entrance_policy, "carve seeded");
    }

    fn random_perimeter_cell(&mut self) -> usize {
        let perimeter = self.topology.perimeter_cells();
        // The topology is never empty, so neither is its perimeter.
        perimeter[self.rng.gen_range(0..perimeter.len())].index()
    }

    // Only called with at least two perimeter cells, see `check_openings`.
    fn random_perimeter_cell_except(&mut self, excluded: usize) -> usize {
        let perimeter = self.topology.perimeter_cells();
        let candidates: SmallVec<[usize; 8]> = perimeter.iter()
            .map(|cell| cell.index())
            .filter(|&index| index != excluded)
            .collect();
        if candidates.is_empty() {
            return excluded;
        }
        candidates[self.rng.gen_range(0..candidates.len())]
    }

    fn random_unvisited_neighbour(&mut self, index: usize) -> Option<usize> {
        let unvisited: SmallVec<[usize; 8]> = match self.topology.cell(index) {
            Some(cell) => cell.neighbours()
                .iter()
                .cloned()
                .filter(|&n| self.topology.cell(n).map_or(false, |neighbour| !neighbour.is_visited()))
                .collect(),
            None => return None,
        };

        if unvisited.is_empty() {
            None
        } else {
            Some(unvisited[self.rng.gen_range(0..unvisited.len())])
        }
    }

    // The carve depth is only compared when a passage lands on the target ring, so the chosen cell
    // is the deepest one carved into on that ring, not the furthest by walking distance. Ring 1 cells
    // carved straight from the centre are already linked to it and never become the centre exit.
    fn record_longest_path(&mut self, from: usize, carved: usize) {
        let target_ring = match self.exit_policy {
            ExitPolicy::Centre if from == CENTRE_INDEX => return,
            ExitPolicy::Centre => 1,
            ExitPolicy::Farest => match self.topology.dimensions().perimeter_ring() {
                Some(ring) => ring,
                None => return,
            },
            ExitPolicy::RandomPerimeter => return,
        };

        let on_target_ring = self.topology.cell(carved).map_or(false, |cell| cell.ring() == target_ring);
        if on_target_ring && self.state.path_stack.len() > self.state.longest_path_length {
            self.state.longest_path_length = self.state.path_stack.len();
            self.state.longest_path_cell = Some(carved);
        }
    }

    fn open_exit(&mut self) -> Opening {
        // Without a carved candidate the entrance cell stands in. `check_openings` leaves two cases:
        // a one ring grid entered at the centre, and a perimeter entrance on ring 1 with a centre
        // exit. Neither has an entrance opening on that wall already.
        let deepest = self.state.longest_path_cell.unwrap_or(self.state.entrance_cell);

        let exit = match self.exit_policy {
            ExitPolicy::Centre if deepest != CENTRE_INDEX => Opening::Passage(deepest, CENTRE_INDEX),
            // The centre of a single ring grid is also its perimeter.
            ExitPolicy::Centre => Opening::Perimeter(CENTRE_INDEX),
            ExitPolicy::Farest => Opening::Perimeter(deepest),
            ExitPolicy::RandomPerimeter => match self.state.entrance {
                Some(Opening::Perimeter(entrance)) => Opening::Perimeter(self.random_perimeter_cell_except(entrance)),
                _ => Opening::Perimeter(self.random_perimeter_cell()),
            },
        };

        self.state.finished = true;
        self.state.exit = Some(exit);
        exit
    }
}

impl<R: Rng> fmt::Debug for MazeCarver<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MazeCarver :: entrance: {}, exit: {}, cells: {}, state: {:?}",
               self.entrance_policy, self.exit_policy, self.topology.len(), self.state)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::grid::GridBuilder;
    use crate::units::{RingsCount, SubdivisionFactor};

    fn topology(rings: usize, factor: u32) -> Topology {
        GridBuilder::new(RingsCount(rings), SubdivisionFactor(factor))
            .build()
            .expect("valid grid configuration")
    }

    fn carver(rings: usize,
              factor: u32,
              entrance: EntrancePolicy,
              exit: ExitPolicy,
              seed: u64)
              -> MazeCarver<StdRng> {
        MazeCarver::new(topology(rings, factor), entrance, exit, StdRng::seed_from_u64(seed))
            .expect("non empty topology")
    }

    fn perimeter_ring(c: &MazeCarver<StdRng>) -> usize {
        c.topology().rings().0 - 1
    }

    fn is_invalid_configuration(result: Result<MazeCarver<StdRng>>) -> bool {
        match result {
            Err(Error(ErrorKind::InvalidConfiguration(_), _)) => true,
            _ => false,
        }
    }

    // The exit removes a wall that is neither carved nor the entrance, and together with the carved
    // passages it reaches every cell.
    fn exit_is_one_extra_opening(c: &MazeCarver<StdRng>) -> bool {
        let state = c.state();
        let passages = state.passages();
        let cells_count = c.topology().len();
        let mut with_exit = passages.clone();

        match state.exit() {
            Some(Opening::Passage(from, to)) => {
                let centre_reserved = state.entrance_cell() != CENTRE_INDEX;
                let expected_links = if centre_reserved { cells_count - 2 } else { cells_count - 1 };
                if passages.is_linked(from, to) ||
                   !c.topology().cell(from).map_or(false, |cell| cell.is_neighbour(to)) ||
                   passages.links_count() != expected_links ||
                   (centre_reserved && passages.links(CENTRE_INDEX).map_or(true, |links| !links.is_empty())) {
                    return false;
                }
                if with_exit.link(from, to).is_err() {
                    return false;
                }
            }
            Some(Opening::Perimeter(cell)) => {
                let on_perimeter = c.topology().cell(cell).map_or(false, |exit_cell| {
                    exit_cell.ring() == perimeter_ring(c)
                });
                if !on_perimeter || state.entrance() == Some(Opening::Perimeter(cell)) ||
                   passages.links_count() != cells_count - 1 {
                    return false;
                }
            }
            None => return false,
        }
        with_exit.is_connected()
    }

    #[test]
    fn empty_topology_is_rejected() {
        let result = MazeCarver::new(Topology::default(),
                                     EntrancePolicy::Centre,
                                     ExitPolicy::Farest,
                                     StdRng::seed_from_u64(1));
        match result {
            Err(Error(ErrorKind::EmptyTopology, _)) => {}
            other => panic!("expected an empty topology error, got {:?}", other),
        }
    }

    #[test]
    fn centre_entrance_is_seeded() {
        let c = carver(4, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 7);
        let centre = c.topology().cell(CENTRE_INDEX).unwrap();
        assert!(centre.is_visited() && centre.is_current());
        assert_eq!(c.state().current_cell(), CENTRE_INDEX);
        assert_eq!(c.state().entrance(), None);
        assert_eq!(c.topology().current_cell(), Some(CENTRE_INDEX));
        assert!(c.state().passages().is_empty());
    }

    #[test]
    fn perimeter_entrance_is_pre_opened() {
        let c = carver(3, 1, EntrancePolicy::Perimeter, ExitPolicy::RandomPerimeter, 11);
        let start = c.state().entrance_cell();
        assert_eq!(c.topology().cell(start).unwrap().ring(), 2);
        assert_eq!(c.state().entrance(), Some(Opening::Perimeter(start)));
        assert_eq!(c.topology().current_cell(), Some(start));
        assert!(c.state().passages().is_empty());
    }

    #[test]
    fn single_ring_carve_finishes_immediately() {
        for &exit_policy in &[ExitPolicy::Centre, ExitPolicy::Farest, ExitPolicy::RandomPerimeter] {
            let mut c = carver(1, 1, EntrancePolicy::Centre, exit_policy, 3);
            let step = c.step();
            assert_eq!(step, CarveStep::Finished { exit: Opening::Perimeter(CENTRE_INDEX) });
            assert!(c.is_finished());
            assert_eq!(c.state().passages().links_count(), 0);
            assert_eq!(c.state().exit_cell(), Some(CENTRE_INDEX));
        }
    }

    #[test]
    fn steps_carve_adjacent_unvisited_cells() {
        let mut c = carver(5, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 99);
        loop {
            let before = c.state().current_cell();
            match c.step() {
                CarveStep::Carved { from, to, .. } => {
                    assert!(c.topology().cell(from).unwrap().is_neighbour(to));
                    assert!(c.state().passages().is_linked(from, to));
                    assert_eq!(c.state().current_cell(), to);
                    assert_eq!(c.topology().current_cell(), Some(to));
                    assert_eq!(c.state().path_stack().last(), Some(&from));
                    if from != before {
                        // backtracked before carving
                        assert!(c.topology().cell(before).unwrap().is_visited());
                    }
                }
                CarveStep::Finished { .. } => break,
            }
        }
        assert_eq!(c.topology().current_cell(), None);
        assert!(c.state().path_stack().is_empty());
    }

    #[test]
    fn stepping_after_finish_changes_nothing() {
        let mut c = carver(3, 1, EntrancePolicy::Perimeter, ExitPolicy::RandomPerimeter, 5);
        c.run_to_completion();
        let exit = c.state().exit().expect("exit opened");
        let links = c.state().passages().iter_links().collect::<Vec<_>>();
        let steps = c.state().steps();

        assert_eq!(c.step(), CarveStep::Finished { exit });
        assert_eq!(c.step(), CarveStep::Finished { exit });
        assert_eq!(c.state().passages().iter_links().collect::<Vec<_>>(), links);
        assert_eq!(c.state().steps(), steps);
    }

    #[test]
    fn run_to_completion_visits_every_cell() {
        let mut c = carver(6, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 2024);
        c.run_to_completion();
        assert!(c.topology().cells().iter().all(|cell| cell.is_visited()));
        assert!(c.topology().cells().iter().all(|cell| !cell.is_current()));
        assert_eq!(c.state().passages().links_count(), c.topology().len() - 1);
        assert!(c.state().passages().is_connected());
    }

    #[test]
    fn farest_exit_is_on_the_perimeter() {
        let mut c = carver(5, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 8);
        c.run_to_completion();
        let exit = c.state().exit().unwrap();
        let ring = perimeter_ring(&c);
        match exit {
            Opening::Perimeter(cell) => {
                assert_eq!(c.topology().cell(cell).unwrap().ring(), ring);
                assert_eq!(c.state().longest_path_cell(), Some(cell));
                assert!(c.state().longest_path_length() >= ring);
            }
            other => panic!("expected a perimeter exit, got {:?}", other),
        }
    }

    #[test]
    fn centre_exit_opens_from_ring_one() {
        for seed in 0..50 {
            let mut c = carver(5, 1, EntrancePolicy::Perimeter, ExitPolicy::Centre, seed);
            c.run_to_completion();
            match c.state().exit().unwrap() {
                Opening::Passage(from, to) => {
                    assert_eq!(to, CENTRE_INDEX);
                    assert_eq!(c.topology().cell(from).unwrap().ring(), 1);
                    assert_eq!(c.state().longest_path_cell(), Some(from));
                    assert!(!c.state().passages().is_linked(from, to));
                }
                other => panic!("expected a passage into the centre, got {:?}", other),
            }
            // the centre is kept out of the carve, the exit is its only opening
            assert!(c.state().passages().links(CENTRE_INDEX).unwrap().is_empty());
            assert_eq!(c.state().passages().links_count(), c.topology().len() - 2);
            assert!(c.topology().cells().iter().all(|cell| cell.is_visited()));
            assert!(exit_is_one_extra_opening(&c));
        }
    }

    #[test]
    fn centre_entrance_with_centre_exit_opens_a_new_passage() {
        for seed in 0..50 {
            let mut c = carver(5, 1, EntrancePolicy::Centre, ExitPolicy::Centre, seed);
            c.run_to_completion();
            match c.state().exit().unwrap() {
                Opening::Passage(from, to) => {
                    assert_eq!(to, CENTRE_INDEX);
                    assert!(!c.state().passages().is_linked(from, to));
                }
                other => panic!("expected a passage into the centre, got {:?}", other),
            }
            assert_eq!(c.state().passages().links_count(), c.topology().len() - 1);
            assert!(exit_is_one_extra_opening(&c));
        }
    }

    #[test]
    fn single_sector_ring_one_grid() {
        let new = |entrance, exit| {
            MazeCarver::new(topology(2, 0), entrance, exit, StdRng::seed_from_u64(9))
        };
        // ring 1 is both the perimeter and a single cell
        assert!(is_invalid_configuration(new(EntrancePolicy::Perimeter, ExitPolicy::Farest)));
        assert!(is_invalid_configuration(new(EntrancePolicy::Perimeter, ExitPolicy::RandomPerimeter)));
        assert!(is_invalid_configuration(new(EntrancePolicy::Centre, ExitPolicy::Centre)));

        let mut c = new(EntrancePolicy::Perimeter, ExitPolicy::Centre).unwrap();
        c.run_to_completion();
        assert_eq!(c.state().entrance(), Some(Opening::Perimeter(1)));
        assert_eq!(c.state().exit(), Some(Opening::Passage(1, CENTRE_INDEX)));
        assert!(c.state().passages().is_empty());

        let mut c = new(EntrancePolicy::Centre, ExitPolicy::Farest).unwrap();
        c.run_to_completion();
        assert_eq!(c.state().exit(), Some(Opening::Perimeter(1)));
        assert!(c.state().passages().is_linked(CENTRE_INDEX, 1));
    }

    #[test]
    fn perimeter_entrance_needs_a_second_ring() {
        for &exit in &[ExitPolicy::Centre, ExitPolicy::Farest, ExitPolicy::RandomPerimeter] {
            let result = MazeCarver::new(topology(1, 2), EntrancePolicy::Perimeter, exit, StdRng::seed_from_u64(2));
            assert!(is_invalid_configuration(result));
        }
    }

    #[test]
    fn perimeter_entrance_with_random_perimeter_exit() {
        for seed in 0..20 {
            let mut c = carver(3, 1, EntrancePolicy::Perimeter, ExitPolicy::RandomPerimeter, seed);
            c.run_to_completion();
            let ring = perimeter_ring(&c);

            let entrance = c.state().entrance().expect("entrance opened");
            let exit = c.state().exit().expect("exit opened");
            for opening in &[entrance, exit] {
                match *opening {
                    Opening::Perimeter(cell) => assert_eq!(c.topology().cell(cell).unwrap().ring(), ring),
                    other => panic!("expected a perimeter opening, got {:?}", other),
                }
            }
            assert_ne!(entrance, exit);
            assert!(exit_is_one_extra_opening(&c));
            // random perimeter exits keep no longest path record
            assert_eq!(c.state().longest_path_cell(), None);
        }
    }

    #[test]
    fn longest_path_cell_is_deepest_on_target_ring() {
        let mut c = carver(6, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 31);
        let ring = perimeter_ring(&c);
        let mut deepest = (0, None);
        loop {
            match c.step() {
                CarveStep::Carved { to, .. } => {
                    let depth = c.state().path_stack().len();
                    if c.topology().cell(to).unwrap().ring() == ring && depth > deepest.0 {
                        deepest = (depth, Some(to));
                    }
                }
                CarveStep::Finished { .. } => break,
            }
        }
        assert_eq!(c.state().longest_path_length(), deepest.0);
        assert_eq!(c.state().longest_path_cell(), deepest.1);
    }

    #[test]
    fn same_seed_same_labyrinth() {
        let run = |seed| {
            let mut c = carver(7, 1, EntrancePolicy::Perimeter, ExitPolicy::Farest, seed);
            c.run_to_completion();
            (c.state().passages().iter_links().collect::<Vec<_>>(), c.state().exit(), c.state().entrance())
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42).0, run(43).0);
    }

    #[test]
    fn reset_starts_a_fresh_run() {
        let mut c = carver(5, 1, EntrancePolicy::Centre, ExitPolicy::Farest, 4);
        c.run_to_completion();
        let first = c.state().passages().iter_links().collect::<Vec<_>>();

        c.reset();
        assert!(!c.is_finished());
        assert!(c.state().passages().is_empty());
        assert_eq!(c.state().exit(), None);
        assert_eq!(c.topology().cells().iter().filter(|cell| cell.is_visited()).count(), 1);

        c.run_to_completion();
        assert_eq!(c.state().passages().links_count(), first.len());
    }

    #[test]
    fn policy_names() {
        assert_eq!("center".parse::<EntrancePolicy>().unwrap(), EntrancePolicy::Centre);
        assert_eq!("Perimeter".parse::<EntrancePolicy>().unwrap(), EntrancePolicy::Perimeter);
        assert_eq!("farest".parse::<ExitPolicy>().unwrap(), ExitPolicy::Farest);
        assert_eq!("random-perimeter".parse::<ExitPolicy>().unwrap(), ExitPolicy::RandomPerimeter);
        assert_eq!(ExitPolicy::RandomPerimeter.to_string(), "random-perimeter");
        match "sideways".parse::<ExitPolicy>() {
            Err(Error(ErrorKind::UnknownPolicy(name), _)) => assert_eq!(name, "sideways"),
            other => panic!("expected an unknown policy error, got {:?}", other),
        }
    }

    #[test]
    fn carves_spanning_trees_within_step_bound() {
        fn p(rings: u8, factor: u8, seed: u64, perimeter_entrance: bool, exit: u8) -> TestResult {
            let rings = 1 + rings as usize % 12;
            let factor = factor as u32 % 4;
            let entrance = if perimeter_entrance { EntrancePolicy::Perimeter } else { EntrancePolicy::Centre };
            let exit = match exit % 3 {
                0 => ExitPolicy::Centre,
                1 => ExitPolicy::Farest,
                _ => ExitPolicy::RandomPerimeter,
            };

            let result = MazeCarver::new(topology(rings, factor), entrance, exit, StdRng::seed_from_u64(seed));
            let invalid = check_openings(RingsCount(rings), SubdivisionFactor(factor), entrance, exit).is_err();
            let mut c = match result {
                Ok(c) if !invalid => c,
                Err(Error(ErrorKind::InvalidConfiguration(_), _)) if invalid => return TestResult::discard(),
                _ => return TestResult::failed(),
            };
            let cells_count = c.topology().len();
            let mut steps = 0;
            while !c.is_finished() {
                c.step();
                steps += 1;
                if steps > 2 * cells_count {
                    return TestResult::failed();
                }
            }

            let passages = c.state().passages();
            let all_adjacent = passages.iter_links().all(|(a, b)| c.topology().cell(a).unwrap().is_neighbour(b));
            TestResult::from_bool(c.topology().cells().iter().all(|cell| cell.is_visited()) &&
                                  all_adjacent &&
                                  exit_is_one_extra_opening(&c))
        }
        quickcheck(p as fn(u8, u8, u64, bool, u8) -> TestResult);
    }
}
