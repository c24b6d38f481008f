use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_derive::Serialize;
use tracing::info;

use crate::config::LabyrinthConfig;
use crate::errors::*;
use crate::generators::{CarvingState, MazeCarver};
use crate::grid::Topology;
use crate::passages::{Opening, Passages};
use crate::pathing::{shortest_path, Distances};

/// A fully carved labyrinth.
#[derive(Debug, Clone)]
pub struct Labyrinth {
    config: LabyrinthConfig,
    topology: Topology,
    state: CarvingState,
}

/// A carver over the configured topology, seeded from the configuration, for callers that want to
/// step the carve themselves.
pub fn carver(config: &LabyrinthConfig) -> Result<MazeCarver<StdRng>> {
    config.validate()?;
    let topology = config.grid_builder().build()?;
    MazeCarver::new(topology, config.entrance, config.exit, StdRng::seed_from_u64(config.seed))
}

impl Labyrinth {
    pub fn generate(config: &LabyrinthConfig) -> Result<Labyrinth> {
        let mut maze_carver = carver(config)?;
        maze_carver.run_to_completion();
        let (topology, state) = maze_carver.into_parts();

        info!(cells = topology.len(),
              passages = state.passages().links_count(),
              seed = config.seed,
              "labyrinth generated");

        Ok(Labyrinth {
            config: config.clone(),
            topology,
            state,
        })
    }

    #[inline]
    pub fn config(&self) -> &LabyrinthConfig {
        &self.config
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
    pub fn passages(&self) -> &Passages {
        self.state.passages()
    }

    #[inline]
    pub fn entrance_cell(&self) -> usize {
        self.state.entrance_cell()
    }

    #[inline]
    pub fn exit(&self) -> Option<Opening> {
        self.state.exit()
    }

    /// Cells from the entrance to the exit cell, both included.
    pub fn solution(&self) -> Option<Vec<usize>> {
        let exit_cell = self.state.exit_cell()?;
        let distances = Distances::new(self.passages(), self.entrance_cell())?;
        shortest_path(self.passages(), &distances, exit_cell)
    }

    /// Everything an external renderer needs, in a serializable form.
    pub fn snapshot(&self) -> LabyrinthSnapshot {
        LabyrinthSnapshot {
            config: &self.config,
            topology: &self.topology,
            passages: self.passages().iter_links().collect(),
            entrance: self.state.entrance(),
            entrance_cell: self.entrance_cell(),
            exit: self.exit(),
            longest_path_cell: self.state.longest_path_cell(),
            longest_path_length: self.state.longest_path_length(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LabyrinthSnapshot<'a> {
    pub config: &'a LabyrinthConfig,
    pub topology: &'a Topology,
    pub passages: Vec<(usize, usize)>,
    pub entrance: Option<Opening>,
    pub entrance_cell: usize,
    pub exit: Option<Opening>,
    pub longest_path_cell: Option<usize>,
    pub longest_path_length: usize,
}
