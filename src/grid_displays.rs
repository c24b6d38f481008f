use std::fmt;

use fnv::FnvHashSet;
use itertools::Itertools;

use crate::labyrinth::Labyrinth;
use crate::passages::Opening;

/// One row per cell: index, polar coordinate, layout location, neighbours and opened passages.
///
/// The marker column shows `S` on the entrance cell, `E` on the exit cell and `.` on the cells of
/// a highlighted path.
#[derive(Debug)]
pub struct CellTable<'a> {
    labyrinth: &'a Labyrinth,
    on_path_cells: FnvHashSet<usize>,
}

impl<'a> CellTable<'a> {
    pub fn new(labyrinth: &'a Labyrinth) -> CellTable<'a> {
        CellTable {
            labyrinth,
            on_path_cells: FnvHashSet::default(),
        }
    }

    pub fn with_path(labyrinth: &'a Labyrinth, path: &[usize]) -> CellTable<'a> {
        CellTable {
            labyrinth,
            on_path_cells: path.iter().cloned().collect(),
        }
    }

    fn marker(&self, index: usize) -> &'static str {
        if index == self.labyrinth.entrance_cell() {
            "S"
        } else if self.labyrinth.state().exit_cell() == Some(index) {
            "E"
        } else if self.on_path_cells.contains(&index) {
            "."
        } else {
            " "
        }
    }
}

impl<'a> fmt::Display for CellTable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:>7} {:>5} {:>7} {:>10} {:>10}  {} {:<20} {}",
                 "cell", "ring", "sector", "x", "y", " ", "neighbours", "passages")?;

        let passages = self.labyrinth.passages();
        for cell in self.labyrinth.topology().cells() {
            let location = cell.location();
            let linked = passages.links(cell.index()).unwrap_or_default();
            writeln!(f, "{:>7} {:>5} {:>7} {:>10.1} {:>10.1}  {} {:<20} {}",
                     cell.index(),
                     cell.ring(),
                     cell.sector(),
                     location.x,
                     location.y,
                     self.marker(cell.index()),
                     cell.neighbours().iter().join(","),
                     linked.iter().sorted().join(","))?;
        }
        Ok(())
    }
}

/// A few lines describing a finished carve.
#[derive(Debug)]
pub struct CarveSummary<'a>(pub &'a Labyrinth);

impl<'a> fmt::Display for CarveSummary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let labyrinth = self.0;
        let config = labyrinth.config();
        let state = labyrinth.state();
        let describe = |opening: Option<Opening>| opening.map_or_else(|| String::from("none"), |o| o.to_string());

        writeln!(f, "rings: {}, subdivision factor: {}, seed: {}",
                 config.max_rings.0, config.subdivision_factor.0, config.seed)?;
        writeln!(f, "cells: {}, passages: {}", labyrinth.topology().len(), labyrinth.passages().links_count())?;
        writeln!(f, "entrance ({}): cell {}, opening {}",
                 config.entrance, state.entrance_cell(), describe(state.entrance()))?;
        writeln!(f, "exit ({}): {}", config.exit, describe(state.exit()))?;
        match state.longest_path_cell() {
            Some(cell) => writeln!(f, "longest carve path: {} steps to cell {}", state.longest_path_length(), cell),
            None => writeln!(f, "longest carve path: not tracked"),
        }
    }
}
