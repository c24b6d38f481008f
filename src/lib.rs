//! **labyrinth** generates mazes on a circular grid of concentric rings, carved by randomized
//! recursive backtracking.
//!
//! `grid` builds the polar cell topology, `generators` carves it one passage at a time and
//! `labyrinth` wires both together from a `LabyrinthConfig`.

#[macro_use]
extern crate error_chain;

pub mod cells;
pub mod config;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_dimensions;
pub mod grid_displays;
pub mod labyrinth;
pub mod passages;
pub mod pathing;
pub mod units;
