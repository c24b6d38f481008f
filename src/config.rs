use serde_derive::{Deserialize, Serialize};

use crate::errors::*;
use crate::generators::{check_openings, EntrancePolicy, ExitPolicy};
use crate::grid::{validate_radii, GridBuilder, DEFAULT_BASE_RADIUS, DEFAULT_RING_SPACING};
use crate::grid_dimensions::{checked_cells_count, MAX_CELLS, MAX_SUBDIVISION_FACTOR};
use crate::units::{RingsCount, SubdivisionFactor};

/// Every knob of one labyrinth generation. Missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabyrinthConfig {
    pub max_rings: RingsCount,
    pub subdivision_factor: SubdivisionFactor,
    pub base_radius: f64,
    pub ring_spacing: f64,
    pub entrance: EntrancePolicy,
    pub exit: ExitPolicy,
    /// Seed for the carver's random generator. Equal seeds give equal labyrinths.
    pub seed: u64,
}

impl Default for LabyrinthConfig {
    fn default() -> LabyrinthConfig {
        LabyrinthConfig {
            max_rings: RingsCount(3),
            subdivision_factor: SubdivisionFactor(1),
            base_radius: DEFAULT_BASE_RADIUS,
            ring_spacing: DEFAULT_RING_SPACING,
            entrance: EntrancePolicy::Centre,
            exit: ExitPolicy::Farest,
            seed: 0,
        }
    }
}

impl LabyrinthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_rings.0 < 1 {
            bail!(ErrorKind::InvalidConfiguration(String::from("max rings must be at least 1")));
        }
        if self.subdivision_factor.0 > MAX_SUBDIVISION_FACTOR {
            bail!(ErrorKind::InvalidConfiguration(format!("subdivision factor must be at most {}, got {}",
                                                          MAX_SUBDIVISION_FACTOR,
                                                          self.subdivision_factor.0)));
        }
        if checked_cells_count(self.max_rings, self.subdivision_factor).is_none() {
            bail!(ErrorKind::InvalidConfiguration(format!("{} rings with subdivision factor {} exceeds {} cells",
                                                          self.max_rings.0,
                                                          self.subdivision_factor.0,
                                                          MAX_CELLS)));
        }
        validate_radii(self.base_radius, self.ring_spacing)?;
        check_openings(self.max_rings, self.subdivision_factor, self.entrance, self.exit)
    }

    pub fn grid_builder(&self) -> GridBuilder {
        GridBuilder::new(self.max_rings, self.subdivision_factor)
            .base_radius(self.base_radius)
            .ring_spacing(self.ring_spacing)
    }
}
