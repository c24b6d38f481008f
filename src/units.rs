use std::convert::TryFrom;

use serde_derive::{Deserialize, Serialize};

use crate::errors::*;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct RingsCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubdivisionFactor(pub u32);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct NodesCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct EdgesCount(pub usize);

/// Rings counts typed in by a user may be negative or zero, neither of which describe a grid.
impl TryFrom<i64> for RingsCount {
    type Error = Error;

    fn try_from(rings: i64) -> Result<RingsCount> {
        if rings < 1 {
            bail!(ErrorKind::InvalidConfiguration(format!("max rings must be at least 1, got {}", rings)));
        }
        Ok(RingsCount(rings as usize))
    }
}

impl TryFrom<i64> for SubdivisionFactor {
    type Error = Error;

    fn try_from(factor: i64) -> Result<SubdivisionFactor> {
        if factor < 0 || factor > i64::from(u32::MAX) {
            bail!(ErrorKind::InvalidConfiguration(format!("subdivision factor must be non-negative, got {}",
                                                          factor)));
        }
        Ok(SubdivisionFactor(factor as u32))
    }
}
