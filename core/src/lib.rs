#![no_std]

extern crate alloc;

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use adjacency::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use graph::*;
pub use highscore::*;
pub use lattice::*;
pub use layout::*;
pub use paint::*;
pub use partition::*;
pub use sampler::*;
pub use surface::*;
pub use tile::*;
pub use types::*;
pub use voronoi::*;

mod adjacency;
mod cell;
mod engine;
mod error;
mod graph;
mod highscore;
mod lattice;
mod layout;
mod paint;
mod partition;
mod sampler;
mod surface;
mod tile;
mod types;
mod voronoi;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub cell_count: CellCount,
    /// Percentage of cells holding a mine.
    pub density: u8,
    pub metric: Metric,
}

impl GameConfig {
    pub const MAX_DENSITY: u8 = 90;

    pub const fn new_unchecked(cell_count: CellCount, density: u8, metric: Metric) -> Self {
        Self {
            cell_count,
            density,
            metric,
        }
    }

    pub fn new(cell_count: CellCount, density: u8, metric: Metric) -> Self {
        let cell_count = cell_count.clamp(1, MAX_CELLS);
        let density = density.clamp(1, Self::MAX_DENSITY);
        Self::new_unchecked(cell_count, density, metric)
    }

    pub fn mine_count(&self) -> CellCount {
        MineLayout::mine_count_for(self.cell_count, self.density)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(200, 15, Metric::Euclidean)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed | HitMine | Won => true,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
