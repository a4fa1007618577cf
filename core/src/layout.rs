use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Which cells of a board hold mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Vec<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// `floor(density * cells / 100)`, always leaving at least one safe cell.
    pub fn mine_count_for(total_cells: CellCount, density: u8) -> CellCount {
        let mines = u64::from(density) * u64::from(total_cells) / 100;
        (mines as CellCount).min(total_cells.saturating_sub(1))
    }

    pub fn from_mine_mask(mine_mask: Vec<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_ids(total_cells: CellCount, mine_ids: &[CellId]) -> Result<Self> {
        let mut mine_mask = alloc::vec![false; total_cells as usize];
        for &id in mine_ids {
            *mine_mask
                .get_mut(usize::from(id))
                .ok_or(GameError::InvalidCellId)? = true;
        }
        Ok(Self::from_mine_mask(mine_mask))
    }

    /// Shuffles `mine_count` mines among `total_cells` cells.
    pub fn random(total_cells: CellCount, mine_count: CellCount, rng: &mut SmallRng) -> Self {
        if mine_count >= total_cells {
            log::warn!(
                "Board already full, requested {} mines but only fits {}",
                mine_count,
                total_cells
            );
        }
        let mut mine_mask = alloc::vec![false; total_cells as usize];
        let mine_count = mine_count.min(total_cells);
        mine_mask[..mine_count as usize].fill(true);
        mine_mask.shuffle(rng);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains_mine(&self, id: CellId) -> bool {
        self.mine_mask
            .get(usize::from(id))
            .copied()
            .unwrap_or(false)
    }
}

impl Index<CellId> for MineLayout {
    type Output = bool;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.mine_mask[usize::from(id)]
    }
}

impl IndexMut<CellId> for MineLayout {
    fn index_mut(&mut self, id: CellId) -> &mut Self::Output {
        &mut self.mine_mask[usize::from(id)]
    }
}
