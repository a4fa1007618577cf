use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Entries kept per (cell count, density) table.
pub const MAX_SCORES: usize = 1000;

pub const ANONYMOUS: &str = "[anonymous]";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Milliseconds from first move to win.
    pub time_ms: u64,
    /// Unix timestamp of the win in milliseconds.
    pub date_ms: u64,
    pub name: String,
}

impl Score {
    pub fn new(time_ms: u64, date_ms: u64, name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string();
        Self {
            time_ms,
            date_ms,
            name,
        }
    }

    fn sort_key(&self) -> (u64, u64) {
        (self.time_ms, self.date_ms)
    }
}

/// Best times per board configuration, each list ordered by time and then date.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    tables: BTreeMap<CellCount, BTreeMap<u8, Vec<Score>>>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self, cell_count: CellCount, density: u8) -> &[Score] {
        self.tables
            .get(&cell_count)
            .and_then(|by_density| by_density.get(&density))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn scores_for(&self, config: &GameConfig) -> &[Score] {
        self.scores(config.cell_count, config.density)
    }

    /// Whether `score` would make it into a full table.
    pub fn qualifies(&self, cell_count: CellCount, density: u8, score: &Score) -> bool {
        let scores = self.scores(cell_count, density);
        scores.len() < MAX_SCORES
            || scores
                .last()
                .is_some_and(|last| score.sort_key() < last.sort_key())
    }

    /// Inserts `score` and returns its zero-based rank, or `None` if it did not qualify.
    pub fn insert(&mut self, cell_count: CellCount, density: u8, score: Score) -> Option<usize> {
        if !self.qualifies(cell_count, density, &score) {
            log::debug!("score of {}ms did not qualify", score.time_ms);
            return None;
        }
        let scores = self
            .tables
            .entry(cell_count)
            .or_default()
            .entry(density)
            .or_default();
        let rank = scores.partition_point(|other| other.sort_key() <= score.sort_key());
        scores.insert(rank, score);
        scores.truncate(MAX_SCORES);
        Some(rank)
    }

    /// All (cell count, density) pairs that have at least one score.
    pub fn keys(&self) -> impl Iterator<Item = (CellCount, u8)> + '_ {
        self.tables.iter().flat_map(|(&cell_count, by_density)| {
            by_density
                .iter()
                .filter(|(_, scores)| !scores.is_empty())
                .map(move |(&density, _)| (cell_count, density))
        })
    }
}
