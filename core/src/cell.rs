use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Inclusive run of columns owned by one cell on one row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub left: Coord,
    pub right: Coord,
}

impl Span {
    pub const fn new(left: Coord, right: Coord) -> Self {
        Self { left, right }
    }

    pub const fn len(self) -> CellCount {
        (self.right - self.left) as CellCount + 1
    }

    pub const fn contains(self, x: Coord) -> bool {
        self.left <= x && x <= self.right
    }

    /// Sum of the column indices `left..=right`.
    pub const fn column_sum(self) -> u64 {
        (self.left as u64 + self.right as u64) * self.len() as u64 / 2
    }
}

/// Sparse per-row extent of a cell, indexed by offset from its first occupied row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellRows {
    first_row: Coord,
    spans: Vec<Option<Span>>,
}

impl CellRows {
    pub fn first_row(&self) -> Coord {
        self.first_row
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, y: Coord) -> Option<Span> {
        let offset = usize::from(y.checked_sub(self.first_row)?);
        self.spans.get(offset).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, Span)> + '_ {
        self.spans
            .iter()
            .enumerate()
            .filter_map(|(offset, span)| Some((self.first_row + offset as Coord, (*span)?)))
    }

    /// Records a run; rows must be pushed top to bottom.
    pub fn push(&mut self, y: Coord, span: Span) {
        if self.spans.is_empty() {
            self.first_row = y;
        }
        let Some(offset) = y.checked_sub(self.first_row).map(usize::from) else {
            log::warn!("row {} pushed above first row {}", y, self.first_row);
            return;
        };
        if offset >= self.spans.len() {
            self.spans.resize(offset + 1, None);
        }
        let slot = &mut self.spans[offset];
        *slot = match *slot {
            None => Some(span),
            Some(existing) => {
                log::warn!("cell split on row {}: {:?} and {:?}", y, existing, span);
                Some(Span::new(
                    existing.left.min(span.left),
                    existing.right.max(span.right),
                ))
            }
        };
    }

    pub fn area(&self) -> CellCount {
        self.iter().map(|(_, span)| span.len()).sum()
    }

    /// `(min_x, min_y, max_x, max_y)` of the owned points.
    pub fn bounding_box(&self) -> Option<(Coord2, Coord2)> {
        self.iter().fold(None, |bounds, (y, span)| {
            Some(match bounds {
                None => ((span.left, y), (span.right, y)),
                Some(((min_x, min_y), (max_x, max_y))) => (
                    (min_x.min(span.left), min_y.min(y)),
                    (max_x.max(span.right), max_y.max(y)),
                ),
            })
        })
    }

    /// Area centroid rounded to the nearest raster point.
    pub fn centroid(&self) -> Option<Coord2> {
        let mut count = 0u64;
        let mut x_total = 0u64;
        let mut y_total = 0u64;
        for (y, span) in self.iter() {
            let len = u64::from(span.len());
            count += len;
            x_total += span.column_sum();
            y_total += u64::from(y) * len;
        }
        if count == 0 {
            return None;
        }
        let round = |total: u64| ((2 * total + count) / (2 * count)) as Coord;
        Some((round(x_total), round(y_total)))
    }
}

/// One site of the partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub origin: Coord2,
    pub neighbors: SmallVec<[CellId; 8]>,
    pub rows: CellRows,
    pub centroid: Option<Coord2>,
}

impl Cell {
    pub fn new(origin: Coord2) -> Self {
        Self {
            origin,
            neighbors: SmallVec::new(),
            rows: CellRows::default(),
            centroid: None,
        }
    }
}

/// Splits every raster row into runs and files each run under its owner.
pub fn collect_rows(assignment: &Array2<CellId>, cell_count: usize) -> Vec<CellRows> {
    let (width, height) = assignment.dim();
    let mut rows = Vec::new();
    rows.resize_with(cell_count, CellRows::default);

    for y in 0..height {
        let mut left = 0;
        while left < width {
            let owner = assignment[[left, y]];
            let mut right = left;
            while right + 1 < width && assignment[[right + 1, y]] == owner {
                right += 1;
            }
            if let Some(cell_rows) = rows.get_mut(usize::from(owner)) {
                cell_rows.push(y as Coord, Span::new(left as Coord, right as Coord));
            }
            left = right + 1;
        }
    }
    rows
}
