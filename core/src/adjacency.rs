use alloc::vec::Vec;
use hashbrown::HashMap;
use ndarray::Array2;
use smallvec::SmallVec;

use crate::*;

/// Shared-border observations needed before two cells count as neighbors.
pub const DEFAULT_CONFIRMATIONS: u8 = 2;

pub type Neighbors = SmallVec<[CellId; 8]>;

#[derive(Clone, Debug, PartialEq)]
pub struct Adjacency {
    pub borders: Array2<bool>,
    pub neighbors: Vec<Neighbors>,
}

/// Marks border points and collects the neighbor graph in one pass.
///
/// Every point is compared with the point to its right and the point below. A mismatch marks the point as a border
/// and counts one observation of the pair; pairs seen at least `confirmations` times become symmetric edges. The
/// last column and the last row are borders unconditionally.
pub fn extract_adjacency(
    assignment: &Array2<CellId>,
    cell_count: usize,
    confirmations: u8,
) -> Adjacency {
    let (width, height) = assignment.dim();
    let mut borders = Array2::from_elem((width, height), false);
    let mut observations: HashMap<(CellId, CellId), u8> = HashMap::new();

    let mut observe = |a: CellId, b: CellId| {
        let key = (a.min(b), a.max(b));
        let count = observations.entry(key).or_insert(0);
        *count = count.saturating_add(1);
    };

    for y in 0..height {
        for x in 0..width {
            let owner = assignment[[x, y]];
            let right = (x + 1 < width).then(|| assignment[[x + 1, y]]);
            let below = (y + 1 < height).then(|| assignment[[x, y + 1]]);
            for other in [right, below].into_iter().flatten() {
                if other != owner {
                    borders[[x, y]] = true;
                    observe(owner, other);
                }
            }
        }
    }

    if width > 0 {
        borders.row_mut(width - 1).fill(true);
    }
    if height > 0 {
        borders.column_mut(height - 1).fill(true);
    }

    let mut neighbors = Vec::new();
    neighbors.resize_with(cell_count, Neighbors::new);
    for (&(a, b), &count) in &observations {
        if count < confirmations.max(1) {
            continue;
        }
        let (ia, ib) = (usize::from(a), usize::from(b));
        if ia < cell_count && ib < cell_count {
            neighbors[ia].push(b);
            neighbors[ib].push(a);
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
    }

    Adjacency { borders, neighbors }
}
