use alloc::vec::Vec;
use hashbrown::HashSet;
use rand::prelude::*;

use crate::*;

/// Scatters `count` distinct sites over a `size` region.
///
/// Sites are drawn on the sub-lattice of multiples of `spacing`, so with a spacing of at least two no two sites
/// touch. Draws are rejected and redrawn until enough unique positions are collected.
pub fn sample_sites(
    rng: &mut SmallRng,
    count: CellCount,
    size: Coord2,
    spacing: Coord,
) -> Result<Vec<Coord2>> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(GameError::InvalidRegion);
    }
    if count > MAX_CELLS {
        return Err(GameError::TooManyCells);
    }

    let spacing = spacing.max(1);
    let slots_x = width.div_ceil(spacing);
    let slots_y = height.div_ceil(spacing);
    if count > mult(slots_x, slots_y) {
        return Err(GameError::TooManyCells);
    }
    if u64::from(count) * 2 > u64::from(mult(slots_x, slots_y)) {
        log::warn!(
            "Sampling {} sites out of {} slots, rejection sampling will be slow",
            count,
            mult(slots_x, slots_y)
        );
    }

    let capacity = count as usize;
    let mut taken = HashSet::with_capacity(capacity);
    let mut sites = Vec::with_capacity(capacity);
    while sites.len() < capacity {
        let x = rng.random_range(0..slots_x) * spacing;
        let y = rng.random_range(0..slots_y) * spacing;
        if taken.insert(pair((x, y))) {
            sites.push((x, y));
        }
    }
    Ok(sites)
}
