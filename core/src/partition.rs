use alloc::vec::Vec;
use hashbrown::HashMap;
use ndarray::Array2;
use web_time::Instant;

use crate::*;

/// How many sorted lattice offsets every site walks before the row search takes over.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SeedBudget {
    /// `floor(2.34 * (width + height)² / cells)` coordinates, two per offset, which leaves only a
    /// thin unseeded shell on typical boards.
    #[default]
    Auto,
    Offsets(usize),
}

impl SeedBudget {
    fn offsets(self, size: Coord2, cells: usize) -> usize {
        match self {
            Self::Auto => {
                let span = u64::from(size.0) + u64::from(size.1);
                let budget = 234 * span * span / (2 * 100 * cells.max(1) as u64);
                budget.try_into().unwrap_or(usize::MAX)
            }
            Self::Offsets(offsets) => offsets,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub seeded: usize,
    pub exact_lookups: usize,
}

/// Long-lived caches shared by successive partitions.
///
/// Lattices are keyed by metric (the radius is fixed), border guesses by `(width, height, cells)`. The assignment
/// buffer is recycled between boards and is always fully reset before it is handed out again.
#[derive(Debug, Default)]
pub struct PartitionContext {
    lattices: HashMap<Metric, Lattice>,
    border_guesses: HashMap<(Coord, Coord, usize), Vec<Coord>>,
    spare_assignment: Option<Array2<CellId>>,
}

impl PartitionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lattice(&mut self, metric: Metric) -> &Lattice {
        self.lattices.entry(metric).or_insert_with(|| {
            let start = Instant::now();
            let lattice = Lattice::sorted(metric, LATTICE_RADIUS);
            log::debug!(
                "sorted {:?} lattice of {} points in {:?}",
                metric,
                lattice.len(),
                start.elapsed()
            );
            lattice
        })
    }

    pub fn border_guesses(&mut self, size: Coord2, cells: usize) -> &[Coord] {
        self.border_guesses
            .entry((size.0, size.1, cells))
            .or_insert_with(|| border_guesses(size, cells))
    }

    /// Hands a buffer back so the next partition can reuse its allocation.
    pub fn recycle(&mut self, assignment: Array2<CellId>) {
        self.spare_assignment = Some(assignment);
    }

    fn take_assignment(&mut self, size: Coord2) -> Array2<CellId> {
        match self.spare_assignment.take() {
            Some(mut buffer) if buffer.dim() == (size.0.into(), size.1.into()) => {
                buffer.fill(UNRESOLVED);
                buffer
            }
            _ => Array2::from_elem(size.to_nd_index(), UNRESOLVED),
        }
    }

    /// Assigns every raster point to its nearest site, ties going to the lowest site index.
    ///
    /// The result is exact for every metric: seeding only ever claims a point for a site at minimal distance, and
    /// the row search only trusts exact lookups.
    pub fn partition(
        &mut self,
        sites: &[Coord2],
        size: Coord2,
        metric: Metric,
        budget: SeedBudget,
    ) -> Result<(Array2<CellId>, PartitionStats)> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidRegion);
        }
        if sites.is_empty() || sites.len() > MAX_CELLS as usize {
            return Err(GameError::TooManyCells);
        }
        if sites.iter().any(|&(x, y)| x >= size.0 || y >= size.1) {
            return Err(GameError::InvalidRegion);
        }

        let start = Instant::now();
        let mut assignment = self.take_assignment(size);
        let offsets = budget.offsets(size, sites.len());
        let seeded = seed_expanding_rings(
            &mut assignment,
            sites,
            metric,
            self.lattice(metric),
            offsets,
        );

        let guesses = self.border_guesses(size, sites.len());
        let mut resolver = RowResolver {
            assignment: &mut assignment,
            sites,
            metric,
            exact_lookups: 0,
        };
        for y in 0..size.1 {
            resolver.resolve_row(y, guesses);
        }
        let stats = PartitionStats {
            seeded,
            exact_lookups: resolver.exact_lookups,
        };

        log::debug!(
            "partitioned {}x{} into {} cells in {:?} ({:?})",
            size.0,
            size.1,
            sites.len(),
            start.elapsed(),
            stats
        );
        Ok((assignment, stats))
    }
}

/// Expected positions of cell borders along a row, spaced by the average cell width and ending at the last column.
pub fn border_guesses((width, height): Coord2, cells: usize) -> Vec<Coord> {
    let area = u64::from(width) * u64::from(height);
    let cell_width = (area / cells.max(1) as u64).isqrt().max(1);
    let last = u64::from(width.saturating_sub(1));

    let mut guesses: Vec<Coord> = (1..)
        .map(|k| k * cell_width)
        .take_while(|&guess| guess < last)
        .map(|guess| guess as Coord)
        .collect();
    guesses.push(last as Coord);
    guesses
}

/// Brute-force nearest site, the first one wins ties.
pub fn nearest_site(point: Coord2, sites: &[Coord2], metric: Metric) -> CellId {
    let mut closest = 0;
    let mut min_dist = u64::MAX;
    for (id, &site) in sites.iter().enumerate() {
        let d = metric.distance(point, site);
        if d < min_dist {
            min_dist = d;
            closest = id;
        }
    }
    closest as CellId
}

/// Walks the sorted offsets outward from every site at once, claiming unowned points.
///
/// Offsets are visited by increasing distance, so the first claim on a point comes from a closest site; a later
/// claim at the same distance from a lower-indexed site takes the point over. The prefix is extended to a whole
/// ring of equal distances so no tied site is skipped.
fn seed_expanding_rings(
    assignment: &mut Array2<CellId>,
    sites: &[Coord2],
    metric: Metric,
    lattice: &Lattice,
    offsets: usize,
) -> usize {
    let (width, height) = assignment.dim();
    let mut seeded = 0;

    for point in &lattice.points()[..lattice.complete_ring(offsets)] {
        for (id, &(site_x, site_y)) in sites.iter().enumerate() {
            let Some(y) = site_y.checked_add_signed(point.dy) else {
                continue;
            };
            let Some(x) = site_x.checked_add_signed(point.dx) else {
                continue;
            };
            if usize::from(x) >= width || usize::from(y) >= height {
                continue;
            }

            let id = id as CellId;
            let owner = &mut assignment[(x, y).to_nd_index()];
            if *owner == UNRESOLVED {
                *owner = id;
                seeded += 1;
            } else if id < *owner
                && metric.distance((x, y), sites[usize::from(*owner)]) == point.norm
            {
                *owner = id;
            }
        }
    }
    seeded
}

struct RowResolver<'a> {
    assignment: &'a mut Array2<CellId>,
    sites: &'a [Coord2],
    metric: Metric,
    exact_lookups: usize,
}

impl RowResolver<'_> {
    fn owner_at(&mut self, x: Coord, y: Coord) -> CellId {
        let owner = &mut self.assignment[(x, y).to_nd_index()];
        if *owner == UNRESOLVED {
            *owner = nearest_site((x, y), self.sites, self.metric);
            self.exact_lookups += 1;
        }
        *owner
    }

    /// Fills one row run by run.
    ///
    /// Along a row each site owns one contiguous interval under all supported metrics, so once the owner at the
    /// left end of a run is known, any probe with the same owner extends the run and the first differing probe
    /// bounds it. The border between the two is found by bisection.
    fn resolve_row(&mut self, y: Coord, guesses: &[Coord]) {
        let width = self.assignment.dim().0;
        let seeded = (0..width).all(|x| self.assignment[[x, usize::from(y)]] != UNRESOLVED);
        if seeded {
            return;
        }

        let width = width as Coord;
        let mut left: Coord = 0;
        let mut guess_i = 0;
        while left < width {
            let owner = self.owner_at(left, y);

            while guess_i + 1 < guesses.len() && guesses[guess_i] <= left {
                guess_i += 1;
            }

            // `low` is the furthest column known to belong to `owner`, `high` the nearest one known not to
            let mut low = left;
            let mut high = u32::from(width);
            loop {
                let guess = guesses[guess_i];
                if guess <= low {
                    break;
                }
                if self.owner_at(guess, y) == owner {
                    low = guess;
                    if guess_i + 1 < guesses.len() {
                        guess_i += 1;
                    } else {
                        break;
                    }
                } else {
                    high = guess.into();
                    break;
                }
            }

            while high - u32::from(low) > 1 {
                let mid = (u32::from(low) + high) / 2;
                let mid = mid as Coord;
                if self.owner_at(mid, y) == owner {
                    low = mid;
                } else {
                    high = mid.into();
                }
            }

            for x in left..=low {
                self.assignment[(x, y).to_nd_index()] = owner;
            }
            left = low + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::prelude::*;

    fn assert_exact(assignment: &Array2<CellId>, sites: &[Coord2], metric: Metric) {
        for ((x, y), &owner) in assignment.indexed_iter() {
            let point = (x as Coord, y as Coord);
            assert_eq!(
                owner,
                nearest_site(point, sites, metric),
                "{metric:?} at {point:?}"
            );
        }
    }

    #[test]
    fn guesses_step_by_cell_width_and_end_on_last_column() {
        // 100 x 25 with 4 cells: average cell is 25 x 25
        assert_eq!(border_guesses((100, 25), 4), [25, 50, 75, 99]);
        assert_eq!(border_guesses((1, 1), 1), [0]);
        assert_eq!(border_guesses((3, 40), 1), [2]);
    }

    #[test]
    fn auto_budget_counts_offsets_not_coordinates() {
        assert_eq!(SeedBudget::Auto.offsets((100, 100), 10), 4680);
        assert_eq!(SeedBudget::Auto.offsets((30, 30), 9), 468);
        assert_eq!(SeedBudget::Offsets(12).offsets((30, 30), 9), 12);
    }

    #[test]
    fn nearest_site_prefers_lowest_index_on_ties() {
        let sites = [(4, 0), (0, 0), (2, 4)];
        assert_eq!(nearest_site((2, 0), &sites, Metric::Euclidean), 0);
        assert_eq!(nearest_site((0, 1), &sites, Metric::Euclidean), 1);
    }

    #[test]
    fn seeding_alone_is_exact_with_ties() {
        // symmetric sites produce many equidistant points
        let sites = [(10, 10), (4, 10), (16, 10), (10, 4), (10, 16)];
        for metric in Metric::ALL {
            let mut assignment = Array2::from_elem([21, 21], UNRESOLVED);
            let lattice = Lattice::sorted(metric, 40);
            seed_expanding_rings(&mut assignment, &sites, metric, &lattice, usize::MAX);
            assert_exact(&assignment, &sites, metric);
        }
    }

    #[test]
    fn partition_is_exact_for_every_metric_and_budget() {
        let mut ctx = PartitionContext::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let size = (57, 41);
        let sites = sample_sites(&mut rng, 23, size, 1).unwrap();

        for metric in Metric::ALL {
            for budget in [
                SeedBudget::Auto,
                SeedBudget::Offsets(0),
                SeedBudget::Offsets(30),
            ] {
                let (assignment, _) = ctx.partition(&sites, size, metric, budget).unwrap();
                assert_exact(&assignment, &sites, metric);
                ctx.recycle(assignment);
            }
        }
    }

    #[test]
    fn row_search_needs_far_fewer_lookups_than_brute_force() {
        let mut ctx = PartitionContext::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let size = (200, 120);
        let sites = sample_sites(&mut rng, 40, size, 3).unwrap();

        let (_, stats) = ctx
            .partition(&sites, size, Metric::Euclidean, SeedBudget::Offsets(0))
            .unwrap();

        assert_eq!(stats.seeded, 0);
        assert!(stats.exact_lookups < 200 * 120 / 2, "{stats:?}");
    }

    #[test]
    fn single_site_owns_everything() {
        let mut ctx = PartitionContext::new();
        let (assignment, _) = ctx
            .partition(&[(3, 2)], (7, 5), Metric::Taxicab, SeedBudget::Auto)
            .unwrap();
        assert!(assignment.iter().all(|&owner| owner == 0));
    }

    #[test]
    fn recycled_buffer_is_reset() {
        let mut ctx = PartitionContext::new();
        ctx.recycle(Array2::from_elem([8, 8], 3));
        let sites = vec![(0, 0), (7, 7)];

        let (assignment, _) = ctx
            .partition(&sites, (8, 8), Metric::Euclidean, SeedBudget::Offsets(0))
            .unwrap();

        assert!(assignment.iter().all(|&owner| owner < 2));
        assert_exact(&assignment, &sites, Metric::Euclidean);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut ctx = PartitionContext::new();
        assert_eq!(
            ctx.partition(&[(0, 0)], (0, 4), Metric::Euclidean, SeedBudget::Auto)
                .unwrap_err(),
            GameError::InvalidRegion
        );
        assert_eq!(
            ctx.partition(&[], (4, 4), Metric::Euclidean, SeedBudget::Auto)
                .unwrap_err(),
            GameError::TooManyCells
        );
        assert_eq!(
            ctx.partition(&[(4, 0)], (4, 4), Metric::Euclidean, SeedBudget::Auto)
                .unwrap_err(),
            GameError::InvalidRegion
        );
    }
}
