use alloc::vec::Vec;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::*;

/// Farthest offset seeding reaches from a site; points beyond it are left to the row search.
pub const LATTICE_RADIUS: Delta = 127;

/// Integer offset from a site together with its distance value under the lattice metric.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticePoint {
    pub dx: Delta,
    pub dy: Delta,
    pub norm: u64,
}

impl LatticePoint {
    fn new(metric: Metric, dx: Delta, dy: Delta) -> Self {
        Self {
            dx,
            dy,
            norm: metric.norm(dx.into(), dy.into()),
        }
    }

    /// Quadrant `1..=4`, counter-clockwise starting from positive x, `0` for the origin.
    const fn quadrant(&self) -> u8 {
        let (x, y) = (self.dx, self.dy);
        if x > 0 && y >= 0 {
            1
        } else if x <= 0 && y > 0 {
            2
        } else if x < 0 && y <= 0 {
            3
        } else if x >= 0 && y < 0 {
            4
        } else {
            0
        }
    }

    /// Orders by distance, then quadrant, then counter-clockwise angle inside the quadrant.
    fn compare(&self, other: &Self) -> Ordering {
        self.norm
            .cmp(&other.norm)
            .then_with(|| self.quadrant().cmp(&other.quadrant()))
            .then_with(|| {
                let lhs = i64::from(self.dy) * i64::from(other.dx);
                let rhs = i64::from(other.dy) * i64::from(self.dx);
                lhs.cmp(&rhs)
            })
    }
}

/// All lattice offsets within a metric ball, sorted outward from the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    metric: Metric,
    radius: Delta,
    points: Vec<LatticePoint>,
}

impl Lattice {
    pub fn sorted(metric: Metric, radius: Delta) -> Self {
        let radius = radius.max(0);
        let r = i64::from(radius);
        let limit = metric.norm(r, 0);

        let mut points = Vec::new();
        for x in -radius..=radius {
            let max_y = max_offset_within(metric, i64::from(x), limit);
            for y in -max_y..=max_y {
                points.push(LatticePoint::new(metric, x, y));
            }
        }
        points.sort_by(LatticePoint::compare);

        Self {
            metric,
            radius,
            points,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn radius(&self) -> Delta {
        self.radius
    }

    pub fn points(&self) -> &[LatticePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest prefix length `>= len` that does not split a run of equal distances.
    pub fn complete_ring(&self, len: usize) -> usize {
        let len = len.min(self.points.len());
        match len.checked_sub(1).map(|last| self.points[last].norm) {
            Some(norm) => {
                len + self.points[len..]
                    .iter()
                    .take_while(|point| point.norm == norm)
                    .count()
            }
            None => 0,
        }
    }
}

/// Largest `y >= 0` such that `(x, y)` still lies inside the ball of distance `limit`.
fn max_offset_within(metric: Metric, x: i64, limit: u64) -> Delta {
    let x_part = metric.norm(x, 0);
    if x_part > limit {
        return -1;
    }
    let rest = limit - x_part;
    let y = match metric {
        Metric::Taxicab => rest,
        Metric::Euclidean => rest.isqrt(),
        Metric::Cubic => {
            let mut y = 0u64;
            while (y + 1).pow(3) <= rest {
                y += 1;
            }
            y
        }
    };
    y.try_into().unwrap_or(Delta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_starts_at_origin_and_is_sorted() {
        for metric in Metric::ALL {
            let lattice = Lattice::sorted(metric, 10);
            let first = lattice.points()[0];
            assert_eq!((first.dx, first.dy, first.norm), (0, 0, 0));
            assert!(
                lattice
                    .points()
                    .windows(2)
                    .all(|pair| pair[0].norm <= pair[1].norm)
            );
        }
    }

    #[test]
    fn lattice_covers_exactly_the_metric_ball() {
        for metric in Metric::ALL {
            let radius = 9;
            let limit = metric.norm(radius.into(), 0);
            let lattice = Lattice::sorted(metric, radius);

            let mut expected = 0;
            for x in -radius..=radius {
                for y in -radius..=radius {
                    if metric.norm(x.into(), y.into()) <= limit {
                        expected += 1;
                    }
                }
            }
            assert_eq!(lattice.len(), expected, "{metric:?}");
        }
    }

    #[test]
    fn equal_distances_are_ordered_counter_clockwise() {
        let lattice = Lattice::sorted(Metric::Euclidean, 3);
        let ring: Vec<_> = lattice.points()[1..5]
            .iter()
            .map(|point| (point.dx, point.dy))
            .collect();

        assert_eq!(ring, [(1, 0), (0, 1), (-1, 0), (0, -1)]);
    }

    #[test]
    fn taxicab_ring_of_two_walks_each_quadrant_in_turn() {
        let lattice = Lattice::sorted(Metric::Taxicab, 2);
        let ring: Vec<_> = lattice
            .points()
            .iter()
            .filter(|point| point.norm == 2)
            .map(|point| (point.dx, point.dy))
            .collect();

        assert_eq!(
            ring,
            [
                (2, 0),
                (1, 1),
                (0, 2),
                (-1, 1),
                (-2, 0),
                (-1, -1),
                (0, -2),
                (1, -1)
            ]
        );
    }

    #[test]
    fn sorting_is_deterministic() {
        assert_eq!(
            Lattice::sorted(Metric::Cubic, 20),
            Lattice::sorted(Metric::Cubic, 20)
        );
    }

    #[test]
    fn complete_ring_never_splits_equal_distances() {
        let lattice = Lattice::sorted(Metric::Euclidean, 5);
        // origin, then the four points at distance one
        assert_eq!(lattice.complete_ring(0), 0);
        assert_eq!(lattice.complete_ring(1), 1);
        assert_eq!(lattice.complete_ring(2), 5);
        assert_eq!(lattice.complete_ring(5), 5);
        assert_eq!(lattice.complete_ring(usize::MAX), lattice.len());
    }
}
