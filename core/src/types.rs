use serde::{Deserialize, Serialize};

/// Single raster axis used for region width, height, and positions.
pub type Coord = u16;

/// Signed offset along one raster axis.
pub type Delta = i16;

/// Two-dimensional raster coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Stable index of a site, which is also the id of its Minesweeper cell.
pub type CellId = u16;

/// Count type used for cell counts, mine counts and pixel counts.
pub type CellCount = u32;

/// Marker stored in the assignment map for points that have no owner yet.
pub const UNRESOLVED: CellId = CellId::MAX;

/// Largest number of cells a board may hold, one less than the unresolved marker.
pub const MAX_CELLS: CellCount = UNRESOLVED as CellCount;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Packs two coordinates into one integer, used as a cheap set key.
pub const fn pair((x, y): Coord2) -> u32 {
    ((x as u32) << 16) | y as u32
}

pub const fn unpair(n: u32) -> Coord2 {
    ((n >> 16) as Coord, (n & 0xffff) as Coord)
}

/// Distance function used consistently throughout partitioning.
///
/// All three are monotone transforms of a norm, so only comparisons are meaningful: taxicab is
/// `|dx| + |dy|`, Euclidean is the squared length and cubic is `|dx|³ + |dy|³`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Taxicab,
    #[default]
    Euclidean,
    Cubic,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Taxicab, Metric::Euclidean, Metric::Cubic];

    /// Maps the numeric selector `1`, `2` or `3`; anything else falls back to Euclidean.
    pub const fn from_selector(selector: u8) -> Self {
        match selector {
            1 => Self::Taxicab,
            3 => Self::Cubic,
            _ => Self::Euclidean,
        }
    }

    pub const fn selector(self) -> u8 {
        match self {
            Self::Taxicab => 1,
            Self::Euclidean => 2,
            Self::Cubic => 3,
        }
    }

    /// Distance value of the offset `(dx, dy)` from the origin.
    pub const fn norm(self, dx: i64, dy: i64) -> u64 {
        let dx = dx.unsigned_abs();
        let dy = dy.unsigned_abs();
        match self {
            Self::Taxicab => dx + dy,
            Self::Euclidean => dx * dx + dy * dy,
            Self::Cubic => dx * dx * dx + dy * dy * dy,
        }
    }

    pub const fn distance(self, a: Coord2, b: Coord2) -> u64 {
        self.norm(a.0 as i64 - b.0 as i64, a.1 as i64 - b.1 as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_round_trips_extreme_coords() {
        for coords in [(0, 0), (Coord::MAX, 0), (0, Coord::MAX), (1234, 4321)] {
            assert_eq!(unpair(pair(coords)), coords);
        }
        assert_ne!(pair((1, 0)), pair((0, 1)));
    }

    #[test]
    fn metrics_match_their_formulas() {
        assert_eq!(Metric::Taxicab.distance((1, 1), (4, 5)), 7);
        assert_eq!(Metric::Euclidean.distance((1, 1), (4, 5)), 25);
        assert_eq!(Metric::Cubic.distance((1, 1), (4, 5)), 27 + 64);
    }

    #[test]
    fn selector_falls_back_to_euclidean() {
        assert_eq!(Metric::from_selector(1), Metric::Taxicab);
        assert_eq!(Metric::from_selector(3), Metric::Cubic);
        assert_eq!(Metric::from_selector(0), Metric::Euclidean);
        assert_eq!(Metric::from_selector(9), Metric::Euclidean);
        for metric in Metric::ALL {
            assert_eq!(Metric::from_selector(metric.selector()), metric);
        }
    }
}
