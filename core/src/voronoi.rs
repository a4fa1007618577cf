use alloc::string::ToString;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Sites sit on multiples of this spacing so that no two of them touch.
pub const DEFAULT_SPACING: Coord = 3;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardOptions {
    pub cell_count: CellCount,
    pub metric: Metric,
    pub spacing: Coord,
    pub confirmations: u8,
    #[serde(skip)]
    pub seed_budget: SeedBudget,
}

impl BoardOptions {
    pub fn new(cell_count: CellCount, metric: Metric) -> Self {
        Self {
            cell_count,
            metric,
            spacing: DEFAULT_SPACING,
            confirmations: DEFAULT_CONFIRMATIONS,
            seed_budget: SeedBudget::Auto,
        }
    }
}

impl From<GameConfig> for BoardOptions {
    fn from(config: GameConfig) -> Self {
        Self::new(config.cell_count, config.metric)
    }
}

/// Board whose cells are the approximate Voronoi regions of randomly scattered sites on a raster surface.
#[derive(Debug)]
pub struct VoronoiCells<S: Surface = Bitmap> {
    surface: S,
    metric: Metric,
    cells: Vec<Cell>,
    assignment: Array2<CellId>,
    borders: Array2<bool>,
    stats: PartitionStats,
    centroids_ready: bool,
}

impl<S: Surface> VoronoiCells<S> {
    /// Scatters sites over the whole surface and partitions it.
    pub fn generate(
        ctx: &mut PartitionContext,
        options: BoardOptions,
        rng: &mut SmallRng,
        surface: S,
    ) -> Result<Self> {
        let sites = sample_sites(rng, options.cell_count, surface.size(), options.spacing)?;
        Self::from_sites(ctx, options, sites, surface)
    }

    /// Partitions the surface around the given sites; `options.cell_count` and `options.spacing` are ignored.
    pub fn from_sites(
        ctx: &mut PartitionContext,
        options: BoardOptions,
        sites: Vec<Coord2>,
        mut surface: S,
    ) -> Result<Self> {
        let start = Instant::now();
        let size = surface.size();
        let (assignment, stats) = ctx.partition(&sites, size, options.metric, options.seed_budget)?;

        let Adjacency { borders, neighbors } =
            extract_adjacency(&assignment, sites.len(), options.confirmations);
        let rows = collect_rows(&assignment, sites.len());
        let cells = sites
            .into_iter()
            .zip(neighbors)
            .zip(rows)
            .map(|((origin, neighbors), rows)| Cell {
                neighbors,
                rows,
                ..Cell::new(origin)
            })
            .collect();

        for ((x, y), _) in borders.indexed_iter().filter(|&(_, &border)| border) {
            surface.set_pixel((x as Coord, y as Coord), Rgb::BORDER);
        }
        surface.repaint();

        log::debug!("initial render: {:?}", start.elapsed());
        Ok(Self {
            surface,
            metric: options.metric,
            cells,
            assignment,
            borders,
            stats,
            centroids_ready: false,
        })
    }

    /// Runs the work that only matters for label placement.
    pub fn finish_deferred(&mut self) {
        if self.centroids_ready {
            return;
        }
        let start = Instant::now();
        for cell in &mut self.cells {
            cell.centroid = cell.rows.centroid();
        }
        self.centroids_ready = true;
        log::debug!("calculated centroids in {:?}", start.elapsed());
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn stats(&self) -> PartitionStats {
        self.stats
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(usize::from(id))
    }

    pub fn assignment(&self) -> &Array2<CellId> {
        &self.assignment
    }

    pub fn owner_at(&self, point: Coord2) -> Option<CellId> {
        self.assignment.get(point.to_nd_index()).copied()
    }

    pub fn is_border(&self, point: Coord2) -> bool {
        self.borders
            .get(point.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Gives the surface back and returns the assignment buffer to `ctx` for reuse.
    pub fn recycle(self, ctx: &mut PartitionContext) -> S {
        ctx.recycle(self.assignment);
        self.surface
    }
}

impl<S: Surface> CellGraph for VoronoiCells<S> {
    fn size(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    fn neighbors(&self, id: CellId) -> &[CellId] {
        self.cells
            .get(usize::from(id))
            .map(|cell| cell.neighbors.as_slice())
            .unwrap_or(&[])
    }

    fn cell_at(&self, (x, y): (i32, i32)) -> Option<CellId> {
        let x = Coord::try_from(x).ok()?;
        let y = Coord::try_from(y).ok()?;
        self.owner_at((x, y))
    }

    fn render(&mut self, cells: &[CellPaint]) {
        for paint in cells {
            let Some(cell) = self.cells.get(usize::from(paint.id)) else {
                log::warn!("render of unknown cell {}", paint.id);
                continue;
            };
            for (y, span) in cell.rows.iter() {
                for x in span.left..=span.right {
                    if !self.borders[(x, y).to_nd_index()] {
                        self.surface.set_pixel((x, y), paint.color);
                    }
                }
            }
        }
        self.surface.repaint();

        if !self.centroids_ready {
            self.finish_deferred();
        }
        for paint in cells {
            let Some(at) = self.cell(paint.id).and_then(|cell| cell.centroid) else {
                continue;
            };
            let text = paint.label.map(|label| label.to_string()).unwrap_or_default();
            self.surface.fill_text(&text, paint.label_color, at);
        }
    }

    fn attach(&mut self) {
        self.surface.attach();
    }
}
