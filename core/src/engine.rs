use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Minesweeper rules played over any [`CellGraph`].
///
/// The engine owns the graph for the whole session and repaints every cell whose visual state changes.
#[derive(Debug)]
pub struct Minesweeper<G> {
    graph: G,
    tiles: Vec<Tile>,
    mine_count: CellCount,
    flag_count: CellCount,
    tiles_left: CellCount,
    state: EngineState,
    first_move: bool,
    triggered_mine: Option<CellId>,
    hovered: Option<CellId>,
    hover_pending: bool,
    rng: SmallRng,
}

impl<G: CellGraph> Minesweeper<G> {
    /// Starts a session with `density` percent of the cells mined.
    pub fn new(graph: G, density: u8, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let total_cells = graph.size();
        let mines = MineLayout::mine_count_for(total_cells, density);
        let layout = MineLayout::random(total_cells, mines, &mut rng);
        Self::build(graph, layout, rng)
    }

    /// Starts a session with a fixed layout; `seed` drives first-move mine relocation.
    pub fn with_layout(graph: G, layout: MineLayout, seed: u64) -> Result<Self> {
        if layout.total_cells() != graph.size() || layout.safe_cell_count() == 0 {
            return Err(GameError::InvalidLayout);
        }
        Ok(Self::build(graph, layout, SmallRng::seed_from_u64(seed)))
    }

    fn build(mut graph: G, layout: MineLayout, rng: SmallRng) -> Self {
        let start = Instant::now();
        graph.attach();
        let total_cells = graph.size();
        let mut tiles: Vec<Tile> = (0..total_cells)
            .map(|id| Tile {
                has_mine: layout.contains_mine(id as CellId),
                ..Default::default()
            })
            .collect();
        for id in 0..tiles.len() {
            let count = graph
                .neighbors(id as CellId)
                .iter()
                .filter(|&&other| tiles[usize::from(other)].has_mine)
                .count();
            tiles[id].adjacent_mines = count.try_into().unwrap_or(u8::MAX);
        }

        let mut engine = Self {
            graph,
            tiles,
            mine_count: layout.mine_count(),
            flag_count: 0,
            tiles_left: layout.safe_cell_count(),
            state: EngineState::default(),
            first_move: true,
            triggered_mine: None,
            hovered: None,
            hover_pending: false,
            rng,
        };
        engine.render_all();
        log::debug!(
            "initialized game of {} cells and {} mines in {:?}",
            total_cells,
            engine.mine_count,
            start.elapsed()
        );
        engine
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn into_graph(self) -> G {
        self.graph
    }

    pub fn tile(&self, id: CellId) -> Result<Tile> {
        self.tiles
            .get(usize::from(id))
            .copied()
            .ok_or(GameError::InvalidCellId)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn mines_left(&self) -> i64 {
        i64::from(self.mine_count) - i64::from(self.flag_count)
    }

    pub fn tiles_left(&self) -> CellCount {
        self.tiles_left
    }

    pub fn triggered_mine(&self) -> Option<CellId> {
        self.triggered_mine
    }

    pub fn hovered(&self) -> Option<CellId> {
        self.hovered
    }

    /// Whether a plain click on `id` would do anything, used for the pointer cursor.
    pub fn can_reveal(&self, id: CellId) -> bool {
        !self.is_finished()
            && self
                .tiles
                .get(usize::from(id))
                .is_some_and(|tile| tile.is_concealed() && !tile.flagged)
    }

    pub fn render_all(&mut self) {
        let ids: Vec<CellId> = (0..self.tiles.len()).map(|id| id as CellId).collect();
        self.render_ids(&ids);
    }

    pub fn toggle_flag(&mut self, id: CellId) -> Result<MarkOutcome> {
        let id = self.validate(id)?;
        self.check_not_finished()?;

        let tile = &mut self.tiles[usize::from(id)];
        if tile.revealed {
            return Ok(MarkOutcome::NoChange);
        }
        tile.flagged = !tile.flagged;
        if tile.flagged {
            self.flag_count += 1;
        } else {
            self.flag_count -= 1;
        }
        self.render_ids(&[id]);
        Ok(MarkOutcome::Changed)
    }

    pub fn reveal(&mut self, id: CellId) -> Result<RevealOutcome> {
        let id = self.validate(id)?;
        self.check_not_finished()?;

        let tile = self.tiles[usize::from(id)];
        if tile.revealed || tile.flagged {
            return Ok(RevealOutcome::NoChange);
        }

        if tile.has_mine && !(self.first_move && self.relocate_mine(id)) {
            self.tiles[usize::from(id)].revealed = true;
            self.triggered_mine = Some(id);
            self.state = EngineState::Lost;
            self.render_ids(&[id]);
            log::debug!("mine hit at cell {}", id);
            return Ok(RevealOutcome::HitMine);
        }
        self.first_move = false;

        let updated = self.flood_reveal(id);
        self.render_ids(&updated);

        if self.tiles_left == 0 {
            self.state = EngineState::Won;
            log::debug!("board cleared");
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Highlights `id` and its neighbors, repainting only cells whose highlight actually changes.
    ///
    /// Ignored once the board is finished or while the previous hover has not been committed.
    pub fn hover(&mut self, id: CellId) -> Result<MarkOutcome> {
        let id = self.validate(id)?;
        if self.is_finished() || self.hover_pending || self.hovered == Some(id) {
            return Ok(MarkOutcome::NoChange);
        }

        let old = self.highlight_set(self.hovered);
        let new = self.highlight_set(Some(id));
        for &other in &old {
            self.tiles[usize::from(other)].hovered = false;
        }
        for &other in &new {
            self.tiles[usize::from(other)].hovered = true;
        }

        let changed: Vec<CellId> = old.symmetric_difference(&new).copied().collect();
        self.hovered = Some(id);
        self.hover_pending = true;
        self.render_ids(&changed);
        Ok(MarkOutcome::Changed)
    }

    /// Drops the highlight when the pointer leaves the board.
    pub fn leave(&mut self) -> MarkOutcome {
        let Some(previous) = self.hovered.take() else {
            return MarkOutcome::NoChange;
        };
        let old: Vec<CellId> = self.highlight_set(Some(previous)).into_iter().collect();
        for &other in &old {
            self.tiles[usize::from(other)].hovered = false;
        }
        self.render_ids(&old);
        MarkOutcome::Changed
    }

    /// Called once the display has shown the last hover, allowing the next one.
    pub fn commit_frame(&mut self) {
        self.hover_pending = false;
    }

    /// Routes a raw pointer event through the graph's hit testing.
    ///
    /// Returns whether anything was repainted. Pointer-downs on a finished board are ignored.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<bool> {
        let CellEvent { event, cell } = self.graph.locate(event);
        log::trace!("{:?} on cell {:?}", event.kind, cell);

        match (event.kind, cell) {
            (PointerKind::Leave, _) => Ok(self.leave().has_update()),
            (_, None) => Ok(false),
            (PointerKind::Move, Some(id)) => Ok(self.hover(id)?.has_update()),
            (PointerKind::Down, Some(_)) if self.is_finished() => Ok(false),
            (PointerKind::Down, Some(id)) if event.is_flag_gesture() => {
                Ok(self.toggle_flag(id)?.has_update())
            }
            (PointerKind::Down, Some(id)) => Ok(self.reveal(id)?.has_update()),
        }
    }

    /// Reveals `start` and keeps opening through cells with no adjacent mines.
    ///
    /// Every cell is pushed at most once, so cycles in the graph cannot cause repeats.
    fn flood_reveal(&mut self, start: CellId) -> Vec<CellId> {
        let mut updated = Vec::new();
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = vec![start];

        while let Some(id) = to_visit.pop() {
            let tile = &mut self.tiles[usize::from(id)];
            if tile.revealed {
                continue;
            }
            if tile.flagged {
                tile.flagged = false;
                self.flag_count -= 1;
            }
            tile.revealed = true;
            self.tiles_left -= 1;
            updated.push(id);

            if tile.adjacent_mines == 0 {
                for &other in self.graph.neighbors(id) {
                    if visited.insert(other) {
                        to_visit.push(other);
                    }
                }
            }
        }
        updated
    }

    /// Moves the mine under `from` to a uniformly chosen mine-free cell and fixes up the counts.
    ///
    /// Returns `false` when there is no free cell to move it to.
    fn relocate_mine(&mut self, from: CellId) -> bool {
        let free_cells = self.tiles.len().saturating_sub(self.mine_count as usize);
        if free_cells == 0 {
            log::warn!("no free cell to move the mine at {} to", from);
            return false;
        }
        let pick = self.rng.random_range(0..free_cells);
        let Some(to) = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.has_mine)
            .nth(pick)
            .map(|(id, _)| id as CellId)
        else {
            return false;
        };

        self.tiles[usize::from(to)].has_mine = true;
        for &other in self.graph.neighbors(to) {
            let count = &mut self.tiles[usize::from(other)].adjacent_mines;
            *count = count.saturating_add(1);
        }
        self.tiles[usize::from(from)].has_mine = false;
        for &other in self.graph.neighbors(from) {
            let count = &mut self.tiles[usize::from(other)].adjacent_mines;
            *count = count.saturating_sub(1);
        }
        log::debug!("first move: moved mine from cell {} to cell {}", from, to);
        true
    }

    fn highlight_set(&self, center: Option<CellId>) -> BTreeSet<CellId> {
        let mut cells = BTreeSet::new();
        if let Some(center) = center {
            cells.insert(center);
            cells.extend(self.graph.neighbors(center).iter().copied());
        }
        cells
    }

    fn render_ids(&mut self, ids: &[CellId]) {
        if ids.is_empty() {
            return;
        }
        let paints: Vec<CellPaint> = ids
            .iter()
            .map(|&id| self.tiles[usize::from(id)].paint(id))
            .collect();
        self.graph.render(&paints);
    }

    fn validate(&self, id: CellId) -> Result<CellId> {
        if usize::from(id) < self.tiles.len() {
            Ok(id)
        } else {
            Err(GameError::InvalidCellId)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
