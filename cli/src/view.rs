use voronoi_sweeper_core::{
    self as game, CellGraph, CellId, Coord, Label, Minesweeper, Surface, Tile, VoronoiCells,
};

pub type Engine<S> = Minesweeper<VoronoiCells<S>>;

fn fill(tile: Tile) -> char {
    match (tile.revealed, tile.hovered) {
        (true, _) => ' ',
        (false, true) => '+',
        (false, false) => '#',
    }
}

fn glyph(label: Label) -> char {
    match label {
        Label::Mine => '*',
        Label::Flag => 'F',
        Label::Count(count) => char::from_digit(u32::from(count), 10).unwrap_or('+'),
    }
}

/// Text rendering of the board, sampling one pixel per character with labels on top.
///
/// Characters are roughly twice as tall as wide, so rows are sampled at half the horizontal density.
pub fn draw<S: Surface>(engine: &Engine<S>, columns: usize) -> String {
    let board = engine.graph();
    let (width, height) = board.surface().size();
    let (width, height) = (usize::from(width), usize::from(height));
    let columns = columns.clamp(1, width);
    let rows = (columns * height / width / 2).max(1);

    let mut grid = vec![vec![' '; columns]; rows];
    for (row, line) in grid.iter_mut().enumerate() {
        for (column, ch) in line.iter_mut().enumerate() {
            let x = (column * width / columns) as Coord;
            let y = (row * height / rows) as Coord;
            if let Some(tile) = board.owner_at((x, y)).and_then(|id| engine.tile(id).ok()) {
                *ch = fill(tile);
            }
        }
    }

    for (id, cell) in board.cells().iter().enumerate() {
        let (Some((x, y)), Ok(tile)) = (cell.centroid, engine.tile(id as CellId)) else {
            continue;
        };
        let Some(label) = tile.label() else {
            continue;
        };
        let column = usize::from(x) * columns / width;
        let row = usize::from(y) * rows / height;
        if let Some(ch) = grid.get_mut(row).and_then(|line| line.get_mut(column)) {
            *ch = glyph(label);
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status<S: Surface>(engine: &Engine<S>) -> String {
    let state = match engine.state() {
        game::EngineState::InProgress => "playing",
        game::EngineState::Won => "won",
        game::EngineState::Lost => "lost",
    };
    let mut line = format!(
        "{} | cells: {} | mines left: {} | tiles left: {}",
        state,
        engine.graph().size(),
        engine.mines_left(),
        engine.tiles_left()
    );
    if let Some(id) = engine.hovered() {
        let hint = if engine.can_reveal(id) { "revealable" } else { "-" };
        line.push_str(&format!(" | hover: {} ({})", id, hint));
    }
    if let Some(id) = engine.triggered_mine() {
        line.push_str(&format!(" | mine hit at {}", id));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use game::{Bitmap, BoardOptions, Metric, PartitionContext};
    use rand::prelude::*;

    fn engine() -> Engine<Bitmap> {
        let mut ctx = PartitionContext::new();
        let mut rng = SmallRng::seed_from_u64(4);
        let options = BoardOptions::new(12, Metric::Euclidean);
        let surface = Bitmap::new((80, 40));
        let board = VoronoiCells::generate(&mut ctx, options, &mut rng, surface).unwrap();
        Minesweeper::new(board, 15, 4)
    }

    #[test]
    fn glyphs() {
        assert_eq!(glyph(Label::Count(3)), '3');
        assert_eq!(glyph(Label::Count(9)), '9');
        assert_eq!(glyph(Label::Count(12)), '+');
        assert_eq!(glyph(Label::Flag), 'F');
        assert_eq!(fill(Tile::default()), '#');
    }

    #[test]
    fn fresh_board_is_all_concealed() {
        let engine = engine();
        let text = draw(&engine, 40);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|line| line.chars().count() == 40));
        assert!(lines.iter().all(|line| line.chars().all(|ch| ch == '#')));
        assert!(status(&engine).starts_with("playing | cells: 12"));
    }
}
