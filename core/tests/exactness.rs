use rand::prelude::*;
use voronoi_sweeper_core::*;

fn brute_force(sites: &[Coord2], size: Coord2, metric: Metric) -> Vec<CellId> {
    let mut owners = Vec::with_capacity(usize::from(size.0) * usize::from(size.1));
    for x in 0..size.0 {
        for y in 0..size.1 {
            owners.push(nearest_site((x, y), sites, metric));
        }
    }
    owners
}

#[test]
fn partition_matches_brute_force_on_larger_boards() {
    let mut ctx = PartitionContext::new();
    let size = (160, 100);
    for (seed, cells) in [(1, 40), (2, 120), (3, 400)] {
        for metric in Metric::ALL {
            let mut rng = SmallRng::seed_from_u64(seed);
            let sites = sample_sites(&mut rng, cells, size, 3).unwrap();
            let (assignment, _) = ctx
                .partition(&sites, size, metric, SeedBudget::Auto)
                .unwrap();

            let expected = brute_force(&sites, size, metric);
            let actual: Vec<CellId> = assignment.iter().copied().collect();
            assert_eq!(actual, expected, "{metric:?} with {cells} cells");
            ctx.recycle(assignment);
        }
    }
}

#[test]
fn row_search_alone_is_exact() {
    let mut ctx = PartitionContext::new();
    let size = (97, 61);
    let mut rng = SmallRng::seed_from_u64(77);
    let sites = sample_sites(&mut rng, 50, size, 3).unwrap();
    for metric in Metric::ALL {
        let (assignment, stats) = ctx
            .partition(&sites, size, metric, SeedBudget::Offsets(0))
            .unwrap();
        assert_eq!(
            assignment.iter().copied().collect::<Vec<_>>(),
            brute_force(&sites, size, metric)
        );
        assert!(stats.exact_lookups > 0);
    }
}

#[test]
fn generated_board_upholds_graph_properties() {
    let mut ctx = PartitionContext::new();
    let mut rng = SmallRng::seed_from_u64(2024);
    let config = GameConfig::new(120, 15, Metric::Euclidean);
    let surface = Bitmap::new((200, 150));
    let board = VoronoiCells::generate(&mut ctx, config.into(), &mut rng, surface).unwrap();

    assert_eq!(board.size(), 120);
    assert!(board.assignment().iter().all(|&owner| owner != UNRESOLVED));

    for id in 0..board.size() as CellId {
        let cell = board.cell(id).unwrap();
        assert_eq!(board.owner_at(cell.origin), Some(id));
        for &other in board.neighbors(id) {
            assert!(board.neighbors(other).contains(&id));
        }
    }

    let area: CellCount = board.cells().iter().map(|cell| cell.rows.area()).sum();
    assert_eq!(area, 200 * 150);
}

#[test]
fn nine_cell_game_has_one_mine() {
    let mut ctx = PartitionContext::new();
    let mut rng = SmallRng::seed_from_u64(9);
    let options = BoardOptions::new(9, Metric::Euclidean);
    let board = VoronoiCells::generate(&mut ctx, options, &mut rng, Bitmap::new((30, 30))).unwrap();
    let game = Minesweeper::new(board, 20, 9);

    assert_eq!(game.mine_count(), 1);
    let mine = game
        .tiles()
        .iter()
        .position(|tile| tile.has_mine)
        .unwrap() as CellId;
    for id in 0..9 {
        let expected = u8::from(game.graph().neighbors(id).contains(&mine));
        assert_eq!(game.tile(id).unwrap().adjacent_mines, expected);
    }
}

#[test]
fn full_game_on_a_voronoi_board() {
    let mut ctx = PartitionContext::new();
    let mut rng = SmallRng::seed_from_u64(31);
    let options = BoardOptions::new(60, Metric::Taxicab);
    let surface = Bitmap::new((120, 90));
    let board = VoronoiCells::generate(&mut ctx, options, &mut rng, surface).unwrap();
    let mut game = Minesweeper::new(board, 15, 31);

    // mines are skipped, so the first reveal never needs relocation
    let mut outcome = RevealOutcome::NoChange;
    for id in 0..game.graph().size() as CellId {
        if game.is_finished() {
            break;
        }
        let tile = game.tile(id).unwrap();
        if tile.has_mine || tile.revealed {
            continue;
        }
        outcome = outcome | game.reveal(id).unwrap();
    }

    assert_eq!(outcome, RevealOutcome::Won);
    assert_eq!(game.state(), EngineState::Won);
    assert_eq!(game.tiles_left(), 0);
    assert_eq!(game.reveal(0), Err(GameError::AlreadyEnded));

    let board = game.into_graph();
    let revealed_pixels = board
        .surface()
        .pixels()
        .iter()
        .filter(|&&color| color == Rgb::REVEALED)
        .count();
    assert!(revealed_pixels > 0);
}

fn small_board(seed: u64) -> VoronoiCells<Bitmap> {
    let mut ctx = PartitionContext::new();
    let mut rng = SmallRng::seed_from_u64(seed);
    let options = BoardOptions::new(24, Metric::Euclidean);
    VoronoiCells::generate(&mut ctx, options, &mut rng, Bitmap::new((72, 48))).unwrap()
}

#[test]
fn first_reveal_of_any_cell_never_loses() {
    let cells = small_board(17).size();
    for id in 0..cells as CellId {
        let mut game = Minesweeper::new(small_board(17), 60, u64::from(id));
        let was_mined = game.tile(id).unwrap().has_mine;

        let outcome = game.reveal(id).unwrap();

        assert_ne!(outcome, RevealOutcome::HitMine, "cell {id}");
        assert_ne!(game.state(), EngineState::Lost);
        let tile = game.tile(id).unwrap();
        assert!(tile.revealed && !tile.has_mine, "cell {id}, mined before: {was_mined}");
        assert_eq!(
            game.tiles().iter().filter(|tile| tile.has_mine).count() as CellCount,
            game.mine_count()
        );
    }
}

#[test]
fn first_reveal_moves_the_mine_to_the_only_free_cell() {
    let board = small_board(3);
    let last = board.size() as CellId - 1;
    let mines: Vec<CellId> = (0..last).collect();
    let layout = MineLayout::from_mine_ids(board.size(), &mines).unwrap();
    let mut game = Minesweeper::with_layout(board, layout, 0).unwrap();

    assert_ne!(game.reveal(0).unwrap(), RevealOutcome::HitMine);
    assert!(!game.tile(0).unwrap().has_mine);
    assert!(game.tile(last).unwrap().has_mine);
    assert_eq!(game.state(), EngineState::Won);
}
