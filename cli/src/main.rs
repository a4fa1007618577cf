use anyhow::{Context, Result};
use chrono::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use rand::prelude::*;
use std::path::PathBuf;
use voronoi_sweeper_core as game;

mod export;
mod play;
mod scores;
mod view;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MetricArg {
    #[value(alias = "1")]
    Taxicab,
    #[value(alias = "2")]
    Euclidean,
    #[value(alias = "3")]
    Cubic,
}

impl From<MetricArg> for game::Metric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Taxicab => Self::Taxicab,
            MetricArg::Euclidean => Self::Euclidean,
            MetricArg::Cubic => Self::Cubic,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Board width in pixels
    #[arg(long, default_value_t = 800)]
    width: game::Coord,

    /// Board height in pixels
    #[arg(long, default_value_t = 600)]
    height: game::Coord,

    /// Number of cells
    #[arg(short, long, default_value_t = 200)]
    cells: game::CellCount,

    /// Percentage of cells holding a mine
    #[arg(short, long, default_value_t = 15)]
    density: u8,

    /// Distance used to partition the board
    #[arg(short, long, value_enum, default_value_t = MetricArg::Euclidean)]
    metric: MetricArg,

    /// High score file
    #[arg(long, default_value = "voronoi-sweeper-scores.json")]
    scores: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play on stdin, one command per line
    Play {
        /// Name stored with a winning time
        #[arg(short, long)]
        name: Option<String>,

        /// Width of the text view in characters
        #[arg(long, default_value_t = 100)]
        columns: usize,
    },
    /// Write the partitioned board to a PNG file
    Render {
        #[arg(short, long, default_value = "board.png")]
        output: PathBuf,

        /// Reveal every cell before exporting
        #[arg(long)]
        reveal: bool,
    },
    /// Print the best times for the configured board
    Scores,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = game::GameConfig::new(args.cells, args.density, args.metric.into());
    if config.cell_count != args.cells || config.density != args.density {
        log::warn!(
            "clamped configuration to {} cells at {}% density",
            config.cell_count,
            config.density
        );
    }

    if let Command::Scores = args.command {
        let table = scores::load(&args.scores)?;
        scores::print(&table, &config);
        return Ok(());
    }

    let seed = args
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);
    log::info!("seed: {}", seed);

    let mut ctx = game::PartitionContext::new();
    let mut rng = SmallRng::seed_from_u64(seed);
    let surface = game::Bitmap::new((args.width, args.height));
    let board = game::VoronoiCells::generate(&mut ctx, config.into(), &mut rng, surface)
        .context("could not build the board")?;
    let stats = board.stats();
    log::debug!(
        "{} points seeded, {} exact lookups",
        stats.seeded,
        stats.exact_lookups
    );
    let mut engine = game::Minesweeper::new(board, config.density, seed);

    match args.command {
        Command::Play { name, columns } => {
            let mut session = play::Session::new(engine, config, columns);
            session.run(std::io::stdin().lock(), name.as_deref(), &args.scores)
        }
        Command::Render { output, reveal } => {
            if reveal {
                export::reveal_everything(&mut engine);
            }
            export::save_png(engine.graph().surface(), &output)?;
            println!("saved {}", output.display());
            Ok(())
        }
        Command::Scores => Ok(()),
    }
}
