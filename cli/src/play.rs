use anyhow::{Context, Result, bail};
use chrono::prelude::*;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;
use std::str::SplitWhitespace;
use voronoi_sweeper_core::{
    CellId, EngineState, GameConfig, PointerButtons, PointerEvent, Score, Surface,
};

use crate::scores;
use crate::view::{self, Engine};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Reveal(CellId),
    Flag(CellId),
    Click { x: i32, y: i32, flag: bool },
    Hover { x: i32, y: i32 },
    Leave,
    Quit,
}

impl Input {
    const fn is_move(self) -> bool {
        matches!(
            self,
            Self::Reveal(_) | Self::Flag(_) | Self::Click { .. }
        )
    }
}

fn arg<T>(words: &mut SplitWhitespace<'_>, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    words
        .next()
        .with_context(|| format!("missing {what}"))?
        .parse()
        .with_context(|| format!("invalid {what}"))
}

impl FromStr for Input {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().context("empty command")?;
        let input = match command {
            "r" | "reveal" => Self::Reveal(arg(&mut words, "cell id")?),
            "f" | "flag" => Self::Flag(arg(&mut words, "cell id")?),
            "click" => {
                let x = arg(&mut words, "x")?;
                let y = arg(&mut words, "y")?;
                let flag = match words.next() {
                    None => false,
                    Some("right") => true,
                    Some(other) => bail!("unknown button {other:?}"),
                };
                Self::Click { x, y, flag }
            }
            "hover" => Self::Hover {
                x: arg(&mut words, "x")?,
                y: arg(&mut words, "y")?,
            },
            "leave" => Self::Leave,
            "q" | "quit" => Self::Quit,
            other => bail!("unknown command {other:?}"),
        };
        Ok(input)
    }
}

pub struct Session<S: Surface> {
    engine: Engine<S>,
    config: GameConfig,
    columns: usize,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    move_count: u32,
}

impl<S: Surface> Session<S> {
    pub fn new(engine: Engine<S>, config: GameConfig, columns: usize) -> Self {
        Self {
            engine,
            config,
            columns,
            started_at: None,
            ended_at: None,
            move_count: 0,
        }
    }

    /// Applies one input and returns whether the board changed.
    pub fn apply(&mut self, input: Input) -> Result<bool> {
        if input.is_move() && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        let changed = match input {
            Input::Reveal(id) => self.engine.reveal(id)?.has_update(),
            Input::Flag(id) => self.engine.toggle_flag(id)?.has_update(),
            Input::Click { x, y, flag } => {
                let button = if flag {
                    PointerButtons::RIGHT
                } else {
                    PointerButtons::LEFT
                };
                self.engine.handle_event(PointerEvent::down((x, y), button))?
            }
            Input::Hover { x, y } => self.engine.handle_event(PointerEvent::moved((x, y)))?,
            Input::Leave => self.engine.handle_event(PointerEvent::leave())?,
            Input::Quit => false,
        };
        if changed && input.is_move() {
            self.move_count += 1;
        }
        if self.engine.is_finished() && self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }
        Ok(changed)
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        let started_at = self.started_at?;
        let ended_at = self.ended_at.unwrap_or_else(Utc::now);
        Some((ended_at - started_at).num_milliseconds().max(0) as u64)
    }

    fn show(&mut self) {
        println!("{}", view::draw(&self.engine, self.columns));
        println!("{}", view::status(&self.engine));
        self.engine.commit_frame();
    }

    pub fn run(
        &mut self,
        input: impl BufRead,
        name: Option<&str>,
        scores_path: &Path,
    ) -> Result<()> {
        self.show();
        for line in input.lines() {
            let line = line.context("could not read input")?;
            if line.trim().is_empty() {
                continue;
            }
            let input = match line.parse::<Input>() {
                Ok(input) => input,
                Err(err) => {
                    eprintln!("{err:#}");
                    continue;
                }
            };
            if input == Input::Quit {
                break;
            }

            let was_finished = self.engine.is_finished();
            match self.apply(input) {
                Ok(true) => self.show(),
                Ok(false) => {}
                Err(err) => eprintln!("{err:#}"),
            }
            if !was_finished && self.engine.is_finished() {
                self.finish(name, scores_path)?;
            }
        }
        Ok(())
    }

    fn finish(&self, name: Option<&str>, scores_path: &Path) -> Result<()> {
        let elapsed = self.elapsed_ms().unwrap_or_default();
        log::info!("game over after {} moves and {}ms", self.move_count, elapsed);
        if self.engine.state() != EngineState::Won {
            println!("boom");
            return Ok(());
        }
        println!("cleared in {:.3}s", elapsed as f64 / 1000.0);

        let date = self.ended_at.unwrap_or_else(Utc::now).timestamp_millis() as u64;
        let mut table = scores::load(scores_path)?;
        match table.insert(
            self.config.cell_count,
            self.config.density,
            Score::new(elapsed, date, name),
        ) {
            Some(rank) => {
                println!("new high score, rank {}", rank + 1);
                scores::save(&table, scores_path)?;
            }
            None => println!("no high score this time"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use voronoi_sweeper_core::{
        Bitmap, BoardOptions, Metric, Minesweeper, PartitionContext, VoronoiCells,
    };

    fn session() -> Session<Bitmap> {
        let mut ctx = PartitionContext::new();
        let mut rng = SmallRng::seed_from_u64(12);
        let config = GameConfig::new(20, 10, Metric::Euclidean);
        let board = VoronoiCells::generate(
            &mut ctx,
            BoardOptions::from(config),
            &mut rng,
            Bitmap::new((100, 60)),
        )
        .unwrap();
        Session::new(Minesweeper::new(board, config.density, 12), config, 50)
    }

    #[test]
    fn parse_commands() {
        assert_eq!("r 4".parse::<Input>().unwrap(), Input::Reveal(4));
        assert_eq!("flag 7".parse::<Input>().unwrap(), Input::Flag(7));
        assert_eq!(
            "click 3 9 right".parse::<Input>().unwrap(),
            Input::Click { x: 3, y: 9, flag: true }
        );
        assert_eq!(
            "hover -1 2".parse::<Input>().unwrap(),
            Input::Hover { x: -1, y: 2 }
        );
        assert_eq!("q".parse::<Input>().unwrap(), Input::Quit);
        assert!("r".parse::<Input>().is_err());
        assert!("r x".parse::<Input>().is_err());
        assert!("click 1 2 middle".parse::<Input>().is_err());
        assert!("dance".parse::<Input>().is_err());
    }

    #[test]
    fn timer_starts_on_first_move() {
        let mut session = session();
        assert!(session.apply(Input::Hover { x: 5, y: 5 }).unwrap());
        assert_eq!(session.elapsed_ms(), None);

        assert!(session.apply(Input::Flag(0)).unwrap());
        assert!(session.elapsed_ms().is_some());
        assert_eq!(session.move_count, 1);
    }

    #[test]
    fn clicks_outside_the_board_do_nothing() {
        let mut session = session();
        assert!(!session.apply(Input::Click { x: 500, y: 5, flag: false }).unwrap());
        assert!(session.apply(Input::Click { x: 5, y: 5, flag: true }).unwrap());
        let id = session.engine.graph().owner_at((5, 5)).unwrap();
        assert!(session.engine.tile(id).unwrap().flagged);
    }

    #[test]
    fn finished_game_records_a_score() {
        let mut session = session();
        let safe: Vec<CellId> = session
            .engine
            .tiles()
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.has_mine)
            .map(|(id, _)| id as CellId)
            .collect();
        for id in safe {
            if !session.engine.is_finished() {
                session.apply(Input::Reveal(id)).unwrap();
            }
        }
        assert_eq!(session.engine.state(), EngineState::Won);

        let path = std::env::temp_dir()
            .join(format!("voronoi-sweeper-play-{}.json", std::process::id()));
        session.finish(Some("tester"), &path).unwrap();
        let table = scores::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(table.scores(20, 10).len(), 1);
        assert_eq!(table.scores(20, 10)[0].name, "tester");
    }
}
