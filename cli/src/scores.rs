use anyhow::{Context, Result};
use chrono::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use voronoi_sweeper_core::{GameConfig, HighScores};

/// Missing files load as an empty table.
pub fn load(path: &Path) -> Result<HighScores> {
    if !path.exists() {
        log::debug!("no high score file at {}", path.display());
        return Ok(HighScores::new());
    }
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse {}", path.display()))
}

pub fn save(table: &HighScores, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table)
        .with_context(|| format!("could not write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("could not write {}", path.display()))
}

pub fn print(table: &HighScores, config: &GameConfig) {
    let scores = table.scores_for(config);
    println!(
        "best times for {} cells at {}% density",
        config.cell_count, config.density
    );
    if scores.is_empty() {
        println!("  none yet");
    }
    for (rank, score) in scores.iter().enumerate() {
        let date = DateTime::<Utc>::from_timestamp_millis(score.date_ms as i64)
            .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>4}. {:>8.3}s  {}  {}",
            rank + 1,
            score.time_ms as f64 / 1000.0,
            date,
            score.name
        );
    }

    let others: Vec<String> = table
        .keys()
        .filter(|&key| key != (config.cell_count, config.density))
        .map(|(cells, density)| format!("{cells}/{density}%"))
        .collect();
    if !others.is_empty() {
        println!("other boards: {}", others.join(", "));
    }
}
