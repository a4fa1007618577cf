use anyhow::{Context, Result};
use image::{ImageBuffer, ImageFormat, Rgb};
use std::path::Path;
use voronoi_sweeper_core::{Bitmap, CellGraph, CellId, Coord, Surface, Tile};

use crate::view::Engine;

/// Half the side of the square drawn in place of a label, the image crate has no text rendering.
const MARKER_RADIUS: i64 = 2;

pub fn to_image(surface: &Bitmap) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let (width, height) = surface.size();
    let mut img = ImageBuffer::from_fn(u32::from(width), u32::from(height), |x, y| {
        let color = surface.pixel((x as Coord, y as Coord));
        Rgb([color.0, color.1, color.2])
    });

    for ((x, y), _, color) in surface.labels() {
        for dx in -MARKER_RADIUS..=MARKER_RADIUS {
            for dy in -MARKER_RADIUS..=MARKER_RADIUS {
                let (px, py) = (i64::from(x) + dx, i64::from(y) + dy);
                if (0..i64::from(width)).contains(&px) && (0..i64::from(height)).contains(&py) {
                    img.put_pixel(px as u32, py as u32, Rgb([color.0, color.1, color.2]));
                }
            }
        }
    }
    img
}

pub fn save_png(surface: &Bitmap, path: &Path) -> Result<()> {
    to_image(surface)
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("could not write {}", path.display()))
}

/// Paints every cell as revealed without touching the game state.
pub fn reveal_everything<S: Surface>(engine: &mut Engine<S>) {
    let paints: Vec<_> = engine
        .tiles()
        .iter()
        .enumerate()
        .map(|(id, &tile)| {
            Tile {
                revealed: true,
                flagged: false,
                hovered: false,
                ..tile
            }
            .paint(id as CellId)
        })
        .collect();
    engine.graph_mut().render(&paints);
}
