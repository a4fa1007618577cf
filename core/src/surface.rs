use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use ndarray::Array2;

use crate::*;

/// Pixel canvas a board is drawn on.
pub trait Surface {
    fn size(&self) -> Coord2;

    fn pixel(&self, point: Coord2) -> Rgb;

    fn set_pixel(&mut self, point: Coord2, color: Rgb);

    /// Draws `text` centered on `at`; empty text clears whatever label was there.
    fn fill_text(&mut self, text: &str, color: Rgb, at: Coord2);

    /// Pushes pending pixel writes to the screen.
    fn repaint(&mut self) {}

    fn attach(&mut self) {}
}

/// In-memory surface keeping pixels and labels separately.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pixels: Array2<Rgb>,
    labels: BTreeMap<Coord2, (String, Rgb)>,
    repaints: usize,
    attached: bool,
}

impl Bitmap {
    pub const BACKGROUND: Rgb = Rgb::CONCEALED;

    pub fn new(size: Coord2) -> Self {
        Self {
            pixels: Array2::from_elem(size.to_nd_index(), Self::BACKGROUND),
            labels: BTreeMap::new(),
            repaints: 0,
            attached: false,
        }
    }

    pub fn pixels(&self) -> &Array2<Rgb> {
        &self.pixels
    }

    pub fn label_at(&self, at: Coord2) -> Option<(&str, Rgb)> {
        self.labels
            .get(&at)
            .map(|(text, color)| (text.as_str(), *color))
    }

    pub fn labels(&self) -> impl Iterator<Item = (Coord2, &str, Rgb)> + '_ {
        self.labels
            .iter()
            .map(|(&at, (text, color))| (at, text.as_str(), *color))
    }

    pub fn repaints(&self) -> usize {
        self.repaints
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Surface for Bitmap {
    fn size(&self) -> Coord2 {
        let (width, height) = self.pixels.dim();
        (width as Coord, height as Coord)
    }

    fn pixel(&self, point: Coord2) -> Rgb {
        self.pixels[point.to_nd_index()]
    }

    fn set_pixel(&mut self, point: Coord2, color: Rgb) {
        self.pixels[point.to_nd_index()] = color;
    }

    fn fill_text(&mut self, text: &str, color: Rgb, at: Coord2) {
        if text.is_empty() {
            self.labels.remove(&at);
        } else {
            self.labels.insert(at, (text.to_string(), color));
        }
    }

    fn repaint(&mut self) {
        self.repaints += 1;
    }

    fn attach(&mut self) {
        self.attached = true;
    }
}
