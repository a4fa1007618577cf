use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// Almost black, so borders can be told apart from any color a cell is painted with.
    pub const BORDER: Rgb = Rgb(1, 1, 1);
    pub const CONCEALED: Rgb = Rgb(187, 187, 187);
    pub const REVEALED: Rgb = Rgb(255, 255, 255);

    /// Yellowish tint used for hovered cells.
    pub const fn hovered(self) -> Self {
        Rgb(self.0, self.1.saturating_sub(32), self.2.saturating_sub(64))
    }

    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub const fn to_hex(self) -> u32 {
        (self.0 as u32) << 16 | (self.1 as u32) << 8 | self.2 as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Text drawn at a cell's centroid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Mine,
    Flag,
    Count(u8),
}

impl Label {
    /// Color of the adjacent mine counts `1..=8`, other labels are black.
    pub const fn color(self) -> Rgb {
        match self {
            Label::Count(1) => Rgb(0x00, 0x00, 0xdd),
            Label::Count(2) => Rgb(0x00, 0xbb, 0x00),
            Label::Count(3) => Rgb(0xdd, 0x00, 0x00),
            Label::Count(4) => Rgb(0xdd, 0x00, 0xdd),
            Label::Count(5) => Rgb(0xdd, 0xaa, 0x00),
            Label::Count(6) => Rgb(0x00, 0x00, 0x99),
            Label::Count(7) => Rgb(0x00, 0x88, 0x00),
            Label::Count(8) => Rgb(0x99, 0x00, 0x00),
            _ => Rgb::BLACK,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Mine => f.write_str("💣"),
            Label::Flag => f.write_str("F"),
            Label::Count(count) => write!(f, "{count}"),
        }
    }
}

/// Complete visual state of one cell, handed to [`CellGraph::render`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPaint {
    pub id: CellId,
    pub color: Rgb,
    pub label: Option<Label>,
    pub label_color: Rgb,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn hover_tint_matches_palette() {
        assert_eq!(Rgb::CONCEALED.hovered(), Rgb(187, 155, 123));
        assert_eq!(Rgb::REVEALED.hovered(), Rgb(255, 223, 191));
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::CONCEALED.to_string(), "#bbbbbb");
        assert_eq!(Rgb::from_hex(0x010101), Rgb::BORDER);
    }

    #[test]
    fn labels_render_and_color() {
        assert_eq!(Label::Count(3).to_string(), "3");
        assert_eq!(Label::Flag.to_string(), "F");
        assert_eq!(Label::Count(1).color(), Rgb::from_hex(0x0000dd));
        assert_eq!(Label::Count(11).color(), Rgb::BLACK);
        assert_eq!(Label::Mine.color(), Rgb::BLACK);
    }
}
