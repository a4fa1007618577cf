use serde::{Deserialize, Serialize};

use crate::*;

/// Rule-engine state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub has_mine: bool,
    pub adjacent_mines: u8,
    pub flagged: bool,
    pub revealed: bool,
    /// Cosmetic only, never consulted by the rules.
    pub hovered: bool,
}

impl Tile {
    pub const fn is_concealed(self) -> bool {
        !self.revealed
    }

    pub const fn color(self) -> Rgb {
        let color = if self.revealed {
            Rgb::REVEALED
        } else {
            Rgb::CONCEALED
        };
        if self.hovered { color.hovered() } else { color }
    }

    pub const fn label(self) -> Option<Label> {
        match (self.revealed, self.has_mine, self.flagged) {
            (true, true, _) => Some(Label::Mine),
            (true, false, _) if self.adjacent_mines > 0 => Some(Label::Count(self.adjacent_mines)),
            (false, _, true) => Some(Label::Flag),
            _ => None,
        }
    }

    pub const fn label_color(self) -> Rgb {
        match self.label() {
            Some(label) if self.revealed => label.color(),
            _ => Rgb::BLACK,
        }
    }

    pub const fn paint(self, id: CellId) -> CellPaint {
        CellPaint {
            id,
            color: self.color(),
            label: self.label(),
            label_color: self.label_color(),
        }
    }
}
