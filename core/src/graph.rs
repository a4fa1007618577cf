use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PointerButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const ALT   = 1;
        const CTRL  = 1 << 1;
        const META  = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Move,
    Leave,
}

/// Raw pointer input in surface coordinates, which may lie outside the region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: (i32, i32),
    pub button: PointerButtons,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub const fn down(position: (i32, i32), button: PointerButtons) -> Self {
        Self {
            kind: PointerKind::Down,
            position,
            button,
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn moved(position: (i32, i32)) -> Self {
        Self {
            kind: PointerKind::Move,
            position,
            button: PointerButtons::empty(),
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn leave() -> Self {
        Self {
            kind: PointerKind::Leave,
            position: (-1, -1),
            button: PointerButtons::empty(),
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Secondary buttons and alt/ctrl/meta clicks place flags instead of revealing.
    pub fn is_flag_gesture(&self) -> bool {
        self.button != PointerButtons::LEFT
            || self
                .modifiers
                .intersects(Modifiers::ALT | Modifiers::CTRL | Modifiers::META)
    }
}

/// Pointer event after the graph translated its position into a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEvent {
    pub event: PointerEvent,
    pub cell: Option<CellId>,
}

/// Everything the rule engine needs from a board: its cells, their adjacency, a way to paint them, and a way to map
/// pointer positions back to cells.
pub trait CellGraph {
    fn size(&self) -> CellCount;

    /// Symmetric adjacency of `id`.
    fn neighbors(&self, id: CellId) -> &[CellId];

    fn cell_at(&self, position: (i32, i32)) -> Option<CellId>;

    fn render(&mut self, cells: &[CellPaint]);

    /// Mounts the visual surface.
    fn attach(&mut self) {}

    fn locate(&self, event: PointerEvent) -> CellEvent {
        let cell = match event.kind {
            PointerKind::Leave => None,
            PointerKind::Down | PointerKind::Move => self.cell_at(event.position),
        };
        CellEvent { event, cell }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_gesture_detection() {
        assert!(!PointerEvent::down((0, 0), PointerButtons::LEFT).is_flag_gesture());
        assert!(PointerEvent::down((0, 0), PointerButtons::RIGHT).is_flag_gesture());
        assert!(PointerEvent::down((0, 0), PointerButtons::MIDDLE).is_flag_gesture());
        assert!(
            PointerEvent::down((0, 0), PointerButtons::LEFT)
                .with_modifiers(Modifiers::CTRL)
                .is_flag_gesture()
        );
        assert!(
            !PointerEvent::down((0, 0), PointerButtons::LEFT)
                .with_modifiers(Modifiers::SHIFT)
                .is_flag_gesture()
        );
    }
}
