//! Per-tick player input.

use serde::{Deserialize, Serialize};

/// The controls held during one tick.
///
/// Input wiring (keyboard, touch buttons) is external; it only has to fill
/// this in before each step. Frames are recorded verbatim by the replay
/// system, so they carry held state rather than edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// ArrowLeft / left button.
    pub left: bool,
    /// ArrowRight / right button.
    pub right: bool,
    /// Space / up button.
    pub jump: bool,
    /// KeyX / fire button.
    pub fire: bool,
}

impl InputFrame {
    /// No controls held.
    pub const NONE: InputFrame = InputFrame {
        left: false,
        right: false,
        jump: false,
        fire: false,
    };

    /// Whether no control is held.
    pub fn is_empty(&self) -> bool {
        !(self.left || self.right || self.jump || self.fire)
    }

    /// Only the right control held.
    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::NONE
        }
    }

    /// Only the left control held.
    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::NONE
        }
    }
}
