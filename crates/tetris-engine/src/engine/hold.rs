use serde::{Deserialize, Serialize};

use crate::core::piece::Piece;

/// Single saved-piece slot with a per-lock cooldown.
///
/// After a swap the slot is disabled until the next piece locks, so the player
/// cannot keep swapping the same two pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldSlot {
    tetromino: Option<Piece>,
    disabled: bool,
}

impl HoldSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tetromino: None,
            disabled: false,
        }
    }

    #[must_use]
    pub fn piece(&self) -> Option<&Piece> {
        self.tetromino.as_ref()
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Stores `active` and returns the previously held piece, if any.
    ///
    /// Disables the slot. Callers check [`Self::is_disabled`] first.
    pub fn swap(&mut self, active: Piece) -> Option<Piece> {
        self.disabled = true;
        self.tetromino.replace(active)
    }

    /// Re-enables the slot once a piece has locked.
    pub fn enable(&mut self) {
        self.disabled = false;
    }
}
