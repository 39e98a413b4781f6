use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{board::Board, piece::Piece};

use super::hold::HoldSlot;

/// Serializable picture of a match at one moment.
///
/// The board is written as a flat row-major list of cell values, `0` for
/// empty and a color id otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub board: Board,
    pub active_piece: Option<Piece>,
    pub next_pieces: Vec<Piece>,
    pub saved_piece: HoldSlot,
    pub game_over: bool,
    pub score: u64,
    pub level: u32,
    pub rows_cleared: u32,
    pub timestamp: DateTime<Utc>,
}
