pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece collides with the board")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("shape has no rows")]
    Empty,
    #[display("shape row {row} has {len} cells, expected {expected}")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[display("shape is {rows}x{cols}, larger than 4x4")]
    TooLarge { rows: usize, cols: usize },
    #[display("shape has an empty border row or column")]
    Untrimmed,
    #[display("pivot ({row}, {col}) is outside the shape")]
    PivotOutOfBounds { row: u8, col: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("hold already used for this piece")]
    Disabled,
    #[display("no active piece to hold")]
    NoActivePiece,
    #[display("game is over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 4 columns wide and 4 visible rows tall, got {cols}x{visible_rows}")]
    BoardTooSmall { cols: u8, visible_rows: u8 },
    #[display("board needs at least 1 buffer row")]
    NoBufferRows,
    #[display("spawn column {spawn_col} leaves no room for a 4-wide piece in {cols} columns")]
    SpawnColumnOutOfRange { spawn_col: u8, cols: u8 },
    #[display("tick rate must be positive")]
    ZeroTickRate,
    #[display("start level {level} is outside 1..={max}")]
    StartLevelOutOfRange { level: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("board has {actual} cells, expected {expected}")]
    CellCount { expected: usize, actual: usize },
    #[display("invalid color id {_0}")]
    InvalidColor(#[error(not(source))] u8),
}
