use serde::{Deserialize, Serialize, Serializer};

use crate::BoardError;

use super::piece::{Coord, Piece, PieceColor};

/// Board dimensions, fixed for the lifetime of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDims {
    /// Number of columns.
    pub cols: u8,
    /// Number of rows shown to the player.
    pub visible_rows: u8,
    /// Hidden rows above the visible area used for spawning and game-over
    /// detection.
    pub buffer_rows: u8,
}

impl Default for BoardDims {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BoardDims {
    /// 10 columns, 20 visible rows, 2 buffer rows.
    pub const STANDARD: Self = Self {
        cols: 10,
        visible_rows: 20,
        buffer_rows: 2,
    };

    #[must_use]
    pub fn cols(self) -> usize {
        usize::from(self.cols)
    }

    #[must_use]
    pub fn buffer_rows(self) -> usize {
        usize::from(self.buffer_rows)
    }

    #[must_use]
    pub fn total_rows(self) -> usize {
        usize::from(self.buffer_rows) + usize::from(self.visible_rows)
    }

    #[must_use]
    pub fn cell_count(self) -> usize {
        self.total_rows() * self.cols()
    }

    /// First row index below the board.
    #[must_use]
    pub fn floor(self) -> i16 {
        i16::from(self.buffer_rows) + i16::from(self.visible_rows)
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    #[default]
    Empty,
    /// Locked cell of a piece with the given color.
    Filled(PieceColor),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Cell value as seen by collaborators: `0` for empty, else the color id.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Filled(color) => color.id(),
        }
    }

    pub fn from_value(value: u8) -> Result<Self, BoardError> {
        match value {
            0 => Ok(Block::Empty),
            id => PieceColor::from_id(id)
                .map(Block::Filled)
                .ok_or(BoardError::InvalidColor(id)),
        }
    }
}

/// Playfield stored as a flat row-major list of cells.
///
/// Row 0 is the top of the buffer zone; the visible area starts at row
/// `buffer_rows`. Serialized as the flat list of cell values.
///
/// # Example
///
/// ```
/// use tetris_engine::{Board, BoardDims};
///
/// let board = Board::new(BoardDims::STANDARD);
/// assert_eq!(board.cell_values().len(), 220);
/// assert!(board.cell_values().iter().all(|&v| v == 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dims: BoardDims,
    cells: Vec<Block>,
}

impl Board {
    #[must_use]
    pub fn new(dims: BoardDims) -> Self {
        Self {
            dims,
            cells: vec![Block::Empty; dims.cell_count()],
        }
    }

    /// Rebuilds a board from flat cell values.
    pub fn from_cells(dims: BoardDims, values: &[u8]) -> Result<Self, BoardError> {
        if values.len() != dims.cell_count() {
            return Err(BoardError::CellCount {
                expected: dims.cell_count(),
                actual: values.len(),
            });
        }
        let cells = values
            .iter()
            .map(|&v| Block::from_value(v))
            .collect::<Result<_, _>>()?;
        Ok(Self { dims, cells })
    }

    #[must_use]
    pub fn dims(&self) -> BoardDims {
        self.dims
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let row = usize::try_from(coord.row).ok()?;
        let col = usize::try_from(coord.col).ok()?;
        (row < self.dims.total_rows() && col < self.dims.cols())
            .then(|| row * self.dims.cols() + col)
    }

    /// Returns the cell at `coord`, or `None` outside the board.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Block> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Returns whether `coord` is inside the board and filled.
    #[must_use]
    pub fn is_filled(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(|b| !b.is_empty())
    }

    pub fn set(&mut self, coord: Coord, block: Block) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = block;
        }
    }

    /// Flat cell values, `0` for empty or a color id.
    #[must_use]
    pub fn cell_values(&self) -> Vec<u8> {
        self.cells.iter().map(|b| b.value()).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        self.cells.chunks(self.dims.cols())
    }

    /// Merges the piece's cells into the board at its color.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for &coord in piece.coords() {
            debug_assert!(self.index(coord).is_some(), "locked cell {coord:?} outside board");
            self.set(coord, Block::Filled(piece.color()));
        }
    }

    fn is_row_full(&self, row: usize) -> bool {
        let cols = self.dims.cols();
        self.cells[row * cols..][..cols].iter().all(|b| !b.is_empty())
    }

    /// Removes every full visible row and returns their indices, bottom to top.
    ///
    /// Rows above a cleared row shift down; empty rows enter at the top of the
    /// buffer zone. Columns never shift. Buffer rows are never cleared.
    pub fn clear_full_rows(&mut self) -> Vec<usize> {
        let cols = self.dims.cols();
        let first_visible = self.dims.buffer_rows();
        let mut cleared = Vec::new();
        for row in (0..self.dims.total_rows()).rev() {
            if row >= first_visible && self.is_row_full(row) {
                cleared.push(row);
                continue;
            }
            let shift = cleared.len();
            if shift > 0 {
                self.cells
                    .copy_within(row * cols..(row + 1) * cols, (row + shift) * cols);
            }
        }
        self.cells[..cleared.len() * cols].fill(Block::Empty);
        cleared
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.cells.iter().map(|b| b.value()))
    }
}
