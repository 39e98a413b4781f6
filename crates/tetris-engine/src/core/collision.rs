use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{Coord, Coords, translate},
};

/// Kind of movement being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Down,
    Left,
    Right,
    Rotate,
}

impl Move {
    /// Row and column delta applied by a translation; zero for rotation.
    #[must_use]
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
            Move::Rotate => (0, 0),
        }
    }
}

/// Outcome of testing a candidate placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Collision {
    /// Placement is legal.
    No,
    /// Placement is illegal; the piece stays where it was.
    Continue,
    /// A downward move hit the floor or the stack; the piece must lock.
    Lock,
}

/// Tests a candidate coordinate set against the board.
///
/// Cells are checked in order and the first non-[`Collision::No`] outcome wins:
///
/// - column outside the board, or row above it: [`Collision::Continue`]
/// - at or below the floor, or on a filled cell: [`Collision::Lock`] for
///   [`Move::Down`], [`Collision::Continue`] otherwise
///
/// # Example
///
/// ```
/// use tetris_engine::{Board, BoardDims, Collision, Coord, Move, check_collision};
///
/// let board = Board::new(BoardDims::STANDARD);
/// let floor = [Coord::new(22, 0)];
/// assert_eq!(check_collision(Move::Down, &floor, &board), Collision::Lock);
/// assert_eq!(check_collision(Move::Left, &floor, &board), Collision::Continue);
///
/// let wall = [Coord::new(5, -1)];
/// assert_eq!(check_collision(Move::Down, &wall, &board), Collision::Continue);
/// ```
#[must_use]
pub fn check_collision(mv: Move, coords: &[Coord], board: &Board) -> Collision {
    let dims = board.dims();
    let cols = i16::from(dims.cols);
    let floor = dims.floor();
    for &coord in coords {
        if coord.col < 0 || coord.col >= cols || coord.row < 0 {
            return Collision::Continue;
        }
        if coord.row >= floor || board.is_filled(coord) {
            return match mv {
                Move::Down => Collision::Lock,
                Move::Left | Move::Right | Move::Rotate => Collision::Continue,
            };
        }
    }
    Collision::No
}

/// Lowest resting position of `coords` when dropped straight down.
///
/// Translates one row at a time until the next step would collide and returns
/// the last legal set. If the input itself cannot move down it is returned
/// unchanged.
///
/// # Example
///
/// ```
/// use tetris_engine::{Board, BoardDims, Coord, predict_landing};
///
/// let board = Board::new(BoardDims::STANDARD);
/// let landed = predict_landing(&[Coord::new(0, 4), Coord::new(1, 4)], &board);
/// assert_eq!(landed.as_slice(), &[Coord::new(20, 4), Coord::new(21, 4)]);
/// ```
#[must_use]
pub fn predict_landing(coords: &[Coord], board: &Board) -> Coords {
    let mut landed: Coords = coords.iter().copied().collect();
    loop {
        let (d_row, d_col) = Move::Down.delta();
        let candidate = translate(&landed, d_row, d_col);
        if !check_collision(Move::Down, &candidate, board).is_no() {
            return landed;
        }
        landed = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::{Block, BoardDims},
        piece::{Piece, PieceColor, PieceKind},
    };

    fn board() -> Board {
        Board::new(BoardDims::STANDARD)
    }

    #[test]
    fn test_columns_outside_are_continue_for_every_move() {
        let board = board();
        for mv in [Move::Down, Move::Left, Move::Right, Move::Rotate] {
            assert_eq!(
                check_collision(mv, &[Coord::new(3, -1)], &board),
                Collision::Continue
            );
            assert_eq!(
                check_collision(mv, &[Coord::new(3, 10)], &board),
                Collision::Continue
            );
        }
    }

    #[test]
    fn test_filled_cell_locks_only_downward() {
        let mut board = board();
        board.set(Coord::new(10, 4), Block::Filled(PieceColor::Turk));
        let coords = [Coord::new(10, 4)];
        assert_eq!(check_collision(Move::Down, &coords, &board), Collision::Lock);
        assert_eq!(
            check_collision(Move::Right, &coords, &board),
            Collision::Continue
        );
        assert_eq!(
            check_collision(Move::Rotate, &coords, &board),
            Collision::Continue
        );
    }

    #[test]
    fn test_first_offending_cell_wins() {
        let board = board();
        // First cell is past the floor, second is past the wall.
        let coords = [Coord::new(22, 0), Coord::new(5, 10)];
        assert_eq!(check_collision(Move::Down, &coords, &board), Collision::Lock);
        let coords = [Coord::new(5, 10), Coord::new(22, 0)];
        assert_eq!(
            check_collision(Move::Down, &coords, &board),
            Collision::Continue
        );
    }

    #[test]
    fn test_free_cells_are_no_collision() {
        let board = board();
        let piece = Piece::spawn(PieceKind::T, PieceColor::Grass, 3);
        assert_eq!(
            check_collision(Move::Rotate, piece.coords(), &board),
            Collision::No
        );
    }

    #[test]
    fn test_predict_landing_stops_on_stack() {
        let mut board = board();
        board.set(Coord::new(15, 4), Block::Filled(PieceColor::Wine));
        let piece = Piece::spawn(PieceKind::I, PieceColor::Royal, 3);
        let landed = predict_landing(piece.coords(), &board);
        assert!(landed.iter().all(|c| c.row == 14));
    }

    #[test]
    fn test_predict_landing_is_idempotent() {
        let board = board();
        let piece = Piece::spawn(PieceKind::S, PieceColor::Purple, 3);
        let once = predict_landing(piece.coords(), &board);
        let twice = predict_landing(&once, &board);
        assert_eq!(once, twice);
        assert_eq!(predict_landing(piece.coords(), &board), once);
    }
}
