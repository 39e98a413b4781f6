use super::{
    board::Board,
    collision::{Move, check_collision},
    piece::{Coord, Piece, PieceKind},
};

/// Ordered `(dx, dy)` offsets tried for one rotation transition.
///
/// `dx` is added to the column and `dy` to the row of the candidate origin.
pub type KickOffsets = [(i16, i16); 5];

/// Kicks for J, L, S, T and Z, indexed by the state being rotated from.
const JLSTZ_KICKS: [KickOffsets; 4] = [
    // 0 -> 1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 1 -> 2
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2 -> 3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3 -> 0
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// Kicks for the I piece, indexed by the state being rotated from.
const I_KICKS: [KickOffsets; 4] = [
    // 0 -> 1
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 1 -> 2
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2 -> 3
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3 -> 0
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Kick offsets for the clockwise transition out of rotation state `from`.
///
/// Returns `None` for the O piece, which never kicks.
#[must_use]
pub fn kick_offsets(kind: PieceKind, from: usize) -> Option<&'static KickOffsets> {
    match kind {
        PieceKind::O => None,
        PieceKind::I => I_KICKS.get(from),
        PieceKind::T | PieceKind::S | PieceKind::Z | PieceKind::J | PieceKind::L => {
            JLSTZ_KICKS.get(from)
        }
    }
}

impl Piece {
    /// Rotates the piece 90° clockwise with wall kicks.
    ///
    /// The rotated shape is positioned so that the absolute pivot cell stays
    /// fixed, then each kick offset for the transition is tried in order. The
    /// first placement that does not collide is returned; later offsets are not
    /// considered even if they fit better. Returns `None` when every offset
    /// collides. The O piece is returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use tetris_engine::{Board, BoardDims, Piece, PieceColor, PieceKind};
    ///
    /// let board = Board::new(BoardDims::STANDARD);
    /// let piece = Piece::spawn(PieceKind::T, PieceColor::Purple, 3);
    /// let rotated = piece.rotated_cw(&board).unwrap();
    /// assert_eq!(rotated.rotation().as_index(), 1);
    /// assert_eq!((rotated.shape().rows(), rotated.shape().cols()), (3, 2));
    /// ```
    #[must_use]
    pub fn rotated_cw(&self, board: &Board) -> Option<Self> {
        let from = self.rotation();
        let Some(kicks) = kick_offsets(self.kind(), from.as_index()) else {
            return Some(self.clone());
        };

        let shape = self.shape();
        let origin = self.origin();
        let pivot = self.pivot();
        let pivot_abs = origin.offset(i16::from(pivot.row), i16::from(pivot.col));

        let rotated_shape = shape.rotated_cw();
        let rotated_pivot = pivot.rotated_cw(shape.rows());
        let base = Coord::new(
            pivot_abs.row - i16::from(rotated_pivot.row),
            pivot_abs.col - i16::from(rotated_pivot.col),
        );

        kicks.iter().find_map(|&(dx, dy)| {
            let candidate = Piece::from_parts(
                self.kind(),
                self.color(),
                rotated_shape,
                rotated_pivot,
                from.rotated_cw(),
                base.offset(dy, dx),
            );
            check_collision(Move::Rotate, candidate.coords(), board)
                .is_no()
                .then_some(candidate)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::{Block, BoardDims},
        piece::PieceColor,
    };

    fn board() -> Board {
        Board::new(BoardDims::STANDARD)
    }

    fn coords(piece: &Piece) -> Vec<(i16, i16)> {
        piece.coords().iter().map(|c| (c.row, c.col)).collect()
    }

    fn drop_to_row(piece: &Piece, rows: i16) -> Piece {
        let mut piece = piece.clone();
        for _ in 0..rows {
            piece = piece.translated(Move::Down);
        }
        piece
    }

    #[test]
    fn test_square_rotation_is_identity() {
        let board = board();
        let mut piece = drop_to_row(&Piece::spawn(PieceKind::O, PieceColor::Mustard, 3), 5);
        let start = coords(&piece);
        for _ in 0..8 {
            piece = piece.rotated_cw(&board).unwrap();
            assert_eq!(coords(&piece), start);
        }
    }

    #[test]
    fn test_t_rotation_keeps_pivot_fixed() {
        let board = board();
        let piece = drop_to_row(&Piece::spawn(PieceKind::T, PieceColor::Purple, 3), 5);
        // Pivot is the center cell at (6, 4).
        let rotated = piece.rotated_cw(&board).unwrap();
        assert_eq!(coords(&rotated), vec![(5, 4), (6, 4), (6, 5), (7, 4)]);
        assert_eq!(rotated.rotation().as_index(), 1);
    }

    #[test]
    fn test_four_rotations_cycle_states() {
        let board = board();
        let start = drop_to_row(&Piece::spawn(PieceKind::J, PieceColor::Royal, 3), 8);
        let mut piece = start.clone();
        for expected in [1, 2, 3, 0] {
            piece = piece.rotated_cw(&board).unwrap();
            assert_eq!(piece.rotation().as_index(), expected);
            assert_eq!(piece.coords().len(), 4);
        }
        assert_eq!(piece.shape(), start.shape());
    }

    #[test]
    fn test_i_rotation_in_open_space() {
        let board = board();
        let piece = drop_to_row(&Piece::spawn(PieceKind::I, PieceColor::Royal, 3), 10);
        // Horizontal at row 10, pivot at (10, 4); vertical pivot index is (1, 0).
        let rotated = piece.rotated_cw(&board).unwrap();
        assert_eq!(coords(&rotated), vec![(9, 4), (10, 4), (11, 4), (12, 4)]);
    }

    #[test]
    fn test_rotation_uses_first_fitting_kick() {
        let mut board = board();
        let piece = drop_to_row(&Piece::spawn(PieceKind::T, PieceColor::Purple, 3), 5);
        // Block the unkicked cell (7, 4); kick (-1, 0) shifts left by one.
        board.set(Coord::new(7, 4), Block::Filled(PieceColor::Wine));
        let rotated = piece.rotated_cw(&board).unwrap();
        assert_eq!(coords(&rotated), vec![(5, 3), (6, 3), (6, 4), (7, 3)]);
    }

    #[test]
    fn test_wall_kick_off_left_wall() {
        let board = board();
        // Vertical I against the left wall rotating from state 1 to 2.
        let mut piece = drop_to_row(&Piece::spawn(PieceKind::I, PieceColor::Royal, 3), 10);
        piece = piece.rotated_cw(&board).unwrap();
        for _ in 0..4 {
            piece = piece.translated(Move::Left);
        }
        assert!(piece.coords().iter().all(|c| c.col == 0));
        let rotated = piece.rotated_cw(&board).unwrap();
        assert!(rotated.coords().iter().all(|c| (0..10).contains(&c.col)));
        assert_eq!(rotated.rotation().as_index(), 2);
    }

    #[test]
    fn test_rotation_fails_when_boxed_in() {
        let mut board = board();
        let piece = drop_to_row(&Piece::spawn(PieceKind::T, PieceColor::Purple, 3), 10);
        let occupied = piece.coords().to_vec();
        for row in 0..22 {
            for col in 0..10 {
                let coord = Coord::new(row, col);
                if !occupied.contains(&coord) {
                    board.set(coord, Block::Filled(PieceColor::Grass));
                }
            }
        }
        assert_eq!(piece.rotated_cw(&board), None);
    }

    #[test]
    fn test_kick_tables_start_with_no_offset() {
        for kind in PieceKind::ALL {
            for from in 0..4 {
                if let Some(kicks) = kick_offsets(kind, from) {
                    assert_eq!(kicks[0], (0, 0));
                }
            }
        }
        assert!(kick_offsets(PieceKind::O, 0).is_none());
    }
}
