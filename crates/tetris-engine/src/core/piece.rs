use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::ShapeError;

use super::{
    board::Board,
    collision::{Move, predict_landing},
    shape::{MAX_SHAPE_CELLS, Shape},
};

/// Absolute cell coordinates occupied by a piece.
pub type Coords = ArrayVec<Coord, MAX_SHAPE_CELLS>;

/// Absolute board coordinate.
///
/// Rows grow downward from the top of the buffer zone, columns grow rightward.
/// Signed so that candidate placements may fall outside the board while they
/// are being tested. Serialized as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i16, i16)", into = "(i16, i16)")]
pub struct Coord {
    pub row: i16,
    pub col: i16,
}

impl Coord {
    #[must_use]
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn offset(self, d_row: i16, d_col: i16) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl From<(i16, i16)> for Coord {
    fn from((row, col): (i16, i16)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coord> for (i16, i16) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

/// Rotation center inside a shape's bounding box, as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct Pivot {
    pub row: u8,
    pub col: u8,
}

impl Pivot {
    /// Pivot of a shape in its spawn orientation.
    ///
    /// The center of the bounding box, except for the long piece whose 1×4 and
    /// 4×1 orientations use fixed off-center pivots that line up with the I kick
    /// table.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn for_shape(shape: &Shape) -> Self {
        match (shape.rows(), shape.cols()) {
            (1, 4) => Self { row: 0, col: 1 },
            (4, 1) => Self { row: 1, col: 0 },
            (rows, cols) => Self {
                row: (rows / 2) as u8,
                col: (cols / 2) as u8,
            },
        }
    }

    /// Pivot index after rotating a shape with `rows` rows 90° clockwise.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn rotated_cw(self, rows: usize) -> Self {
        Self {
            row: self.col,
            col: (rows - 1 - usize::from(self.row)) as u8,
        }
    }
}

impl From<(u8, u8)> for Pivot {
    fn from((row, col): (u8, u8)) -> Self {
        Self { row, col }
    }
}

impl From<Pivot> for (u8, u8) {
    fn from(pivot: Pivot) -> Self {
        (pivot.row, pivot.col)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub fn rotated_cw(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 3 {
            return Err(format!("rotation must be 0-3, got {value}"));
        }
        Ok(Self(value))
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    /// Long piece.
    I = 0,
    /// Square piece.
    O = 1,
    T = 2,
    S = 3,
    Z = 4,
    J = 5,
    L = 6,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    /// Shape of this kind in its spawn orientation.
    #[must_use]
    pub const fn spawn_shape(self) -> Shape {
        SPAWN_SHAPES[self as usize]
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::T => 'T',
            Self::S => 'S',
            Self::Z => 'Z',
            Self::J => 'J',
            Self::L => 'L',
        }
    }
}

// Row-major 4-bit rows, LSB is the leftmost column.
const SPAWN_SHAPES: [Shape; PieceKind::LEN] = [
    // I: ####
    Shape::from_raw(1, 4, 0b1111),
    // O: ##
    //    ##
    Shape::from_raw(2, 2, 0b0011_0011),
    // T: .#.
    //    ###
    Shape::from_raw(2, 3, 0b0111_0010),
    // S: .##
    //    ##.
    Shape::from_raw(2, 3, 0b0011_0110),
    // Z: ##.
    //    .##
    Shape::from_raw(2, 3, 0b0110_0011),
    // J: #..
    //    ###
    Shape::from_raw(2, 3, 0b0111_0001),
    // L: ..#
    //    ###
    Shape::from_raw(2, 3, 0b0111_0100),
];

/// Color identifiers, stored on the board as `1..=7` (`0` is empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceColor {
    Purple = 1,
    Mustard = 2,
    Panther = 3,
    Wine = 4,
    Grass = 5,
    Royal = 6,
    Turk = 7,
}

impl PieceColor {
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::Purple,
        Self::Mustard,
        Self::Panther,
        Self::Wine,
        Self::Grass,
        Self::Royal,
        Self::Turk,
    ];

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Purple),
            2 => Some(Self::Mustard),
            3 => Some(Self::Panther),
            4 => Some(Self::Wine),
            5 => Some(Self::Grass),
            6 => Some(Self::Royal),
            7 => Some(Self::Turk),
            _ => None,
        }
    }
}

/// A falling tetromino: shape, absolute coordinates, pivot, rotation and color.
///
/// Pieces are never mutated in place. Movement and rotation return new
/// `Piece` instances, and the caller decides whether to keep them.
///
/// # Example
///
/// ```
/// use tetris_engine::{Move, Piece, PieceColor, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T, PieceColor::Grass, 3);
/// let moved = piece.translated(Move::Right);
/// assert_eq!(moved.origin().col, 4);
/// assert_eq!(piece.origin().col, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPiece")]
pub struct Piece {
    kind: PieceKind,
    color: PieceColor,
    shape: Shape,
    coords: Coords,
    pivot: Pivot,
    rotation: Rotation,
}

impl Piece {
    /// Creates a piece in spawn orientation with its bounding box at row 0 and
    /// column `spawn_col`.
    #[must_use]
    pub fn spawn(kind: PieceKind, color: PieceColor, spawn_col: u8) -> Self {
        let shape = kind.spawn_shape();
        Self::from_parts(
            kind,
            color,
            shape,
            Pivot::for_shape(&shape),
            Rotation::SPAWN,
            Coord::new(0, i16::from(spawn_col)),
        )
    }

    /// Creates a piece with the given orientation whose bounding box starts at
    /// `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::PivotOutOfBounds`] if `pivot` lies outside the
    /// shape's bounding box.
    pub fn placed(
        kind: PieceKind,
        color: PieceColor,
        shape: Shape,
        pivot: Pivot,
        rotation: Rotation,
        origin: Coord,
    ) -> Result<Self, ShapeError> {
        if usize::from(pivot.row) >= shape.rows() || usize::from(pivot.col) >= shape.cols() {
            return Err(ShapeError::PivotOutOfBounds {
                row: pivot.row,
                col: pivot.col,
            });
        }
        Ok(Self::from_parts(kind, color, shape, pivot, rotation, origin))
    }

    /// Builds a piece whose pivot is already known to lie inside `shape`.
    pub(super) fn from_parts(
        kind: PieceKind,
        color: PieceColor,
        shape: Shape,
        pivot: Pivot,
        rotation: Rotation,
        origin: Coord,
    ) -> Self {
        Self {
            kind,
            color,
            shape,
            coords: coords_at(&shape, origin),
            pivot,
            rotation,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    #[must_use]
    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Top-left corner of the shape's bounding box.
    #[must_use]
    pub fn origin(&self) -> Coord {
        // Shapes are trimmed, so the bounding box corner is the minimum of the
        // occupied cells.
        let row = self.coords.iter().map(|c| c.row).min().unwrap_or(0);
        let col = self.coords.iter().map(|c| c.col).min().unwrap_or(0);
        Coord::new(row, col)
    }

    /// Returns a copy moved by the delta of `mv`.
    ///
    /// No collision check is done; see [`check_collision`](super::check_collision).
    #[must_use]
    pub fn translated(&self, mv: Move) -> Self {
        let (d_row, d_col) = mv.delta();
        self.with_coords(translate(&self.coords, d_row, d_col))
    }

    /// Returns a copy at the lowest legal resting position on `board`.
    #[must_use]
    pub fn landed(&self, board: &Board) -> Self {
        self.with_coords(predict_landing(&self.coords, board))
    }

    /// Returns the same piece rebuilt at spawn orientation and position.
    #[must_use]
    pub fn respawned(&self, spawn_col: u8) -> Self {
        Self::spawn(self.kind, self.color, spawn_col)
    }

    fn with_coords(&self, coords: Coords) -> Self {
        Self {
            kind: self.kind,
            color: self.color,
            shape: self.shape,
            coords,
            pivot: self.pivot,
            rotation: self.rotation,
        }
    }
}

/// Absolute coordinates of `shape` with its bounding box at `origin`.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn coords_at(shape: &Shape, origin: Coord) -> Coords {
    shape
        .filled_cells()
        .map(|(r, c)| origin.offset(r as i16, c as i16))
        .collect()
}

/// Moves every coordinate by `(d_row, d_col)`.
#[must_use]
pub fn translate(coords: &[Coord], d_row: i16, d_col: i16) -> Coords {
    coords.iter().map(|c| c.offset(d_row, d_col)).collect()
}

#[derive(Deserialize)]
struct RawPiece {
    kind: PieceKind,
    color: PieceColor,
    shape: Shape,
    coords: Vec<Coord>,
    pivot: Pivot,
    rotation: Rotation,
}

impl TryFrom<RawPiece> for Piece {
    type Error = String;

    fn try_from(raw: RawPiece) -> Result<Self, Self::Error> {
        let origin = Coord::new(
            raw.coords.iter().map(|c| c.row).min().unwrap_or(0),
            raw.coords.iter().map(|c| c.col).min().unwrap_or(0),
        );
        let piece = Piece::placed(
            raw.kind,
            raw.color,
            raw.shape,
            raw.pivot,
            raw.rotation,
            origin,
        )
        .map_err(|err| err.to_string())?;
        if piece.coords.as_slice() != raw.coords.as_slice() {
            return Err(format!(
                "piece coords {:?} do not match its shape",
                raw.coords
            ));
        }
        Ok(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::BoardDims;

    #[test]
    fn test_spawn_shapes_are_valid_tetrominoes() {
        for kind in PieceKind::ALL {
            let shape = kind.spawn_shape();
            let matrix: Vec<Vec<bool>> = (0..shape.rows())
                .map(|r| (0..shape.cols()).map(|c| shape.is_filled(r, c)).collect())
                .collect();
            assert_eq!(Shape::new(&matrix), Ok(shape), "{kind:?}");
            assert_eq!(shape.cell_count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(PieceKind::I, PieceColor::Royal, 3);
        let coords: Vec<_> = piece.coords().iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(coords, vec![(0, 3), (0, 4), (0, 5), (0, 6)]);
        assert_eq!(piece.rotation(), Rotation::SPAWN);
        assert_eq!(piece.origin(), Coord::new(0, 3));
    }

    #[test]
    fn test_coords_match_shape_cell_count() {
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind, PieceColor::Wine, 3);
            assert_eq!(piece.coords().len(), piece.shape().cell_count());
        }
    }

    #[test]
    fn test_pivot_for_shapes() {
        assert_eq!(
            Pivot::for_shape(&PieceKind::I.spawn_shape()),
            Pivot { row: 0, col: 1 }
        );
        assert_eq!(
            Pivot::for_shape(&PieceKind::I.spawn_shape().rotated_cw()),
            Pivot { row: 1, col: 0 }
        );
        assert_eq!(
            Pivot::for_shape(&PieceKind::T.spawn_shape()),
            Pivot { row: 1, col: 1 }
        );
    }

    #[test]
    fn test_pivot_follows_rotated_cell() {
        // The T pivot sits on the center cell; after rotating it must still
        // point at a filled cell.
        let shape = PieceKind::T.spawn_shape();
        let pivot = Pivot::for_shape(&shape);
        let rotated = pivot.rotated_cw(shape.rows());
        assert_eq!(rotated, Pivot { row: 1, col: 0 });
        assert!(shape.rotated_cw().is_filled(1, 0));
    }

    #[test]
    fn test_translated_returns_new_instance() {
        let piece = Piece::spawn(PieceKind::O, PieceColor::Mustard, 3);
        let down = piece.translated(Move::Down);
        assert_eq!(down.origin(), Coord::new(1, 3));
        assert_eq!(piece.origin(), Coord::new(0, 3));
        assert_eq!(down.shape(), piece.shape());
        assert_eq!(down.pivot(), piece.pivot());
    }

    #[test]
    fn test_color_ids() {
        for color in PieceColor::ALL {
            assert_eq!(PieceColor::from_id(color.id()), Some(color));
        }
        assert_eq!(PieceColor::from_id(0), None);
        assert_eq!(PieceColor::from_id(8), None);
    }

    #[test]
    fn test_placed_rejects_pivot_outside_shape() {
        let shape = PieceKind::T.spawn_shape();
        let origin = Coord::new(5, 3);
        assert_eq!(
            Piece::placed(
                PieceKind::T,
                PieceColor::Purple,
                shape,
                Pivot { row: 5, col: 0 },
                Rotation::SPAWN,
                origin,
            ),
            Err(ShapeError::PivotOutOfBounds { row: 5, col: 0 })
        );
        assert_eq!(
            Piece::placed(
                PieceKind::T,
                PieceColor::Purple,
                shape,
                Pivot { row: 1, col: 3 },
                Rotation::SPAWN,
                origin,
            ),
            Err(ShapeError::PivotOutOfBounds { row: 1, col: 3 })
        );

        let piece = Piece::placed(
            PieceKind::T,
            PieceColor::Purple,
            shape,
            Pivot::for_shape(&shape),
            Rotation::SPAWN,
            origin,
        )
        .unwrap();
        assert_eq!(piece.origin(), origin);
        assert!(piece.rotated_cw(&Board::new(BoardDims::STANDARD)).is_some());
    }

    #[test]
    fn test_piece_serde_rejects_inconsistent_coords() {
        let piece = Piece::spawn(PieceKind::T, PieceColor::Purple, 3);
        let json = serde_json::to_string(&piece).unwrap();
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, piece);

        let broken = json.replace("[1,5]", "[2,5]");
        assert!(serde_json::from_str::<Piece>(&broken).is_err());

        let broken = json.replace("\"pivot\":[1,1]", "\"pivot\":[5,0]");
        assert_ne!(broken, json);
        assert!(serde_json::from_str::<Piece>(&broken).is_err());
    }
}
