use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ShapeError;

/// Largest side of a shape's bounding box.
pub const MAX_SHAPE_SIDE: usize = 4;

/// Largest number of filled cells a shape can hold.
pub const MAX_SHAPE_CELLS: usize = MAX_SHAPE_SIDE * MAX_SHAPE_SIDE;

/// Boolean occupancy matrix of a piece in one orientation.
///
/// The matrix is stored as a 16-bit mask in row-major order, bit `row * 4 + col`
/// set for each filled cell. Shapes are always trimmed: the first and last row
/// and the first and last column each contain at least one filled cell, so the
/// top-left corner of the bounding box is also the minimum of the occupied
/// coordinates.
///
/// # Example
///
/// ```
/// use tetris_engine::Shape;
///
/// let t = Shape::new(&[&[false, true, false], &[true, true, true]]).unwrap();
/// assert_eq!((t.rows(), t.cols()), (2, 3));
///
/// let rotated = t.rotated_cw();
/// assert_eq!((rotated.rows(), rotated.cols()), (3, 2));
/// assert_eq!(rotated.cell_count(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    bits: u16,
}

const fn bit(row: usize, col: usize) -> u16 {
    1 << (row * MAX_SHAPE_SIDE + col)
}

impl Shape {
    /// Builds a shape from a matrix of rows.
    ///
    /// Fails if the matrix is empty, ragged, larger than 4×4, or has an empty
    /// border row or column.
    pub fn new<R>(matrix: &[R]) -> Result<Self, ShapeError>
    where
        R: AsRef<[bool]>,
    {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(ShapeError::Empty);
        }
        if rows > MAX_SHAPE_SIDE || cols > MAX_SHAPE_SIDE {
            return Err(ShapeError::TooLarge { rows, cols });
        }

        let mut bits = 0;
        for (r, row) in matrix.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(ShapeError::Ragged {
                    row: r,
                    len: row.len(),
                    expected: cols,
                });
            }
            for (c, &filled) in row.iter().enumerate() {
                if filled {
                    bits |= bit(r, c);
                }
            }
        }

        #[expect(clippy::cast_possible_truncation)]
        let shape = Self {
            rows: rows as u8,
            cols: cols as u8,
            bits,
        };
        if !shape.is_trimmed() {
            return Err(ShapeError::Untrimmed);
        }
        Ok(shape)
    }

    /// Builds a shape from a raw mask without validation.
    ///
    /// Only used for the built-in piece table, whose shapes are checked in tests.
    pub(crate) const fn from_raw(rows: u8, cols: u8, bits: u16) -> Self {
        Self { rows, cols, bits }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    /// Returns whether the cell at `(row, col)` is filled.
    ///
    /// Cells outside the bounding box are reported as empty.
    #[must_use]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.bits & bit(row, col) != 0
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterates over filled cells as `(row, col)` pairs in row-major order.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows()).flat_map(move |r| {
            (0..self.cols()).filter_map(move |c| self.is_filled(r, c).then_some((r, c)))
        })
    }

    /// Returns the shape rotated 90° clockwise.
    ///
    /// Cell `(r, c)` moves to `(c, rows - 1 - r)`.
    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        let rows = self.rows();
        let mut bits = 0;
        for (r, c) in self.filled_cells() {
            bits |= bit(c, rows - 1 - r);
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            bits,
        }
    }

    fn is_trimmed(&self) -> bool {
        let (rows, cols) = (self.rows(), self.cols());
        let row_has_cell = |r: usize| (0..cols).any(|c| self.is_filled(r, c));
        let col_has_cell = |c: usize| (0..rows).any(|r| self.is_filled(r, c));
        row_has_cell(0) && row_has_cell(rows - 1) && col_has_cell(0) && col_has_cell(cols - 1)
    }

    fn to_matrix(self) -> Vec<Vec<u8>> {
        (0..self.rows())
            .map(|r| {
                (0..self.cols())
                    .map(|c| u8::from(self.is_filled(r, c)))
                    .collect()
            })
            .collect()
    }
}

// Serialized as a matrix of 0/1 rows, e.g. `[[0,1,0],[1,1,1]]`.
impl Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_matrix().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let matrix = Vec::<Vec<u8>>::deserialize(deserializer)?;
        let matrix = matrix
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        0 => Ok(false),
                        1 => Ok(true),
                        _ => Err(serde::de::Error::custom(format!(
                            "shape cells must be 0 or 1, got {cell}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Shape::new(&matrix).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: bool = true;
    const E: bool = false;

    #[test]
    fn test_new_rejects_malformed_matrices() {
        let empty: [&[bool]; 0] = [];
        assert_eq!(Shape::new(&empty), Err(ShapeError::Empty));
        assert_eq!(Shape::new(&[&[] as &[bool]]), Err(ShapeError::Empty));
        assert_eq!(
            Shape::new(&[&[C, C] as &[bool], &[C]]),
            Err(ShapeError::Ragged {
                row: 1,
                len: 1,
                expected: 2
            })
        );
        assert_eq!(
            Shape::new(&[[C; 5]]),
            Err(ShapeError::TooLarge { rows: 1, cols: 5 })
        );
        assert_eq!(
            Shape::new(&[[C, C], [E, E]]),
            Err(ShapeError::Untrimmed)
        );
        assert_eq!(Shape::new(&[[E, C], [E, C]]), Err(ShapeError::Untrimmed));
    }

    #[test]
    fn test_rotated_cw_moves_cells() {
        // L: ..#
        //    ###
        let l = Shape::new(&[[E, E, C], [C, C, C]]).unwrap();
        let rotated = l.rotated_cw();
        // #.
        // #.
        // ##
        assert_eq!((rotated.rows(), rotated.cols()), (3, 2));
        let cells: Vec<_> = rotated.filled_cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        let s = Shape::new(&[[E, C, C], [C, C, E]]).unwrap();
        let back = s.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        assert_eq!(back, s);
    }

    #[test]
    fn test_rotation_keeps_cell_count_and_trim() {
        let j = Shape::new(&[[C, E, E], [C, C, C]]).unwrap();
        let mut shape = j;
        for _ in 0..4 {
            shape = shape.rotated_cw();
            assert_eq!(shape.cell_count(), 4);
            assert!(shape.is_trimmed());
        }
    }

    #[test]
    fn test_serde_matrix_format() {
        let t = Shape::new(&[[E, C, E], [C, C, C]]).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "[[0,1,0],[1,1,1]]");
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);

        assert!(serde_json::from_str::<Shape>("[[0,2],[1,1]]").is_err());
        assert!(serde_json::from_str::<Shape>("[[1,1],[0,0]]").is_err());
        assert!(serde_json::from_str::<Shape>("[]").is_err());
    }
}
