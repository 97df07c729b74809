//! Rectangular boards addressed by zero-based `(row, col)`.
//!
//! Every access is bounds-checked and an out-of-range coordinate is a
//! `PrimitiveError::OutOfBounds`, never a silent clamp or wrap. A stored
//! board whose cell count disagrees with its dimensions fails to deserialize.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::error::PrimitiveError;

/// A `rows x cols` grid of cells, stored row-major.
///
/// ## Example
///
/// ```
/// use bgf::primitives::Board;
///
/// let mut board: Board<u8> = Board::new(2, 3, |row, col| (row * 3 + col) as u8);
/// assert_eq!(*board.get(1, 2).unwrap(), 5);
///
/// board.set(0, 0, 9).unwrap();
/// assert_eq!(*board.get(0, 0).unwrap(), 9);
///
/// assert!(board.get(2, 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoardData<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Board<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// Wire form of a [`Board`], checked before it becomes one.
#[derive(Deserialize)]
struct BoardData<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> TryFrom<BoardData<T>> for Board<T> {
    type Error = PrimitiveError;

    fn try_from(data: BoardData<T>) -> Result<Self, Self::Error> {
        let BoardData { rows, cols, cells } = data;
        match rows.checked_mul(cols) {
            Some(expected) if expected == cells.len() => Ok(Self { rows, cols, cells }),
            _ => Err(PrimitiveError::Inconsistent {
                kind: "board",
                reason: format!("{rows}x{cols} board holds {} cells", cells.len()),
            }),
        }
    }
}

impl<T> Board<T> {
    /// Create a board, filling each cell from `fill(row, col)`.
    pub fn new(rows: usize, cols: usize, mut fill: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(fill(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `(row, col)` lies on the board.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> PrimitiveError {
        PrimitiveError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize, PrimitiveError> {
        if self.contains(row, col) {
            Ok(row * self.cols + col)
        } else {
            Err(self.out_of_bounds(row, col))
        }
    }

    /// Borrow the cell at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<&T, PrimitiveError> {
        let at = self.offset(row, col)?;
        self.cells.get(at).ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Mutably borrow the cell at `(row, col)`.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut T, PrimitiveError> {
        let at = self.offset(row, col)?;
        let missing = self.out_of_bounds(row, col);
        self.cells.get_mut(at).ok_or(missing)
    }

    /// Replace the cell at `(row, col)`, returning the previous value.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<T, PrimitiveError> {
        let cell = self.get_mut(row, col)?;
        Ok(std::mem::replace(cell, value))
    }

    /// Iterate over `(row, col, &cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / cols, i % cols, cell))
    }
}

/// A token placed on a board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamePiece {
    pub id: String,
    pub kind: String,
    pub owner: Option<PlayerId>,
}

/// A board cell that can be face down and can hold a stack of pieces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell<P> {
    pub pieces: Vec<P>,
    pub face_down: bool,
}

impl<P> Cell<P> {
    /// An empty, face-down cell.
    #[must_use]
    pub fn face_down() -> Self {
        Self {
            pieces: Vec::new(),
            face_down: true,
        }
    }

    /// An empty, face-up cell.
    #[must_use]
    pub fn face_up() -> Self {
        Self {
            pieces: Vec::new(),
            face_down: false,
        }
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !self.pieces.is_empty()
    }
}

/// A board of [`Cell`]s: the usual tile-flipping, piece-placing grid.
pub type SquareBoard<P> = Board<Cell<P>>;

impl<P> Board<Cell<P>> {
    /// Turn the cell at `(row, col)` face down or face up.
    pub fn flip(&mut self, row: usize, col: usize, face_down: bool) -> Result<(), PrimitiveError> {
        self.get_mut(row, col)?.face_down = face_down;
        Ok(())
    }

    /// Put a piece on top of the cell at `(row, col)`.
    pub fn place_piece(&mut self, row: usize, col: usize, piece: P) -> Result<(), PrimitiveError> {
        self.get_mut(row, col)?.pieces.push(piece);
        Ok(())
    }
}
