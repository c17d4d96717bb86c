//! Board module - manages the grid of numbered cells
//!
//! The board is a `rows x cols` grid (8x15 by default) where each cell holds a
//! digit 1-9 or is empty after being matched away.
//! Uses a flat vector in row-major order (`row * cols + col`) for O(1) lookup.
//! Coordinates: `Coord { row, col }` with row 0 at the top and col 0 at the left.

use crate::error::RoundError;
use crate::rng::SimpleRng;
use crate::types::{Cell, Coord, MAX_CELL_VALUE, MIN_CELL_VALUE};

/// The game board using flat row-major storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: u16,
    cols: u16,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board with every cell empty
    pub fn empty(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    /// Fill a fresh board with uniform-random digits 1-9
    pub fn generate(rows: u16, cols: u16, rng: &mut SimpleRng) -> Self {
        Self::generate_in_range(rows, cols, MIN_CELL_VALUE, MAX_CELL_VALUE, rng)
    }

    /// Fill a fresh board with uniform-random values in `[min, max]`
    pub fn generate_in_range(rows: u16, cols: u16, min: u8, max: u8, rng: &mut SimpleRng) -> Self {
        let mut board = Self::empty(rows, cols);
        for cell in &mut board.cells {
            *cell = Some(rng.next_inclusive(min, max));
        }
        board
    }

    /// Build a board from rows of values, `0` meaning empty
    ///
    /// The width is taken from the first row; shorter rows are padded with
    /// empty cells and longer rows are truncated.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len() as u16;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u16;
        let mut board = Self::empty(height, width);
        for (r, values) in rows.iter().enumerate() {
            for (c, &v) in values.iter().take(width as usize).enumerate() {
                let cell = if v == 0 { None } else { Some(v) };
                board.set(Coord::new(r as u16, c as u16), cell);
            }
        }
        board
    }

    #[inline(always)]
    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        Some(coord.row as usize * self.cols as usize + coord.col as usize)
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    /// Get cell at `coord`
    /// Returns None if out of bounds
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Get cell at `coord`, reporting out-of-range coordinates as an error
    pub fn value_at(&self, coord: Coord) -> Result<Cell, RoundError> {
        self.get(coord).ok_or(RoundError::OutOfRangeCoordinate {
            row: coord.row,
            col: coord.col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Numeric value at `coord`, counting empty and out-of-range cells as 0
    pub fn value_or_zero(&self, coord: Coord) -> u32 {
        self.get(coord).flatten().map(u32::from).unwrap_or(0)
    }

    /// Check if position is in bounds and holds a value
    pub fn is_filled(&self, coord: Coord) -> bool {
        matches!(self.get(coord), Some(Some(_)))
    }

    /// Set cell at `coord`
    /// Returns false if out of bounds
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        match self.index(coord) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Empty every listed cell
    ///
    /// Already-empty and out-of-range coordinates are skipped. Returns how many
    /// cells actually went from filled to empty.
    pub fn clear<I>(&mut self, coords: I) -> usize
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut cleared = 0;
        for coord in coords {
            if let Some(idx) = self.index(coord) {
                if self.cells[idx].take().is_some() {
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Number of cells still holding a value
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells slice
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate all cells in row-major order with their coordinates
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let cols = self.cols.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (Coord::new((i / cols) as u16, (i % cols) as u16), cell))
    }

    /// Write the grid as bytes (`0` = empty) into `out`, reusing its allocation
    pub fn write_u8_grid(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|c| c.unwrap_or(0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::empty(8, 15);
        assert_eq!(board.rows(), 8);
        assert_eq!(board.cols(), 15);
        assert_eq!(board.cells().len(), 120);
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_generate_fills_every_cell_with_a_digit() {
        let mut rng = SimpleRng::new(42);
        let board = Board::generate(8, 15, &mut rng);
        assert_eq!(board.filled_count(), 120);
        assert!(board
            .cells()
            .iter()
            .all(|c| matches!(c, Some(v) if (1..=9).contains(v))));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = Board::generate(8, 15, &mut SimpleRng::new(2024));
        let b = Board::generate(8, 15, &mut SimpleRng::new(2024));
        let c = Board::generate(8, 15, &mut SimpleRng::new(2025));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_at_out_of_range() {
        let board = Board::empty(2, 3);
        assert_eq!(board.value_at(Coord::new(1, 2)), Ok(None));
        assert_eq!(
            board.value_at(Coord::new(2, 0)),
            Err(RoundError::OutOfRangeCoordinate {
                row: 2,
                col: 0,
                rows: 2,
                cols: 3
            })
        );
        assert!(board.value_at(Coord::new(0, 3)).is_err());
    }

    #[test]
    fn test_from_rows_and_index_layout() {
        let board = Board::from_rows(&[&[4, 6, 0], &[1, 2, 3]]);
        assert_eq!(board.get(Coord::new(0, 0)), Some(Some(4)));
        assert_eq!(board.get(Coord::new(0, 2)), Some(None));
        assert_eq!(board.get(Coord::new(1, 2)), Some(Some(3)));
        assert_eq!(board.cells()[4], Some(2));
        assert_eq!(board.value_or_zero(Coord::new(0, 2)), 0);
        assert_eq!(board.value_or_zero(Coord::new(5, 5)), 0);
    }

    #[test]
    fn test_clear_skips_empty_and_out_of_range() {
        let mut board = Board::from_rows(&[&[4, 6, 0]]);
        let cleared = board.clear([
            Coord::new(0, 0),
            Coord::new(0, 2),
            Coord::new(3, 3),
            Coord::new(0, 0),
        ]);
        assert_eq!(cleared, 1);
        assert!(!board.is_filled(Coord::new(0, 0)));
        assert!(board.is_filled(Coord::new(0, 1)));
    }

    #[test]
    fn test_iter_reports_coordinates_row_major() {
        let board = Board::from_rows(&[&[1, 2], &[3, 4]]);
        let all: Vec<_> = board.iter().collect();
        assert_eq!(all[0], (Coord::new(0, 0), Some(1)));
        assert_eq!(all[1], (Coord::new(0, 1), Some(2)));
        assert_eq!(all[2], (Coord::new(1, 0), Some(3)));
    }

    #[test]
    fn test_write_u8_grid_reuses_buffer() {
        let board = Board::from_rows(&[&[5, 0, 5]]);
        let mut out = vec![9; 10];
        board.write_u8_grid(&mut out);
        assert_eq!(out, vec![5, 0, 5]);
    }
}
