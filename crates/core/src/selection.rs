//! Selection module - turns a drag rectangle into a set of board cells
//!
//! Cells are laid out on a fixed board-local pixel area (`BoardGeometry`).
//! A cell is selected when its rectangle touches the drag rectangle
//! (inclusive edges, like rubber-band selection in most UIs) and it still
//! holds a value. Selection is recomputed from scratch on every pointer move;
//! nothing here mutates the board.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::{Coord, DragRect, Point, BOARD_HEIGHT_PX, BOARD_WIDTH_PX};

/// Pixel size of the play area that pointer coordinates refer to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub width_px: f32,
    pub height_px: f32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            width_px: BOARD_WIDTH_PX,
            height_px: BOARD_HEIGHT_PX,
        }
    }
}

impl BoardGeometry {
    pub fn new(width_px: f32, height_px: f32) -> Self {
        Self { width_px, height_px }
    }

    /// Width and height of one cell on a `rows x cols` board
    pub fn cell_size(&self, rows: u16, cols: u16) -> (f32, f32) {
        (
            self.width_px / cols.max(1) as f32,
            self.height_px / rows.max(1) as f32,
        )
    }

    /// Edges `(left, top, right, bottom)` of a cell
    pub fn cell_rect(&self, coord: Coord, rows: u16, cols: u16) -> (f32, f32, f32, f32) {
        let (cw, ch) = self.cell_size(rows, cols);
        let left = coord.col as f32 * cw;
        let top = coord.row as f32 * ch;
        (left, top, left + cw, top + ch)
    }

    /// Center point of a cell
    pub fn cell_center(&self, coord: Coord, rows: u16, cols: u16) -> Point {
        let (cw, ch) = self.cell_size(rows, cols);
        Point::new((coord.col as f32 + 0.5) * cw, (coord.row as f32 + 0.5) * ch)
    }

    /// Cell whose rectangle contains `p` (left/top edges inclusive)
    pub fn cell_at(&self, p: Point, rows: u16, cols: u16) -> Option<Coord> {
        let (cw, ch) = self.cell_size(rows, cols);
        if !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        let col = (p.x / cw).floor();
        let row = (p.y / ch).floor();
        if col >= cols as f32 || row >= rows as f32 {
            return None;
        }
        Some(Coord::new(row as u16, col as u16))
    }
}

/// A set of board coordinates, iterated in row-major order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    cells: BTreeSet<Coord>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Add a coordinate; returns false if it was already present
    pub fn insert(&mut self, coord: Coord) -> bool {
        self.cells.insert(coord)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    /// Coordinates in row-major order
    pub fn to_vec(&self) -> Vec<Coord> {
        self.cells.iter().copied().collect()
    }

    /// Mean of the selected cells' centers (where a "+N" popup goes)
    pub fn centroid(&self, geometry: &BoardGeometry, rows: u16, cols: u16) -> Option<Point> {
        if self.cells.is_empty() {
            return None;
        }
        let n = self.cells.len() as f32;
        let (sx, sy) = self
            .cells
            .iter()
            .map(|&c| geometry.cell_center(c, rows, cols))
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

impl FromIterator<Coord> for Selection {
    fn from_iter<T: IntoIterator<Item = Coord>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = Coord;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Coord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().copied()
    }
}

/// In-progress pointer drag: where it started and where it is now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub anchor: Point,
    pub current: Point,
}

impl DragGesture {
    pub fn new(anchor: Point) -> Self {
        Self {
            anchor,
            current: anchor,
        }
    }

    pub fn rect(&self) -> DragRect {
        DragRect::from_points(self.anchor, self.current)
    }

    /// Cells selected by this gesture right now
    pub fn select(&self, board: &Board, geometry: &BoardGeometry) -> Selection {
        select_cells(board, geometry, self.anchor, self.current)
    }
}

/// Non-empty cells touched by `rect` (inclusive edges)
pub fn select_rect(board: &Board, geometry: &BoardGeometry, rect: DragRect) -> Selection {
    let (rows, cols) = (board.rows(), board.cols());
    board
        .iter()
        .filter(|&(_, cell)| cell.is_some())
        .filter(|&(coord, _)| {
            let (l, t, r, b) = geometry.cell_rect(coord, rows, cols);
            rect.intersects(l, t, r, b)
        })
        .map(|(coord, _)| coord)
        .collect()
}

/// Cells selected by a drag from `anchor` to `current`
///
/// A click (zero-size rectangle) always selects the non-empty cell under the
/// anchor, even where float edges would make the degenerate rectangle miss it.
pub fn select_cells(board: &Board, geometry: &BoardGeometry, anchor: Point, current: Point) -> Selection {
    let rect = DragRect::from_points(anchor, current);
    let mut selection = select_rect(board, geometry, rect);
    if rect.is_degenerate() {
        if let Some(coord) = geometry.cell_at(anchor, board.rows(), board.cols()) {
            if board.is_filled(coord) {
                selection.insert(coord);
            }
        }
    }
    selection
}
