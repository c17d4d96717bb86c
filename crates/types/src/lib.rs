//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, adapter protocol).
//!
//! # Board Dimensions
//!
//! - **Rows**: 8 (indexed 0-7, top to bottom)
//! - **Columns**: 15 (indexed 0-14, left to right)
//! - **Cell values**: 1-9, or empty once removed
//!
//! Board-local coordinates are "pixels" of an 840x480 play area, so a cell is
//! 56 wide and 60 tall. Pointer input is always expressed in this space,
//! independent of how a front end actually draws the board.
//!
//! # Round Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `ROUND_SECONDS` | 60 | Time on the clock at round start |
//! | `TIME_CAP_SECONDS` | 999 | Bonus time never pushes the clock past this |
//! | `TICK_MS` | 1000 | One round tick per second |
//! | `FRAME_MS` | 16 | Front-end frame interval (~60 FPS) |
//!
//! # Time Bonus
//!
//! A match of exactly 3 cells adds 2 seconds, a match of 4 or more adds 5.
//! Smaller matches add nothing.
//!
//! # Examples
//!
//! ```
//! use tui_apples_types::{Coord, DragRect, Point, RoundPhase, BOARD_COLS, BOARD_ROWS};
//!
//! let rect = DragRect::from_points(Point::new(100.0, 40.0), Point::new(20.0, 10.0));
//! assert_eq!(rect.x, 20.0);
//! assert_eq!(rect.w, 80.0);
//!
//! assert!(Coord::new(0, 3) < Coord::new(1, 0));
//! assert_eq!(RoundPhase::from_str("playing"), Some(RoundPhase::Playing));
//! assert_eq!((BOARD_ROWS, BOARD_COLS), (8, 15));
//! ```

/// Board height in cells (8 rows)
pub const BOARD_ROWS: u16 = 8;

/// Board width in cells (15 columns)
pub const BOARD_COLS: u16 = 15;

/// Smallest value a fresh cell can hold
pub const MIN_CELL_VALUE: u8 = 1;

/// Largest value a fresh cell can hold
pub const MAX_CELL_VALUE: u8 = 9;

/// A selection matches when its values add up to exactly this
pub const MATCH_SUM: u32 = 10;

/// Seconds on the clock when a round starts
pub const ROUND_SECONDS: u32 = 60;

/// Upper bound for the clock after time bonuses
pub const TIME_CAP_SECONDS: u32 = 999;

/// Interval between round ticks in milliseconds
pub const TICK_MS: u32 = 1000;

/// Front-end frame interval in milliseconds
pub const FRAME_MS: u32 = 16;

/// Board-local width of the play area
pub const BOARD_WIDTH_PX: f32 = 840.0;

/// Board-local height of the play area
pub const BOARD_HEIGHT_PX: f32 = 480.0;

/// Selection size that earns the small time bonus
pub const SMALL_BONUS_SIZE: usize = 3;

/// Seconds added for a match of `SMALL_BONUS_SIZE` cells
pub const SMALL_BONUS_SECONDS: u32 = 2;

/// Selection size from which the large time bonus applies
pub const LARGE_BONUS_SIZE: usize = 4;

/// Seconds added for a match of `LARGE_BONUS_SIZE` or more cells
pub const LARGE_BONUS_SECONDS: u32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_layout_defaults() {
        assert_eq!(BOARD_ROWS, 8);
        assert_eq!(BOARD_COLS, 15);
        assert_eq!(BOARD_WIDTH_PX / BOARD_COLS as f32, 56.0);
        assert_eq!(BOARD_HEIGHT_PX / BOARD_ROWS as f32, 60.0);
        assert_eq!(ROUND_SECONDS, 60);
        assert_eq!(TIME_CAP_SECONDS, 999);
        assert_eq!(TICK_MS, 1000);
    }

    #[test]
    fn drag_rect_normalizes_corners() {
        let r = DragRect::from_points(Point::new(50.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(r, DragRect { x: 10.0, y: 5.0, w: 40.0, h: 20.0 });
        assert!(!r.is_degenerate());
        assert!(DragRect::from_points(Point::new(3.0, 3.0), Point::new(3.0, 3.0)).is_degenerate());
    }

    #[test]
    fn drag_rect_intersection_is_inclusive() {
        let r = DragRect::from_points(Point::new(56.0, 0.0), Point::new(56.0, 0.0));
        // Touches the right edge of the first cell and the left edge of the second.
        assert!(r.intersects(0.0, 0.0, 56.0, 60.0));
        assert!(r.intersects(56.0, 0.0, 112.0, 60.0));
        assert!(!r.intersects(112.0, 0.0, 168.0, 60.0));
    }

    #[test]
    fn screen_layout_maps_terminal_cells_into_board_cells() {
        let layout = ScreenLayout::new(10, 4, 3, 1, BOARD_ROWS, BOARD_COLS);
        assert_eq!(layout.width(), 45);
        assert_eq!(layout.height(), 8);

        // Every terminal column of board cell (2, 5) lands inside that cell.
        let (x0, y0) = layout.cell_origin(Coord::new(2, 5));
        for dx in 0..3 {
            let p = layout.to_board_point(x0 + dx, y0);
            assert_eq!((p.x / 56.0).floor() as u16, 5);
            assert_eq!((p.y / 60.0).floor() as u16, 2);
        }

        assert!(layout.contains(10, 4));
        assert!(!layout.contains(9, 4));
        assert!(!layout.contains(55, 4));

        // Left of the board maps to negative board-local x.
        assert!(layout.to_board_point(0, 4).x < 0.0);
    }
}

/// Grid coordinate of a board cell
///
/// Ordering is row-major (row first, then column), which keeps coordinate sets
/// iterating in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: u16,
    pub col: u16,
}

impl Coord {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl From<(u16, u16)> for Coord {
    fn from((row, col): (u16, u16)) -> Self {
        Self { row, col }
    }
}

/// A point in board-local pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned drag rectangle, normalized so `w` and `h` are never negative
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl DragRect {
    /// Build the rectangle spanned by two corner points (in any order)
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    /// Zero area: the pointer has not moved since it went down
    pub fn is_degenerate(&self) -> bool {
        self.w == 0.0 && self.h == 0.0
    }

    /// Inclusive-edge intersection test against another rectangle given by its edges
    ///
    /// Touching counts as intersecting.
    pub fn intersects(&self, left: f32, top: f32, right: f32, bottom: f32) -> bool {
        !(self.x > right || self.x + self.w < left || self.y > bottom || self.y + self.h < top)
    }
}

/// A cell on the board
///
/// - `None`: Empty cell (removed by a match)
/// - `Some(v)`: Cell holding value `v` in 1..=9
pub type Cell = Option<u8>;

/// Lifecycle phase of a round
///
/// - **Idle**: No round has been started yet
/// - **Playing**: Board active, clock ticking
/// - **Ended**: Clock ran out; board frozen and score final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundPhase {
    #[default]
    Idle,
    Playing,
    Ended,
}

impl RoundPhase {
    /// Parse phase from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Some(RoundPhase::Idle),
            "playing" => Some(RoundPhase::Playing),
            "ended" => Some(RoundPhase::Ended),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Playing => "playing",
            RoundPhase::Ended => "ended",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, RoundPhase::Playing)
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calls a front end (or remote adapter client) can make into the round
///
/// Pointer positions are in board-local pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameAction {
    /// Start a round (from the start screen)
    Start,
    /// Throw away the current round and start a fresh one
    Restart,
    /// Advance the round clock by one second
    Tick,
    /// Begin a drag gesture at a point
    PointerDown(Point),
    /// Move the active drag gesture to a point
    PointerMove(Point),
    /// Release the drag gesture and try to commit its selection
    PointerUp,
}

impl GameAction {
    /// Parse a payload-free action from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_apples_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("pointerUp"), Some(GameAction::PointerUp));
    /// assert_eq!(GameAction::from_str("pointerDown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(GameAction::Start),
            "restart" => Some(GameAction::Restart),
            "tick" => Some(GameAction::Tick),
            "pointerup" => Some(GameAction::PointerUp),
            _ => None,
        }
    }

    /// Convert to camelCase name (as used on the adapter wire)
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Start => "start",
            GameAction::Restart => "restart",
            GameAction::Tick => "tick",
            GameAction::PointerDown(_) => "pointerDown",
            GameAction::PointerMove(_) => "pointerMove",
            GameAction::PointerUp => "pointerUp",
        }
    }
}

/// Placement of the board on a character-cell screen
///
/// `origin_x`/`origin_y` is the screen position of the board's top-left cell
/// (inside any border). Each board cell covers `cell_w` x `cell_h` screen cells.
/// Shared by the renderer (to draw) and the input mapper (to translate mouse
/// positions into board-local points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub origin_x: u16,
    pub origin_y: u16,
    pub cell_w: u16,
    pub cell_h: u16,
    pub rows: u16,
    pub cols: u16,
    pub board_width_px: f32,
    pub board_height_px: f32,
}

impl ScreenLayout {
    pub fn new(origin_x: u16, origin_y: u16, cell_w: u16, cell_h: u16, rows: u16, cols: u16) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            rows,
            cols,
            board_width_px: BOARD_WIDTH_PX,
            board_height_px: BOARD_HEIGHT_PX,
        }
    }

    /// Board width in screen columns
    pub fn width(&self) -> u16 {
        self.cols.saturating_mul(self.cell_w)
    }

    /// Board height in screen rows
    pub fn height(&self) -> u16 {
        self.rows.saturating_mul(self.cell_h)
    }

    /// Screen position of the top-left screen cell of a board cell
    pub fn cell_origin(&self, coord: Coord) -> (u16, u16) {
        (
            self.origin_x.saturating_add(coord.col.saturating_mul(self.cell_w)),
            self.origin_y.saturating_add(coord.row.saturating_mul(self.cell_h)),
        )
    }

    /// Whether a screen cell lies on the board
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.origin_x
            && y >= self.origin_y
            && x - self.origin_x < self.width()
            && y - self.origin_y < self.height()
    }

    /// Board-local point at the center of a screen cell
    ///
    /// Screen cells off the board map to points outside `[0, width) x [0, height)`,
    /// which is fine for drag rectangles that leave the board.
    pub fn to_board_point(&self, x: u16, y: u16) -> Point {
        let local_x = x as f32 - self.origin_x as f32 + 0.5;
        let local_y = y as f32 - self.origin_y as f32 + 0.5;
        let px_per_col = self.board_width_px / self.width().max(1) as f32;
        let px_per_row = self.board_height_px / self.height().max(1) as f32;
        Point::new(local_x * px_per_col, local_y * px_per_row)
    }

    /// Screen position (column, row) of a board-local point
    pub fn to_screen(&self, p: Point) -> (f32, f32) {
        let col_per_px = self.width().max(1) as f32 / self.board_width_px;
        let row_per_px = self.height().max(1) as f32 / self.board_height_px;
        (
            self.origin_x as f32 + p.x * col_per_px,
            self.origin_y as f32 + p.y * row_per_px,
        )
    }
}
