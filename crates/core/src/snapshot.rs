use std::fmt;

use crate::scoring::MatchResult;
use crate::types::{Coord, DragRect, RoundPhase, BOARD_COLS, BOARD_ROWS, ROUND_SECONDS};

/// Read-only copy of everything a renderer or observer needs from a round
///
/// `cells` is row-major with `0` for an empty cell. Reuse one snapshot across
/// frames with `Round::snapshot_into` to avoid reallocating the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub rows: u16,
    pub cols: u16,
    pub cells: Vec<u8>,
    pub phase: RoundPhase,
    pub round_id: u32,
    pub seed: u32,
    pub score: u32,
    pub time_left: u32,
    pub round_seconds: u32,
    pub time_ratio: f32,
    pub selection: Vec<Coord>,
    pub drag: Option<DragRect>,
    /// Live evaluation of `selection`
    pub preview: MatchResult,
}

impl RoundSnapshot {
    pub fn clear(&mut self) {
        self.rows = BOARD_ROWS;
        self.cols = BOARD_COLS;
        self.cells.clear();
        self.phase = RoundPhase::Idle;
        self.round_id = 0;
        self.seed = 0;
        self.score = 0;
        self.time_left = ROUND_SECONDS;
        self.round_seconds = ROUND_SECONDS;
        self.time_ratio = 1.0;
        self.selection.clear();
        self.drag = None;
        self.preview = MatchResult::default();
    }

    /// Value at `coord`; `None` when empty or out of range
    pub fn cell(&self, coord: Coord) -> Option<u8> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        let idx = coord.row as usize * self.cols as usize + coord.col as usize;
        self.cells.get(idx).copied().filter(|&v| v != 0)
    }

    pub fn is_selected(&self, coord: Coord) -> bool {
        self.selection.binary_search(&coord).is_ok()
    }

    pub fn playable(&self) -> bool {
        self.phase.is_playing()
    }

    pub fn status(&self) -> StatusLine {
        StatusLine {
            playing: self.playable(),
            time_left: self.time_left,
            score: self.score,
            selected: self.preview.size,
            sum: self.preview.sum,
        }
    }
}

impl Default for RoundSnapshot {
    fn default() -> Self {
        let mut s = Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            phase: RoundPhase::Idle,
            round_id: 0,
            seed: 0,
            score: 0,
            time_left: 0,
            round_seconds: 0,
            time_ratio: 0.0,
            selection: Vec::new(),
            drag: None,
            preview: MatchResult::default(),
        };
        s.clear();
        s
    }
}

/// One-line round summary shown under the board
///
/// Renders as `state:playing  time:42s  score:10  selected:2 sum:10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub playing: bool,
    pub time_left: u32,
    pub score: u32,
    pub selected: usize,
    pub sum: u32,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state:{}  time:{}s  score:{}  selected:{} sum:{}",
            if self.playing { "playing" } else { "stopped" },
            self.time_left,
            self.score,
            self.selected,
            self.sum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_idle() {
        let s = RoundSnapshot::default();
        assert_eq!(s.phase, RoundPhase::Idle);
        assert!(!s.playable());
        assert_eq!(s.time_left, 60);
        assert!(s.cells.is_empty());
        assert_eq!(s.cell(Coord::new(0, 0)), None);
    }

    #[test]
    fn status_line_format() {
        let status = StatusLine {
            playing: true,
            time_left: 42,
            score: 10,
            selected: 2,
            sum: 10,
        };
        assert_eq!(
            status.to_string(),
            "state:playing  time:42s  score:10  selected:2 sum:10"
        );

        let stopped = StatusLine { playing: false, ..status };
        assert!(stopped.to_string().starts_with("state:stopped"));
    }

    #[test]
    fn cell_lookup_treats_zero_as_empty() {
        let mut s = RoundSnapshot::default();
        s.rows = 1;
        s.cols = 3;
        s.cells = vec![4, 0, 6];
        assert_eq!(s.cell(Coord::new(0, 0)), Some(4));
        assert_eq!(s.cell(Coord::new(0, 1)), None);
        assert_eq!(s.cell(Coord::new(0, 5)), None);
    }
}
