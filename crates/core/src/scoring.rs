//! Scoring module - the sum-to-ten rule and time bonuses
//!
//! Rules:
//! - A selection matches when it is non-empty and its values sum to exactly 10.
//! - A match scores one point per removed cell.
//! - Time bonus is a step function of selection size: 3 cells earn +2s,
//!   4 or more earn +5s, anything smaller earns nothing.
//! - Bonus time never pushes the clock past the cap (999s).
//!
//! Everything here is pure so the round can call it on every pointer move for
//! live feedback, then once more on release to decide the commit.

use crate::board::Board;
use crate::selection::Selection;
use crate::types::{
    LARGE_BONUS_SECONDS, LARGE_BONUS_SIZE, MATCH_SUM, SMALL_BONUS_SECONDS, SMALL_BONUS_SIZE,
};

/// Time bonus table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBonus {
    /// Exact selection size that earns `small_seconds`
    pub small_size: usize,
    pub small_seconds: u32,
    /// Selection size from which `large_seconds` applies
    pub large_size: usize,
    pub large_seconds: u32,
}

impl Default for TimeBonus {
    fn default() -> Self {
        Self {
            small_size: SMALL_BONUS_SIZE,
            small_seconds: SMALL_BONUS_SECONDS,
            large_size: LARGE_BONUS_SIZE,
            large_seconds: LARGE_BONUS_SECONDS,
        }
    }
}

impl TimeBonus {
    pub fn seconds_for(&self, size: usize) -> u32 {
        if size >= self.large_size {
            self.large_seconds
        } else if size == self.small_size {
            self.small_seconds
        } else {
            0
        }
    }
}

/// Outcome of evaluating a selection against the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// Number of selected cells
    pub size: usize,
    pub sum: u32,
    pub is_match: bool,
    /// Seconds a commit of this selection would add (meaningful only on a match)
    pub bonus_seconds: u32,
}

/// Seconds earned by a match of `size` cells under the default table
pub fn bonus_seconds(size: usize) -> u32 {
    TimeBonus::default().seconds_for(size)
}

/// Sum of the selected values; empty or out-of-range cells count as 0
pub fn selection_sum(board: &Board, selection: &Selection) -> u32 {
    selection.iter().map(|c| board.value_or_zero(c)).sum()
}

/// Evaluate a selection with the default bonus table
pub fn evaluate(board: &Board, selection: &Selection) -> MatchResult {
    evaluate_with(board, selection, &TimeBonus::default())
}

/// Evaluate a selection with a custom bonus table
pub fn evaluate_with(board: &Board, selection: &Selection, bonus: &TimeBonus) -> MatchResult {
    let size = selection.len();
    let sum = selection_sum(board, selection);
    MatchResult {
        size,
        sum,
        is_match: size > 0 && sum == MATCH_SUM,
        bonus_seconds: bonus.seconds_for(size),
    }
}

/// Add bonus seconds to the clock without exceeding `cap`
pub fn apply_time_bonus(time_left: u32, bonus: u32, cap: u32) -> u32 {
    time_left.saturating_add(bonus).min(cap.max(time_left))
}

/// Fill ratio of the time bar: `time_left / round_seconds` clamped to [0, 1]
pub fn time_ratio(time_left: u32, round_seconds: u32) -> f32 {
    if round_seconds == 0 {
        return 0.0;
    }
    (time_left as f32 / round_seconds as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn sel(coords: &[(u16, u16)]) -> Selection {
        coords.iter().map(|&c| Coord::from(c)).collect()
    }

    #[test]
    fn test_bonus_step_function() {
        let expected = [0, 0, 0, 2, 5, 5, 5, 5];
        for (size, &want) in expected.iter().enumerate() {
            assert_eq!(bonus_seconds(size), want, "size {}", size);
        }
        assert_eq!(bonus_seconds(120), 5);
    }

    #[test]
    fn test_pair_summing_to_ten_matches_without_bonus() {
        let board = Board::from_rows(&[&[4, 6, 9]]);
        let r = evaluate(&board, &sel(&[(0, 0), (0, 1)]));
        assert_eq!(
            r,
            MatchResult {
                size: 2,
                sum: 10,
                is_match: true,
                bonus_seconds: 0
            }
        );
    }

    #[test]
    fn test_three_and_four_cell_matches() {
        let board = Board::from_rows(&[&[2, 3, 5], &[1, 2, 3], &[4, 0, 0]]);
        let three = evaluate(&board, &sel(&[(0, 0), (0, 1), (0, 2)]));
        assert!(three.is_match);
        assert_eq!(three.bonus_seconds, 2);

        let four = evaluate(&board, &sel(&[(1, 0), (1, 1), (1, 2), (2, 0)]));
        assert!(four.is_match);
        assert_eq!(four.bonus_seconds, 5);
    }

    #[test]
    fn test_wrong_sum_is_not_a_match() {
        let board = Board::from_rows(&[&[4, 5]]);
        let r = evaluate(&board, &sel(&[(0, 0), (0, 1)]));
        assert_eq!(r.sum, 9);
        assert!(!r.is_match);
    }

    #[test]
    fn test_empty_selection_is_not_a_match() {
        let board = Board::from_rows(&[&[4, 6]]);
        let r = evaluate(&board, &Selection::new());
        assert_eq!(r.sum, 0);
        assert!(!r.is_match);
    }

    #[test]
    fn test_empty_and_out_of_range_cells_count_as_zero() {
        let board = Board::from_rows(&[&[4, 0, 6]]);
        let r = evaluate(&board, &sel(&[(0, 0), (0, 1), (0, 2), (7, 7)]));
        assert_eq!(r.sum, 10);
        assert_eq!(r.size, 4);
    }

    #[test]
    fn test_custom_bonus_table() {
        let table = TimeBonus {
            small_size: 2,
            small_seconds: 1,
            large_size: 3,
            large_seconds: 10,
        };
        assert_eq!(table.seconds_for(1), 0);
        assert_eq!(table.seconds_for(2), 1);
        assert_eq!(table.seconds_for(9), 10);
    }

    #[test]
    fn test_apply_time_bonus_caps() {
        assert_eq!(apply_time_bonus(30, 5, 999), 35);
        assert_eq!(apply_time_bonus(997, 5, 999), 999);
        assert_eq!(apply_time_bonus(999, 2, 999), 999);
    }

    #[test]
    fn test_time_ratio_clamps() {
        assert_eq!(time_ratio(60, 60), 1.0);
        assert_eq!(time_ratio(30, 60), 0.5);
        assert_eq!(time_ratio(0, 60), 0.0);
        assert_eq!(time_ratio(120, 60), 1.0);
        assert_eq!(time_ratio(5, 0), 0.0);
    }
}
