//! Board tests - generation, lookups and clearing through the public API

use tui_apples::core::{Board, Round, RoundConfig, RoundError, SimpleRng};
use tui_apples::types::{Coord, BOARD_COLS, BOARD_ROWS, MAX_CELL_VALUE, MIN_CELL_VALUE};

#[test]
fn test_default_round_board_is_full_of_digits() {
    let round = Round::new(RoundConfig::default().with_seed(77));
    let board = round.board();
    assert_eq!(board.rows(), BOARD_ROWS);
    assert_eq!(board.cols(), BOARD_COLS);
    assert_eq!(board.filled_count(), (BOARD_ROWS * BOARD_COLS) as usize);

    for (coord, cell) in board.iter() {
        let v = cell.unwrap_or_else(|| panic!("cell {:?} should be filled", coord));
        assert!((MIN_CELL_VALUE..=MAX_CELL_VALUE).contains(&v));
    }
}

#[test]
fn test_generation_depends_only_on_seed() {
    let a = Board::generate(BOARD_ROWS, BOARD_COLS, &mut SimpleRng::new(5));
    let b = Board::generate(BOARD_ROWS, BOARD_COLS, &mut SimpleRng::new(5));
    let c = Board::generate(BOARD_ROWS, BOARD_COLS, &mut SimpleRng::new(6));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_value_at_reports_out_of_range() {
    let board = Board::empty(BOARD_ROWS, BOARD_COLS);
    assert_eq!(board.value_at(Coord::new(0, 0)), Ok(None));
    assert_eq!(
        board.value_at(Coord::new(BOARD_ROWS, 0)),
        Err(RoundError::OutOfRangeCoordinate {
            row: BOARD_ROWS,
            col: 0,
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
        })
    );
    assert!(board.value_at(Coord::new(0, BOARD_COLS)).is_err());
    assert_eq!(board.get(Coord::new(0, BOARD_COLS)), None);
}

#[test]
fn test_set_and_clear() {
    let mut board = Board::empty(2, 3);
    assert!(board.set(Coord::new(1, 2), Some(7)));
    assert!(!board.set(Coord::new(2, 0), Some(7)));
    assert_eq!(board.get(Coord::new(1, 2)), Some(Some(7)));
    assert!(board.is_filled(Coord::new(1, 2)));

    // Empty and out-of-range coordinates are not counted.
    let cleared = board.clear([Coord::new(1, 2), Coord::new(0, 0), Coord::new(5, 5)]);
    assert_eq!(cleared, 1);
    assert_eq!(board.filled_count(), 0);
}

#[test]
fn test_u8_grid_uses_zero_for_empty() {
    let mut board = Board::from_rows(&[&[3, 0], &[0, 9]]);
    let mut out = vec![42; 10];
    board.write_u8_grid(&mut out);
    assert_eq!(out, vec![3, 0, 0, 9]);

    board.clear([Coord::new(0, 0)]);
    board.write_u8_grid(&mut out);
    assert_eq!(out, vec![0, 0, 0, 9]);
}

#[test]
fn test_rng_inclusive_range_hits_both_ends() {
    let mut rng = SimpleRng::new(123);
    let mut seen = [false; 10];
    for _ in 0..2000 {
        let v = rng.next_inclusive(MIN_CELL_VALUE, MAX_CELL_VALUE);
        assert!((1..=9).contains(&v));
        seen[v as usize] = true;
    }
    assert!(seen[1] && seen[9]);
}
