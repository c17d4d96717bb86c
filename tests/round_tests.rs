//! Round tests - whole rounds played through pointer calls on the default
//! 8x15 board (56x60 px cells).

use tui_apples::core::{Board, Round, RoundConfig, RoundEvent, Selection};
use tui_apples::types::{Coord, GameAction, Point, RoundPhase, BOARD_COLS, BOARD_ROWS};

fn center(row: u16, col: u16) -> Point {
    Point::new(col as f32 * 56.0 + 28.0, row as f32 * 60.0 + 30.0)
}

/// A playing round whose board is all ones except for `values`.
fn round_with(values: &[((u16, u16), u8)]) -> Round {
    let mut board = Board::generate_in_range(BOARD_ROWS, BOARD_COLS, 1, 1, &mut Default::default());
    for &((r, c), v) in values {
        board.set(Coord::new(r, c), Some(v));
    }
    let mut round = Round::new(RoundConfig::default().with_seed(3));
    assert!(round.start());
    round.replace_board(board);
    round.drain_events().for_each(drop);
    round
}

fn drag(round: &mut Round, from: (u16, u16), to: (u16, u16)) -> Option<tui_apples::core::MatchResult> {
    round.pointer_down(center(from.0, from.1));
    round.pointer_move(center(to.0, to.1));
    round.pointer_up()
}

#[test]
fn test_pair_drag_clears_and_scores() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6)]);

    let result = drag(&mut round, (0, 0), (0, 1)).expect("drag selected cells");
    assert!(result.is_match);
    assert_eq!(result.size, 2);
    assert_eq!(round.score(), 2);
    assert_eq!(round.time_left(), 60);
    assert_eq!(round.board().get(Coord::new(0, 0)), Some(None));
    assert_eq!(round.board().get(Coord::new(0, 1)), Some(None));
    assert!(round.selection().is_empty());

    let events: Vec<RoundEvent> = round.drain_events().collect();
    assert!(events.contains(&RoundEvent::CellsRemoved {
        cells: vec![Coord::new(0, 0), Coord::new(0, 1)],
        count: 2,
    }));
    assert!(events.contains(&RoundEvent::ScoreChanged(2)));
    assert!(!events.iter().any(|e| matches!(e, RoundEvent::TimeChanged(_))));
    assert_eq!(events.last(), Some(&RoundEvent::SelectionChanged(Selection::new())));
}

#[test]
fn test_bigger_matches_add_time() {
    let mut round = round_with(&[
        ((1, 0), 2),
        ((1, 1), 3),
        ((1, 2), 5),
        ((3, 0), 1),
        ((3, 1), 2),
        ((4, 0), 3),
        ((4, 1), 4),
    ]);

    assert!(drag(&mut round, (1, 0), (1, 2)).unwrap().is_match);
    assert_eq!(round.time_left(), 62);

    assert!(drag(&mut round, (3, 0), (4, 1)).unwrap().is_match);
    assert_eq!(round.time_left(), 67);
    assert_eq!(round.score(), 7);
}

#[test]
fn test_wrong_sum_changes_nothing() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 5)]);
    let before = round.board().clone();

    let result = drag(&mut round, (0, 0), (0, 1)).unwrap();
    assert!(!result.is_match);
    assert_eq!(result.sum, 9);
    assert_eq!(round.board(), &before);
    assert_eq!(round.score(), 0);
    assert!(round.selection().is_empty());
}

#[test]
fn test_emptied_cells_are_skipped_by_later_drags() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6), ((0, 2), 9)]);
    assert!(drag(&mut round, (0, 0), (0, 1)).unwrap().is_match);

    // Dragging across the hole picks up only (0,2) and the ones beside it.
    round.pointer_down(center(0, 0));
    round.pointer_move(center(0, 3));
    let selected: Vec<Coord> = round.selection().iter().collect();
    assert_eq!(selected, vec![Coord::new(0, 2), Coord::new(0, 3)]);
    assert!(round.pointer_up().unwrap().is_match);
    assert_eq!(round.score(), 4);
}

#[test]
fn test_clock_runs_out_and_freezes_round() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6)]);

    assert_eq!(round.advance(999), 0);
    assert_eq!(round.time_left(), 60);
    assert_eq!(round.advance(1), 1);
    assert_eq!(round.time_left(), 59);

    round.pointer_down(center(0, 0));
    assert_eq!(round.advance(59_000), 59);
    assert_eq!(round.phase(), RoundPhase::Ended);
    assert_eq!(round.time_left(), 0);
    assert!(round.drag_rect().is_none());

    let events: Vec<RoundEvent> = round.drain_events().collect();
    assert_eq!(events.last(), Some(&RoundEvent::RoundEnded { final_score: 0 }));

    // Nothing moves once the round is over.
    assert!(!round.pointer_down(center(0, 0)));
    assert!(!round.tick());
    assert_eq!(round.advance(5_000), 0);
    let all: Selection = [Coord::new(0, 0), Coord::new(0, 1)].into_iter().collect();
    assert_eq!(round.commit_selection(&all), None);
    assert!(!round.has_events());
}

#[test]
fn test_restart_gives_a_fresh_round() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6)]);
    drag(&mut round, (0, 0), (0, 1));
    round.advance(2_500);
    let first_id = round.round_id();

    assert!(round.apply_action(GameAction::Restart));
    assert_eq!(round.phase(), RoundPhase::Playing);
    assert_eq!(round.round_id(), first_id + 1);
    assert_eq!(round.score(), 0);
    assert_eq!(round.time_left(), 60);
    assert_eq!(round.board().filled_count(), (BOARD_ROWS * BOARD_COLS) as usize);

    // The half second carried before the restart is gone.
    assert_eq!(round.advance(999), 0);
}

#[test]
fn test_status_line_text() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6)]);
    round.pointer_down(center(0, 0));
    round.pointer_move(center(0, 1));
    assert_eq!(
        round.status().to_string(),
        "state:playing  time:60s  score:0  selected:2 sum:10"
    );

    let idle = Round::new(RoundConfig::default());
    assert_eq!(
        idle.status().to_string(),
        "state:stopped  time:60s  score:0  selected:0 sum:0"
    );
}

#[test]
fn test_snapshot_carries_drag_and_preview() {
    let mut round = round_with(&[((0, 0), 4), ((0, 1), 6)]);
    round.pointer_down(center(0, 0));
    round.pointer_move(center(0, 1));

    let snap = round.snapshot();
    assert!(snap.playable());
    assert_eq!(snap.cell(Coord::new(0, 0)), Some(4));
    assert!(snap.is_selected(Coord::new(0, 1)));
    assert!(!snap.is_selected(Coord::new(1, 1)));
    assert!(snap.preview.is_match);
    assert!(snap.drag.is_some());
    assert_eq!(snap.time_ratio, 1.0);
}
