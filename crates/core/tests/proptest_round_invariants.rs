//! Property-based invariant tests for the selection engine and the round.
//!
//! 1. A non-empty selection matches exactly when it sums to 10.
//! 2. The time bonus depends only on selection size.
//! 3. Selecting the same rectangle twice gives the same cells.
//! 4. A click inside a filled cell selects exactly that cell.
//! 5. A non-matching commit changes nothing.
//! 6. A matching commit empties exactly the selected cells and pays out.

use proptest::prelude::*;
use tui_apples_core::types::{Coord, Point};
use tui_apples_core::{
    bonus_seconds, evaluate, select_cells, Board, BoardGeometry, Round, RoundConfig, Selection,
    SimpleRng,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn seeded_board(seed: u32) -> Board {
    Board::generate(8, 15, &mut SimpleRng::new(seed))
}

fn coord() -> impl Strategy<Value = Coord> {
    (0u16..8, 0u16..15).prop_map(|(r, c)| Coord::new(r, c))
}

fn selection() -> impl Strategy<Value = Selection> {
    proptest::collection::btree_set(coord(), 1..8).prop_map(|s| s.into_iter().collect())
}

fn point() -> impl Strategy<Value = Point> {
    (-50.0f32..900.0, -50.0f32..540.0).prop_map(|(x, y)| Point::new(x, y))
}

fn playing_round(seed: u32) -> Round {
    let mut round = Round::new(RoundConfig::default().with_seed(seed));
    round.start();
    round.drain_events().for_each(drop);
    round
}

proptest! {
    #[test]
    fn match_iff_sum_is_ten(seed in any::<u32>(), sel in selection()) {
        let board = seeded_board(seed);
        let result = evaluate(&board, &sel);
        prop_assert_eq!(result.is_match, result.sum == 10);
        prop_assert_eq!(result.size, sel.len());
    }
}

proptest! {
    #[test]
    fn bonus_is_a_step_function_of_size(size in 0usize..200) {
        let expected = match size {
            0..=2 => 0,
            3 => 2,
            _ => 5,
        };
        prop_assert_eq!(bonus_seconds(size), expected);
    }
}

proptest! {
    #[test]
    fn selection_is_idempotent(seed in any::<u32>(), a in point(), b in point()) {
        let board = seeded_board(seed);
        let geometry = BoardGeometry::default();
        let first = select_cells(&board, &geometry, a, b);
        let second = select_cells(&board, &geometry, a, b);
        prop_assert_eq!(&first, &second);
        for c in first.iter() {
            prop_assert!(board.is_filled(c));
        }
    }
}

proptest! {
    #[test]
    fn click_inside_cell_selects_that_cell(
        seed in any::<u32>(),
        c in coord(),
        fx in 0.05f32..0.95,
        fy in 0.05f32..0.95,
    ) {
        let board = seeded_board(seed);
        let geometry = BoardGeometry::default();
        let p = Point::new((c.col as f32 + fx) * 56.0, (c.row as f32 + fy) * 60.0);
        let sel = select_cells(&board, &geometry, p, p);
        prop_assert_eq!(sel.to_vec(), vec![c]);
    }
}

proptest! {
    #[test]
    fn commit_pays_out_only_on_match(seed in any::<u32>(), sel in selection(), ticks in 0u32..30) {
        let mut round = playing_round(seed);
        for _ in 0..ticks {
            round.tick();
        }
        round.drain_events().for_each(drop);
        let board = round.board().clone();
        let time_before = round.time_left();

        let result = round.commit_selection(&sel);
        prop_assert!(result.is_some());
        let result = result.unwrap_or_default();

        if result.is_match {
            prop_assert_eq!(round.score(), sel.len() as u32);
            prop_assert_eq!(round.time_left(), (time_before + bonus_seconds(sel.len())).min(999));
            for (c, cell) in round.board().iter() {
                prop_assert_eq!(cell.is_none(), sel.contains(c));
            }
        } else {
            prop_assert_eq!(round.board(), &board);
            prop_assert_eq!(round.score(), 0);
            prop_assert_eq!(round.time_left(), time_before);
            prop_assert!(!round.has_events());
        }
    }
}
