//! Selection tests on the default 8x15 board laid over 840x480 pixels.
//!
//! Each cell is 56 px wide and 60 px tall.

use tui_apples::core::{select_cells, select_rect, Board, BoardGeometry, DragGesture, Selection, SimpleRng};
use tui_apples::types::{Coord, DragRect, Point, BOARD_COLS, BOARD_ROWS};

fn board() -> Board {
    Board::generate(BOARD_ROWS, BOARD_COLS, &mut SimpleRng::new(31))
}

fn center(row: u16, col: u16) -> Point {
    Point::new(col as f32 * 56.0 + 28.0, row as f32 * 60.0 + 30.0)
}

fn coords(sel: &Selection) -> Vec<(u16, u16)> {
    sel.iter().map(|c| (c.row, c.col)).collect()
}

#[test]
fn test_default_geometry_cell_size() {
    let geom = BoardGeometry::default();
    assert_eq!(geom.cell_size(BOARD_ROWS, BOARD_COLS), (56.0, 60.0));
    assert_eq!(geom.cell_at(center(3, 7), BOARD_ROWS, BOARD_COLS), Some(Coord::new(3, 7)));
    assert_eq!(geom.cell_at(Point::new(-1.0, 10.0), BOARD_ROWS, BOARD_COLS), None);
}

#[test]
fn test_click_selects_cell_under_pointer() {
    let board = board();
    let sel = select_cells(&board, &BoardGeometry::default(), center(5, 9), center(5, 9));
    assert_eq!(coords(&sel), vec![(5, 9)]);
}

#[test]
fn test_drag_covers_every_touched_cell() {
    let board = board();
    let geom = BoardGeometry::default();
    let sel = select_cells(&board, &geom, center(0, 0), center(1, 2));
    assert_eq!(
        coords(&sel),
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );

    // Same rectangle dragged the other way.
    let back = select_cells(&board, &geom, center(1, 2), center(0, 0));
    assert_eq!(sel, back);
}

#[test]
fn test_empty_cells_are_never_selected() {
    let mut board = board();
    board.clear([Coord::new(0, 1)]);
    let sel = select_cells(&board, &BoardGeometry::default(), center(0, 0), center(0, 2));
    assert_eq!(coords(&sel), vec![(0, 0), (0, 2)]);

    let click = select_cells(&board, &BoardGeometry::default(), center(0, 1), center(0, 1));
    assert!(click.is_empty());
}

#[test]
fn test_rect_off_the_board_selects_nothing() {
    let board = board();
    let rect = DragRect::from_points(Point::new(-200.0, -200.0), Point::new(-10.0, -10.0));
    assert!(select_rect(&board, &BoardGeometry::default(), rect).is_empty());
}

#[test]
fn test_gesture_follows_pointer() {
    let board = board();
    let geom = BoardGeometry::default();
    let mut gesture = DragGesture::new(center(2, 2));
    assert_eq!(gesture.select(&board, &geom).len(), 1);

    gesture.current = center(4, 5);
    assert_eq!(gesture.select(&board, &geom).len(), 3 * 4);
    assert_eq!(gesture.rect(), DragRect::from_points(center(2, 2), center(4, 5)));
}

#[test]
fn test_centroid_of_removed_pair() {
    let sel: Selection = [Coord::new(0, 0), Coord::new(0, 1)].into_iter().collect();
    let at = sel
        .centroid(&BoardGeometry::default(), BOARD_ROWS, BOARD_COLS)
        .unwrap();
    assert_eq!(at, Point::new(56.0, 30.0));
}
