//! Key and mouse mapping from terminal events to game actions.

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::types::{GameAction, ScreenLayout};

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => Some(GameAction::Start),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Map a mouse event to pointer actions in board-local coordinates.
///
/// - Left press on the board starts a drag.
/// - Left drag anywhere moves it (the rectangle may leave the board).
/// - Left release moves to the release cell, then ends the drag.
///
/// Presses outside the board and other buttons map to nothing.
pub fn map_mouse_event(ev: MouseEvent, layout: &ScreenLayout) -> ArrayVec<GameAction, 2> {
    let mut out = ArrayVec::new();
    let p = layout.to_board_point(ev.column, ev.row);

    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if layout.contains(ev.column, ev.row) {
                out.push(GameAction::PointerDown(p));
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            out.push(GameAction::PointerMove(p));
        }
        MouseEventKind::Up(MouseButton::Left) => {
            out.push(GameAction::PointerMove(p));
            out.push(GameAction::PointerUp);
        }
        _ => {}
    }

    out
}
