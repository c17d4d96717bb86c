//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into [`crate::types::GameAction`]s.
//! Mouse positions are translated from terminal cells into board-local pixels
//! through the same [`crate::types::ScreenLayout`] the renderer draws with.

pub mod map;

pub use tui_apples_types as types;

pub use map::{handle_key_event, map_mouse_event, should_quit};
