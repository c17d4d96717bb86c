//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: `GameView` paints a
//! [`core::RoundSnapshot`] into a framebuffer and `TerminalRenderer` flushes
//! framebuffers to the terminal with per-frame diffing. No widget toolkit.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Share one `ScreenLayout` between drawing and mouse mapping
//! - Allow precise control over aspect ratio (3 chars wide per cell)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_apples_core as core;
pub use tui_apples_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, AnchorY, GameView, Hud, ScorePopup, Viewport, POPUP_FRAMES};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
