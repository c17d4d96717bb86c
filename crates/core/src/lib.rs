//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the rules of the sum-to-ten puzzle: the board, the
//! drag selection engine, the match evaluator and the round state machine.
//! It has no dependencies on terminals, networking or wall-clock I/O, so it is:
//!
//! - **Deterministic**: Same seed produces identical boards
//! - **Testable**: Every rule is exercised by unit tests
//! - **Portable**: Runs in the terminal front end, the adapter, or headless
//!
//! # Module Structure
//!
//! - [`board`]: 8x15 grid of digits with removal
//! - [`selection`]: drag rectangle to cell set, with inclusive edges
//! - [`scoring`]: sum-to-ten rule and time bonuses
//! - [`round`]: round lifecycle, clock, pointer gestures and events
//! - [`rng`]: seedable LCG used for board generation
//!
//! # Game Rules
//!
//! - Drag a rectangle over digits; every non-empty cell it touches is selected
//! - Releasing a selection that sums to exactly 10 removes those cells
//! - Each removed cell scores one point
//! - Matches of 3 cells add 2 seconds, matches of 4 or more add 5 (cap 999)
//! - The round ends when the 60 second clock runs out
//!
//! # Example
//!
//! ```
//! use tui_apples_core::{Board, Round, RoundConfig, RoundEvent};
//! use tui_apples_core::types::{Point, RoundPhase};
//!
//! let mut round = Round::new(RoundConfig::default().with_seed(12345));
//! round.start();
//! round.replace_board(Board::from_rows(&[&[4, 6, 1]]));
//!
//! // Drag across the first two cells of an 840x480 play area (280px cells).
//! round.pointer_down(Point::new(140.0, 240.0));
//! round.pointer_move(Point::new(420.0, 240.0));
//! let result = round.pointer_up().unwrap();
//!
//! assert!(result.is_match);
//! assert_eq!(round.score(), 2);
//! assert_eq!(round.phase(), RoundPhase::Playing);
//! assert!(round
//!     .drain_events()
//!     .any(|e| matches!(e, RoundEvent::CellsRemoved { count: 2, .. })));
//! ```
//!
//! # Timing
//!
//! The round clock runs in whole seconds. Front ends call
//! [`Round::advance`](round::Round::advance) every frame with the elapsed
//! milliseconds, and the round ticks once per accumulated 1000ms.

pub mod board;
pub mod config;
pub mod error;
pub mod event;
pub mod rng;
pub mod round;
pub mod scoring;
pub mod selection;
pub mod snapshot;

pub use tui_apples_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::RoundConfig;
pub use error::RoundError;
pub use event::RoundEvent;
pub use rng::SimpleRng;
pub use round::Round;
pub use scoring::{
    apply_time_bonus, bonus_seconds, evaluate, evaluate_with, time_ratio, MatchResult, TimeBonus,
};
pub use selection::{select_cells, select_rect, BoardGeometry, DragGesture, Selection};
pub use snapshot::{RoundSnapshot, StatusLine};
