//! Error taxonomy for round operations.
//!
//! None of these ever reach a front end: the public round calls log them and
//! degrade to a no-op. They exist so the inner `try_*` operations can say
//! precisely why nothing happened.

use thiserror::Error;

use crate::types::RoundPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("coordinate ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfRangeCoordinate {
        row: u16,
        col: u16,
        rows: u16,
        cols: u16,
    },

    #[error("cannot {op} while the round is {phase}")]
    InvalidStateTransition { op: &'static str, phase: RoundPhase },

    #[error("selection is empty or covers an empty cell")]
    MalformedSelection,
}
