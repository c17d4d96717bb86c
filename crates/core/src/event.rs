//! Notifications emitted by the round for renderers and adapters.
//!
//! Events are queued inside the `Round` and drained by the owner after each
//! call, in the order the state changes happened.

use crate::board::Board;
use crate::selection::Selection;
use crate::types::Coord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// A fresh board was generated at round start
    BoardGenerated(Board),
    /// The live drag selection changed
    SelectionChanged(Selection),
    /// A match was committed and these cells were emptied
    CellsRemoved { cells: Vec<Coord>, count: usize },
    ScoreChanged(u32),
    TimeChanged(u32),
    RoundEnded { final_score: u32 },
}

impl RoundEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            RoundEvent::BoardGenerated(_) => "boardGenerated",
            RoundEvent::SelectionChanged(_) => "selectionChanged",
            RoundEvent::CellsRemoved { .. } => "cellsRemoved",
            RoundEvent::ScoreChanged(_) => "scoreChanged",
            RoundEvent::TimeChanged(_) => "timeChanged",
            RoundEvent::RoundEnded { .. } => "roundEnded",
        }
    }
}
