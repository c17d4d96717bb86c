//! Round module - the round lifecycle, clock and pointer gestures
//!
//! A `Round` is the single owner of the board. Every public call is one
//! atomic read-compute-write step that queues `RoundEvent`s; the owner
//! drains them afterwards and forwards them to renderers and adapters.
//!
//! Phases: `Idle` -> `Playing` -> `Ended` -> (restart) -> `Playing`.
//! Calls that make no sense in the current phase are logged no-ops.

use std::vec::Drain;

use tracing::{debug, info};

use crate::board::Board;
use crate::config::RoundConfig;
use crate::error::RoundError;
use crate::event::RoundEvent;
use crate::rng::SimpleRng;
use crate::scoring::{apply_time_bonus, evaluate_with, time_ratio, MatchResult};
use crate::selection::{DragGesture, Selection};
use crate::snapshot::{RoundSnapshot, StatusLine};
use crate::types::{DragRect, GameAction, Point, RoundPhase, TICK_MS};

#[derive(Debug, Clone)]
pub struct Round {
    config: RoundConfig,
    rng: SimpleRng,
    board: Board,
    phase: RoundPhase,
    score: u32,
    time_left: u32,
    /// Monotonic round id (increments on every start/restart)
    round_id: u32,
    /// Wall time carried between `advance` calls, always < `TICK_MS`
    tick_accum_ms: u32,
    drag: Option<DragGesture>,
    selection: Selection,
    events: Vec<RoundEvent>,
}

impl Round {
    /// Create an idle round; the board shown before the first start is
    /// already generated from the seed
    pub fn new(config: RoundConfig) -> Self {
        let mut rng = SimpleRng::new(config.seed);
        let board = Board::generate_in_range(
            config.rows,
            config.cols,
            config.min_value,
            config.max_value,
            &mut rng,
        );

        Self {
            config,
            rng,
            board,
            phase: RoundPhase::Idle,
            score: 0,
            time_left: config.round_seconds,
            round_id: 0,
            tick_accum_ms: 0,
            drag: None,
            selection: Selection::new(),
            events: Vec::new(),
        }
    }

    /// Shorthand for a default-sized round with the given seed
    pub fn with_seed(seed: u32) -> Self {
        Self::new(RoundConfig::default().with_seed(seed))
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase.is_playing()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag_rect(&self) -> Option<DragRect> {
        self.drag.map(|d| d.rect())
    }

    pub fn time_ratio(&self) -> f32 {
        time_ratio(self.time_left, self.config.round_seconds)
    }

    /// Replace the board of the current round
    ///
    /// Any live selection is dropped. Used for puzzle setups and tests.
    pub fn replace_board(&mut self, board: Board) {
        self.drag = None;
        self.clear_selection();
        self.board = board;
    }

    /// Start a round from `Idle` or `Ended`; no-op while already playing
    pub fn start(&mut self) -> bool {
        if self.phase.is_playing() {
            debug!(round_id = self.round_id, "start ignored: round already playing");
            return false;
        }
        self.begin_round();
        true
    }

    /// Throw away the current round (in any phase) and start a fresh one
    pub fn restart(&mut self) -> bool {
        self.begin_round();
        true
    }

    fn begin_round(&mut self) {
        self.drag = None;
        self.clear_selection();

        self.round_id = self.round_id.wrapping_add(1);
        self.board = Board::generate_in_range(
            self.config.rows,
            self.config.cols,
            self.config.min_value,
            self.config.max_value,
            &mut self.rng,
        );
        self.score = 0;
        self.time_left = self.config.round_seconds;
        self.tick_accum_ms = 0;
        self.phase = RoundPhase::Playing;

        info!(
            round_id = self.round_id,
            seed = self.config.seed,
            rows = self.board.rows(),
            cols = self.board.cols(),
            "round started"
        );

        self.events.push(RoundEvent::BoardGenerated(self.board.clone()));
        self.events.push(RoundEvent::ScoreChanged(0));
        self.events.push(RoundEvent::TimeChanged(self.time_left));
    }

    fn end_round(&mut self) {
        self.phase = RoundPhase::Ended;
        self.tick_accum_ms = 0;
        self.drag = None;
        self.clear_selection();

        info!(round_id = self.round_id, final_score = self.score, "round ended");
        self.events.push(RoundEvent::RoundEnded {
            final_score: self.score,
        });
    }

    /// One second of clock; no-op unless playing
    pub fn tick(&mut self) -> bool {
        match self.try_tick() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "tick ignored");
                false
            }
        }
    }

    /// One second of clock, reporting why nothing happened
    ///
    /// The tick that brings the clock to zero also ends the round.
    pub fn try_tick(&mut self) -> Result<(), RoundError> {
        if !self.phase.is_playing() {
            return Err(RoundError::InvalidStateTransition {
                op: "tick",
                phase: self.phase,
            });
        }

        if self.time_left == 0 {
            self.end_round();
            return Ok(());
        }

        self.time_left -= 1;
        self.events.push(RoundEvent::TimeChanged(self.time_left));

        if self.time_left == 0 {
            self.end_round();
        }
        Ok(())
    }

    /// Feed elapsed wall time; runs one `tick` per whole `TICK_MS`
    ///
    /// Returns the number of ticks applied. Starting a new round resets the
    /// carried remainder.
    pub fn advance(&mut self, elapsed_ms: u32) -> u32 {
        if !self.phase.is_playing() {
            return 0;
        }

        self.tick_accum_ms = self.tick_accum_ms.saturating_add(elapsed_ms);
        let mut ticks = 0;
        while self.tick_accum_ms >= TICK_MS && self.phase.is_playing() {
            self.tick_accum_ms -= TICK_MS;
            if self.tick() {
                ticks += 1;
            }
        }
        ticks
    }

    /// Begin a drag at `p`; a click selects the cell under it
    pub fn pointer_down(&mut self, p: Point) -> bool {
        if !self.phase.is_playing() {
            debug!(phase = %self.phase, "pointer down ignored");
            return false;
        }
        if !p.is_finite() {
            debug!(x = p.x, y = p.y, "pointer down ignored: non-finite point");
            return false;
        }
        self.drag = Some(DragGesture::new(p));
        self.refresh_selection();
        true
    }

    /// Move the active drag to `p` and rebuild the selection
    pub fn pointer_move(&mut self, p: Point) -> bool {
        if !self.phase.is_playing() {
            return false;
        }
        if !p.is_finite() {
            debug!(x = p.x, y = p.y, "pointer move ignored: non-finite point");
            return false;
        }
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.current = p;
        self.refresh_selection();
        true
    }

    /// Release the drag and try to commit its selection
    ///
    /// Returns the evaluation of the released selection, or `None` when there
    /// was no drag or it selected nothing. The selection is cleared either way.
    pub fn pointer_up(&mut self) -> Option<MatchResult> {
        self.drag.take()?;

        let selection = std::mem::take(&mut self.selection);
        if selection.is_empty() {
            return None;
        }

        let result = self.commit_selection(&selection);
        self.events.push(RoundEvent::SelectionChanged(Selection::new()));
        result
    }

    /// Commit an explicit selection; invalid selections are logged no-ops
    pub fn commit_selection(&mut self, selection: &Selection) -> Option<MatchResult> {
        match self.try_commit_selection(selection) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(error = %e, "commit ignored");
                None
            }
        }
    }

    /// Evaluate `selection` and, on a match, clear it, score it and add bonus time
    ///
    /// A non-matching selection returns its evaluation without touching the
    /// round.
    pub fn try_commit_selection(&mut self, selection: &Selection) -> Result<MatchResult, RoundError> {
        if !self.phase.is_playing() {
            return Err(RoundError::InvalidStateTransition {
                op: "commit",
                phase: self.phase,
            });
        }
        if selection.is_empty() {
            return Err(RoundError::MalformedSelection);
        }
        for coord in selection {
            if self.board.value_at(coord)?.is_none() {
                return Err(RoundError::MalformedSelection);
            }
        }

        let result = evaluate_with(&self.board, selection, &self.config.bonus);
        if !result.is_match {
            debug!(size = result.size, sum = result.sum, "selection does not match");
            return Ok(result);
        }

        let count = self.board.clear(selection.iter());
        self.score = self.score.saturating_add(count as u32);
        self.events.push(RoundEvent::CellsRemoved {
            cells: selection.to_vec(),
            count,
        });
        self.events.push(RoundEvent::ScoreChanged(self.score));

        let time_left = apply_time_bonus(self.time_left, result.bonus_seconds, self.config.time_cap);
        if time_left != self.time_left {
            self.time_left = time_left;
            self.events.push(RoundEvent::TimeChanged(self.time_left));
        }

        debug!(
            count,
            bonus = result.bonus_seconds,
            score = self.score,
            time_left = self.time_left,
            "match committed"
        );

        // A drag still in progress may cover cells that were just emptied.
        if self.drag.is_some() {
            self.refresh_selection();
        }

        Ok(result)
    }

    /// Live evaluation of the current selection
    pub fn preview(&self) -> MatchResult {
        evaluate_with(&self.board, &self.selection, &self.config.bonus)
    }

    pub fn status(&self) -> StatusLine {
        let preview = self.preview();
        StatusLine {
            playing: self.phase.is_playing(),
            time_left: self.time_left,
            score: self.score,
            selected: preview.size,
            sum: preview.sum,
        }
    }

    /// Apply a front-end action; returns whether the round accepted it
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Start => self.start(),
            GameAction::Restart => self.restart(),
            GameAction::Tick => self.tick(),
            GameAction::PointerDown(p) => self.pointer_down(p),
            GameAction::PointerMove(p) => self.pointer_move(p),
            GameAction::PointerUp => self.pointer_up().is_some(),
        }
    }

    /// Take the events queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Drain<'_, RoundEvent> {
        self.events.drain(..)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn snapshot_into(&self, out: &mut RoundSnapshot) {
        out.rows = self.board.rows();
        out.cols = self.board.cols();
        self.board.write_u8_grid(&mut out.cells);
        out.phase = self.phase;
        out.round_id = self.round_id;
        out.seed = self.config.seed;
        out.score = self.score;
        out.time_left = self.time_left;
        out.round_seconds = self.config.round_seconds;
        out.time_ratio = self.time_ratio();
        out.selection.clear();
        out.selection.extend(self.selection.iter());
        out.drag = self.drag_rect();
        out.preview = self.preview();
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut s = RoundSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn refresh_selection(&mut self) {
        let Some(drag) = self.drag else {
            return;
        };
        let next = drag.select(&self.board, &self.config.geometry);
        if next != self.selection {
            self.selection = next;
            self.events
                .push(RoundEvent::SelectionChanged(self.selection.clone()));
        }
    }

    fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.push(RoundEvent::SelectionChanged(Selection::new()));
        }
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new(RoundConfig::default())
    }
}
