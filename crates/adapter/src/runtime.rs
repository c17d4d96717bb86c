//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. The round itself
//! never leaves the game-loop thread; clients reach it through channels.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{Round, RoundEvent, RoundSnapshot, Selection};
use crate::protocol::{create_ack, create_event, create_observation, Op, MAX_OPS};
use crate::server::{run_server, ServerConfig, ServerState};
use crate::types::{Coord, GameAction, Point};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Apply these calls in order, then ack
    Ops(ArrayVec<RoundOp, MAX_OPS>),
    /// Reply with a full observation
    Observe,
}

/// A single adapter -> round call.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOp {
    Action(GameAction),
    Commit(Vec<Coord>),
}

impl From<&Op> for RoundOp {
    fn from(op: &Op) -> Self {
        match op {
            Op::Start => RoundOp::Action(GameAction::Start),
            Op::Restart => RoundOp::Action(GameAction::Restart),
            Op::Tick => RoundOp::Action(GameAction::Tick),
            Op::PointerDown { x, y } => RoundOp::Action(GameAction::PointerDown(Point::new(*x, *y))),
            Op::PointerMove { x, y } => RoundOp::Action(GameAction::PointerMove(Point::new(*x, *y))),
            Op::PointerUp => RoundOp::Action(GameAction::PointerUp),
            Op::Commit { cells } => {
                RoundOp::Commit(cells.iter().map(|&[r, c]| Coord::new(r, c)).collect())
            }
        }
    }
}

/// Apply a batch of ops to the round. Returns how many changed state.
///
/// Rejected calls (wrong phase, bad coordinates) are no-ops inside the round.
pub fn apply_ops(round: &mut Round, ops: &[RoundOp]) -> usize {
    let mut changed = 0;
    for op in ops {
        let applied = match op {
            RoundOp::Action(action) => round.apply_action(*action),
            RoundOp::Commit(cells) => {
                let selection: Selection = cells.iter().copied().collect();
                round
                    .commit_selection(&selection)
                    .map(|r| r.is_match)
                    .unwrap_or(false)
            }
        };
        if applied {
            changed += 1;
        }
    }
    changed
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Sent to every client that asked for `stream_events`
    Broadcast { line: String },
}

/// Live connection counters, shared between the server and the game loop.
#[derive(Debug, Default)]
pub struct AdapterStatus {
    client_count: AtomicU16,
    streaming_count: AtomicU16,
    /// 0 = no controller
    controller_id: AtomicUsize,
}

impl AdapterStatus {
    pub(crate) fn set(&self, clients: u16, streaming: u16, controller: Option<usize>) {
        self.client_count.store(clients, Ordering::Relaxed);
        self.streaming_count.store(streaming, Ordering::Relaxed);
        self.controller_id
            .store(controller.unwrap_or(0), Ordering::Relaxed);
    }

    pub fn client_count(&self) -> u16 {
        self.client_count.load(Ordering::Relaxed)
    }

    pub fn streaming_count(&self) -> u16 {
        self.streaming_count.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
    next_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `APPLES_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerState::is_disabled() {
            tracing::info!("adapter disabled via APPLES_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(AdapterStatus::default());

        let rt = Runtime::new()?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None, server_status).await {
                tracing::error!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
            next_seq: 1,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> &AdapterStatus {
        &self.status
    }

    /// Server-side sequence number for the next pushed message.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Ack a command once the game loop has applied it.
    pub fn ack(&self, client_id: usize, seq: u64) {
        if let Ok(line) = serde_json::to_string(&create_ack(seq)) {
            self.send(OutboundMessage::ToClient { client_id, line });
        }
    }

    pub fn send_observation(&self, client_id: usize, seq: u64, snap: &RoundSnapshot) {
        match serde_json::to_string(&create_observation(snap, seq)) {
            Ok(line) => self.send(OutboundMessage::ToClient { client_id, line }),
            Err(e) => tracing::warn!(error = %e, "observation not encoded"),
        }
    }

    /// Stream one round event to every client that asked for events.
    pub fn broadcast_event(&mut self, round_id: u32, event: &RoundEvent) {
        let seq = self.next_seq();
        match serde_json::to_string(&create_event(seq, round_id, event)) {
            Ok(line) => self.send(OutboundMessage::Broadcast { line }),
            Err(e) => tracing::warn!(error = %e, kind = event.kind(), "event not encoded"),
        }
    }
}
