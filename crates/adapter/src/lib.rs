//! Adapter module - remote play over TCP with a JSON line protocol
//!
//! External agents (bots, test harnesses, observers) connect over TCP,
//! drive the round with the same calls the terminal front end makes, and
//! receive every round event as it happens.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome` and
//!    a first `observation`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//!    unless it asks for `"role":"observer"`
//! 4. **Event Streaming**: Clients that set `requested.stream_events` get one
//!    `event` message per round event
//! 5. **Commanding**: The controller sends `command` messages holding up to 32
//!    ops; each command is acked after the game loop applied it
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: handshake with client info and requested capabilities
//! - **command**: ops `start`, `restart`, `tick`, `pointerDown`, `pointerMove`,
//!   `pointerUp`, `commit`
//! - **control**: `claim` / `release` the controller seat, `observe` to ask
//!   for a fresh observation
//!
//! ## Server → Client
//!
//! - **welcome**: role assignment and capabilities
//! - **observation**: full board, score, time, phase and selection
//! - **event**: a single round event tagged with its `round_id`
//! - **ack**: command applied
//! - **error**: code and message
//!
//! # Environment Variables
//!
//! - `APPLES_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `APPLES_AI_PORT`: Port number (default: 7777)
//! - `APPLES_AI_MAX_PENDING`: Command queue depth before `backpressure` (default: 16)
//! - `APPLES_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_events":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"round_id":0,"phase":"idle","board":{...},...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"ops":[{"op":"start"},{"op":"commit","cells":[[0,0],[0,1]]}]}
//! Server -> Client: {"type":"event","seq":2,"round_id":1,"event":{"kind":"boardGenerated",...}}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7777
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"1"},"protocol_version":"1.0.0","requested":{"stream_events":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_apples_core as core;
pub use tui_apples_types as types;

pub use protocol::*;
pub use runtime::{apply_ops, Adapter, AdapterStatus, ClientCommand, InboundCommand, OutboundMessage, RoundOp};
pub use server::*;
