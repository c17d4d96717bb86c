//! Protocol module - JSON message types for the apple box adapter
//!
//! Line-delimited JSON. Every message carries: type, seq (sequence number),
//! ts (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{MatchResult, RoundEvent, RoundSnapshot};
use crate::types::{Coord, DragRect, RoundPhase};

use arrayvec::ArrayVec;

/// Version the server speaks. Clients must send a matching major version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Maximum ops accepted in a single command message.
pub const MAX_OPS: usize = 32;

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "control")]
    Control,
}

impl Default for ControlType {
    fn default() -> Self {
        Self::Control
    }
}

/// Client hello message (first message on every connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    /// Receive one `event` message per round event.
    #[serde(default)]
    pub stream_events: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestedRole {
    Auto,
    Controller,
    Observer,
}

impl<'de> Deserialize<'de> for RequestedRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else if s.eq_ignore_ascii_case("controller") {
            Ok(Self::Controller)
        } else if s.eq_ignore_ascii_case("observer") {
            Ok(Self::Observer)
        } else {
            Err(serde::de::Error::custom("invalid requested role"))
        }
    }
}

impl Serialize for RequestedRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            RequestedRole::Auto => serializer.serialize_str("auto"),
            RequestedRole::Controller => serializer.serialize_str("controller"),
            RequestedRole::Observer => serializer.serialize_str("observer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub ops: OpList,
}

/// One call into the round. Pointer positions are board-local pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Op {
    Start,
    Restart,
    Tick,
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Commit an explicit set of `[row, col]` cells
    Commit { cells: Vec<[u16; 2]> },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpList(pub ArrayVec<Op, MAX_OPS>);

impl<'de> Deserialize<'de> for OpList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = OpList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of op objects")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<Op, MAX_OPS>::new();
                while let Some(op) = seq.next_element::<Op>()? {
                    out.try_push(op)
                        .map_err(|_| serde::de::Error::custom("too many ops"))?;
                }
                Ok(OpList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for OpList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for op in &self.0 {
            seq.serialize_element(op)?;
        }
        seq.end()
    }
}

/// Control message (claim/release controller status, request an observation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
    Observe,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else if s.eq_ignore_ascii_case("observe") {
            Ok(Self::Observe)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

impl Serialize for ControlAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ControlAction::Claim => serializer.serialize_str("claim"),
            ControlAction::Release => serializer.serialize_str("release"),
            ControlAction::Observe => serializer.serialize_str("observe"),
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub ops: Vec<String>,
    pub events: Vec<String>,
    pub max_ops: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

/// Acknowledgment, sent once the command has been applied to the round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// One round event, tagged with the round that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub round_id: u32,
    pub event: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventPayload {
    BoardGenerated { board: BoardSnapshot },
    SelectionChanged { cells: Vec<[u16; 2]> },
    CellsRemoved { cells: Vec<[u16; 2]>, count: usize },
    ScoreChanged { score: u32 },
    TimeChanged { time_left: u32 },
    RoundEnded { final_score: u32 },
}

impl From<&RoundEvent> for EventPayload {
    fn from(event: &RoundEvent) -> Self {
        match event {
            RoundEvent::BoardGenerated(board) => {
                let mut flat = Vec::with_capacity(board.cells().len());
                board.write_u8_grid(&mut flat);
                Self::BoardGenerated {
                    board: BoardSnapshot::from_flat(board.rows(), board.cols(), &flat),
                }
            }
            RoundEvent::SelectionChanged(selection) => Self::SelectionChanged {
                cells: coord_pairs(selection.iter()),
            },
            RoundEvent::CellsRemoved { cells, count } => Self::CellsRemoved {
                cells: coord_pairs(cells.iter().copied()),
                count: *count,
            },
            RoundEvent::ScoreChanged(score) => Self::ScoreChanged { score: *score },
            RoundEvent::TimeChanged(time_left) => Self::TimeChanged {
                time_left: *time_left,
            },
            RoundEvent::RoundEnded { final_score } => Self::RoundEnded {
                final_score: *final_score,
            },
        }
    }
}

/// Full round state (sent after hello and on request)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub round_id: u32,
    pub seed: u32,
    pub phase: PhaseLower,
    pub playable: bool,
    pub board: BoardSnapshot,
    pub score: u32,
    pub time_left: u32,
    pub round_seconds: u32,
    pub selection: Vec<[u16; 2]>,
    pub preview: PreviewSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag: Option<DragSnapshot>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: u16,
    pub cols: u16,
    /// Row-major rows; 0 = empty, 1-9 = apple value
    pub cells: Vec<Vec<u8>>,
}

impl BoardSnapshot {
    pub fn from_flat(rows: u16, cols: u16, flat: &[u8]) -> Self {
        let cells = if cols == 0 {
            Vec::new()
        } else {
            flat.chunks(cols as usize)
                .take(rows as usize)
                .map(|r| r.to_vec())
                .collect()
        };
        Self { rows, cols, cells }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseLower {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "ended")]
    Ended,
}

impl From<RoundPhase> for PhaseLower {
    fn from(value: RoundPhase) -> Self {
        match value {
            RoundPhase::Idle => Self::Idle,
            RoundPhase::Playing => Self::Playing,
            RoundPhase::Ended => Self::Ended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSnapshot {
    pub size: usize,
    pub sum: u32,
    pub is_match: bool,
    pub bonus_seconds: u32,
}

impl From<MatchResult> for PreviewSnapshot {
    fn from(value: MatchResult) -> Self {
        Self {
            size: value.size,
            sum: value.sum,
            is_match: value.is_match,
            bonus_seconds: value.bonus_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<DragRect> for DragSnapshot {
    fn from(r: DragRect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
        }
    }
}

/// Deterministic state hash serialized as lowercase hex (without heap allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

fn coord_pairs(coords: impl Iterator<Item = Coord>) -> Vec<[u16; 2]> {
    coords.map(|c| [c.row, c.col]).collect()
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type is reported, not treated as malformed JSON.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                #[serde(borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let probe = serde_json::from_str::<TypeOnly>(json)?;
            let msg_type = probe.msg_type.unwrap_or("unknown");
            if msg_type != "hello" && msg_type != "command" && msg_type != "control" {
                return Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: probe.seq.unwrap_or(0),
                }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Whether a client's requested version is served by this build.
pub fn is_supported_version(version: &str) -> bool {
    let major = PROTOCOL_VERSION.split('.').next().unwrap_or("");
    version.split('.').next() == Some(major) && version.contains('.')
}

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_events: true,
            role: Some(RequestedRole::Auto),
        },
    }
}

pub fn create_command(seq: u64, ops: impl IntoIterator<Item = Op>) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        ops: OpList(ops.into_iter().take(MAX_OPS).collect()),
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    let names = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "tui-apples".to_string(),
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            ops: names(&[
                "start",
                "restart",
                "tick",
                "pointerDown",
                "pointerMove",
                "pointerUp",
                "commit",
            ]),
            events: names(&[
                "boardGenerated",
                "selectionChanged",
                "cellsRemoved",
                "scoreChanged",
                "timeChanged",
                "roundEnded",
            ]),
            max_ops: MAX_OPS,
        },
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_event(seq: u64, round_id: u32, event: &RoundEvent) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        round_id,
        event: EventPayload::from(event),
    }
}

/// Observation from a round snapshot.
pub fn create_observation(snap: &RoundSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        round_id: snap.round_id,
        seed: snap.seed,
        phase: PhaseLower::from(snap.phase),
        playable: snap.playable(),
        board: BoardSnapshot::from_flat(snap.rows, snap.cols, &snap.cells),
        score: snap.score,
        time_left: snap.time_left,
        round_seconds: snap.round_seconds,
        selection: coord_pairs(snap.selection.iter().copied()),
        preview: PreviewSnapshot::from(snap.preview),
        drag: snap.drag.map(DragSnapshot::from),
        state_hash: StateHash(state_hash(snap)),
    }
}

/// Stable 64-bit FNV-1a hash over everything an observer can see.
///
/// `DefaultHasher` output is not stable across Rust versions, so it is not
/// used here.
pub fn state_hash(snap: &RoundSnapshot) -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snap.rows.hash(&mut hasher);
    snap.cols.hash(&mut hasher);
    snap.cells.hash(&mut hasher);
    PhaseLower::from(snap.phase).hash(&mut hasher);
    snap.round_id.hash(&mut hasher);
    snap.seed.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.time_left.hash(&mut hasher);
    snap.selection.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
