//! TCP server for the adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{AdapterStatus, ClientCommand, InboundCommand, OutboundMessage, RoundOp};

use arrayvec::ArrayVec;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
        }
    }
}

impl ServerConfig {
    /// Create from `APPLES_AI_*` environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("APPLES_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("APPLES_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("APPLES_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<AdapterStatus>,
}

impl ServerState {
    pub fn new(config: ServerConfig, status: Arc<AdapterStatus>) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status,
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("APPLES_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn publish_status(&self) {
        let controller = *self.controller.read().await;
        let clients = self.clients.read().await;
        let streaming = clients.iter().filter(|c| c.handshaken && c.stream_events).count();
        self.status.set(
            clients.len().min(u16::MAX as usize) as u16,
            streaming.min(u16::MAX as usize) as u16,
            controller,
        );
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` for the client; false when it does not strictly increase.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };

        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_events: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address, which is how callers binding port 0
/// learn the real port.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status: Arc<AdapterStatus>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Line(line));
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_events) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
///
/// The client is removed from the shared list before its writer is joined;
/// the list holds a sender, so the writer only finishes after removal.
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_events: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }
    state.publish_status().await;

    // Writer task: one JSON object per line.
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Ack(ack) => serde_json::to_writer(&mut buf, &ack),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, &err),
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, &welcome),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        debug!(client_id, seq, ?code, reason = message, "error reply");
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let result: anyhow::Result<()> = async {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match parse_message(trimmed) {
                Ok(ParsedMessage::Hello(hello)) => {
                    if state.is_handshaken(client_id).await
                        && !state.check_and_update_seq(client_id, hello.seq).await
                    {
                        send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }

                    if !is_supported_version(&hello.protocol_version) {
                        send_error(
                            hello.seq,
                            ErrorCode::ProtocolMismatch,
                            &format!("Protocol version {} not supported", hello.protocol_version),
                        );
                        break;
                    }

                    // First hello wins the controller seat unless the client asks to observe.
                    let role = {
                        let mut controller = state.controller.write().await;
                        let wants_control = hello.requested.role != Some(RequestedRole::Observer);
                        if *controller == Some(client_id) {
                            AssignedRole::Controller
                        } else if controller.is_none() && wants_control {
                            *controller = Some(client_id);
                            info!(client_id, "client is now controller");
                            AssignedRole::Controller
                        } else {
                            AssignedRole::Observer
                        }
                    };
                    let controller_id = state.controller.read().await.map(|id| id as u64);

                    {
                        let mut clients = state.clients.write().await;
                        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                            client.handshaken = true;
                            client.last_seq = Some(hello.seq);
                            client.stream_events = hello.requested.stream_events;
                        }
                    }
                    state.publish_status().await;

                    debug!(client_id, name = %hello.client.name, ?role, "handshake complete");
                    let welcome = create_welcome(
                        hello.seq,
                        &state.config.protocol_version,
                        client_id as u64,
                        role,
                        controller_id,
                    );
                    let _ = tx.send(ClientOutbound::Welcome(welcome));

                    // Initial observation, answered by the game loop.
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        command: ClientCommand::Observe,
                    });
                }

                Ok(ParsedMessage::Command(cmd)) => {
                    if !state.is_handshaken(client_id).await {
                        send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                        continue;
                    }
                    if !state.check_and_update_seq(client_id, cmd.seq).await {
                        send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }
                    if *state.controller.read().await != Some(client_id) {
                        send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                        continue;
                    }

                    let ops = match map_command(&cmd) {
                        Ok(ops) => ops,
                        Err(message) => {
                            send_error(cmd.seq, ErrorCode::InvalidCommand, message);
                            continue;
                        }
                    };

                    // Backpressure: bounded queue. The game loop acks once applied.
                    if command_tx
                        .try_send(InboundCommand {
                            client_id,
                            seq: cmd.seq,
                            command: ClientCommand::Ops(ops),
                        })
                        .is_err()
                    {
                        send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                    }
                }

                Ok(ParsedMessage::Control(ctrl)) => {
                    if !state.is_handshaken(client_id).await {
                        send_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                        continue;
                    }
                    if !state.check_and_update_seq(client_id, ctrl.seq).await {
                        send_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }

                    match ctrl.action {
                        ControlAction::Claim => {
                            let mut controller = state.controller.write().await;
                            match *controller {
                                None => {
                                    *controller = Some(client_id);
                                    info!(client_id, "controller claimed");
                                    let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                                }
                                Some(id) if id == client_id => {
                                    let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                                }
                                Some(_) => {
                                    send_error(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned");
                                }
                            }
                        }
                        ControlAction::Release => {
                            let mut controller = state.controller.write().await;
                            if *controller == Some(client_id) {
                                *controller = None;
                                info!(client_id, "controller released");
                                let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                            } else {
                                send_error(ctrl.seq, ErrorCode::NotController, "Only controller may release");
                            }
                        }
                        ControlAction::Observe => {
                            if command_tx
                                .try_send(InboundCommand {
                                    client_id,
                                    seq: ctrl.seq,
                                    command: ClientCommand::Observe,
                                })
                                .is_err()
                            {
                                send_error(ctrl.seq, ErrorCode::Backpressure, "Command queue is full");
                            }
                        }
                    }
                    state.publish_status().await;
                }

                Ok(ParsedMessage::Unknown(unknown)) => {
                    if state.is_handshaken(client_id).await
                        && !state.check_and_update_seq(client_id, unknown.seq).await
                    {
                        send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
                }

                Err(e) => {
                    let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                    send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    disconnect(&state, client_id).await;

    drop(tx);
    let _ = write_task.await;

    result
}

/// Remove the client; if it held control, the seat goes to the oldest
/// remaining handshaken client.
async fn disconnect(state: &ServerState, client_id: usize) {
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(id) => info!(from = client_id, to = id, "controller promoted"),
                None => info!(client_id, "controller left"),
            }
        }
    }
    state.publish_status().await;
}

/// Map a protocol command into round ops.
fn map_command(cmd: &CommandMessage) -> Result<ArrayVec<RoundOp, MAX_OPS>, &'static str> {
    if cmd.ops.0.is_empty() {
        return Err("Command has no ops");
    }
    let mut ops = ArrayVec::<RoundOp, MAX_OPS>::new();
    for op in &cmd.ops.0 {
        if let Op::PointerDown { x, y } | Op::PointerMove { x, y } = op {
            if !x.is_finite() || !y.is_finite() {
                return Err("Pointer position must be finite");
            }
        }
        ops.try_push(RoundOp::from(op)).map_err(|_| "Too many ops")?;
    }
    Ok(ops)
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameAction;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7777);
        assert_eq!(config.max_pending_commands, 16);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:7777");
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 17, "type":"#), Some(17));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
        assert_eq!(extract_seq_best_effort(r#"{"seq":"a"}"#), None);
    }

    #[test]
    fn test_map_command() {
        let cmd = create_command(3, [Op::Start, Op::PointerDown { x: 1.0, y: 2.0 }, Op::PointerUp]);
        let ops = map_command(&cmd).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], RoundOp::Action(GameAction::Start));
        assert_eq!(ops[2], RoundOp::Action(GameAction::PointerUp));

        let empty = create_command(4, []);
        assert!(map_command(&empty).is_err());

        let nan = create_command(5, [Op::PointerMove { x: f32::NAN, y: 0.0 }]);
        assert!(map_command(&nan).is_err());
    }
}
