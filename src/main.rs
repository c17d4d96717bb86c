//! Terminal apple box runner (default binary).
//!
//! Mouse drags select apples, sums of ten clear them. Uses crossterm for
//! input and the framebuffer renderer from `term`. When the adapter is
//! enabled, remote clients drive the same round between frames.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use tui_apples::adapter::{apply_ops, Adapter, ClientCommand};
use tui_apples::core::{Round, RoundConfig, RoundEvent, RoundSnapshot, Selection};
use tui_apples::input::{handle_key_event, map_mouse_event, should_quit};
use tui_apples::term::{
    AdapterStatusView, FrameBuffer, GameView, Hud, ScorePopup, TerminalRenderer, Viewport,
};
use tui_apples::types::FRAME_MS;

fn main() -> Result<()> {
    init_logging()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to `APPLES_LOG_PATH` if set. Stdout belongs to the alternate screen.
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("APPLES_LOG_PATH").filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let config = RoundConfig::from_env();
    tracing::info!(seed = config.seed, rows = config.rows, cols = config.cols, "starting");

    let mut round = Round::new(config);
    let mut adapter = Adapter::start_from_env()?;

    let view = GameView::default();
    let mut hud = Hud::default();
    let mut snap = RoundSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let frame = Duration::from_millis(FRAME_MS as u64);
    let mut last_frame = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        round.snapshot_into(&mut snap);
        hud.adapter = adapter.as_ref().map(|a| {
            let status = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: status.client_count(),
                controller_id: status.controller_id(),
                streaming_count: status.streaming_count(),
            }
        });
        let layout = view.layout(&snap, viewport);
        view.render_into_with_hud(&snap, &hud, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until the next frame.
        let timeout = frame.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        round.apply_action(action);
                    }
                }
                Event::Mouse(mouse) => {
                    for action in map_mouse_event(mouse, &layout) {
                        round.apply_action(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Clock.
        let elapsed = last_frame.elapsed();
        if elapsed >= frame {
            let ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
            round.advance(ms);
            last_frame += Duration::from_millis(ms as u64);
            hud.age_popups();
        }
        flush_events(&mut round, adapter.as_mut(), &mut hud);

        // Remote commands, applied on this thread between frames.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(inbound) = adapter.try_recv() {
                match inbound.command {
                    ClientCommand::Ops(ops) => {
                        let changed = apply_ops(&mut round, &ops);
                        tracing::debug!(client_id = inbound.client_id, seq = inbound.seq, changed, "ops applied");
                        flush_events(&mut round, Some(&mut *adapter), &mut hud);
                        adapter.ack(inbound.client_id, inbound.seq);
                    }
                    ClientCommand::Observe => {
                        round.snapshot_into(&mut snap);
                        adapter.send_observation(inbound.client_id, inbound.seq, &snap);
                    }
                }
            }
        }
    }
}

/// Hand queued round events to the HUD and to streaming adapter clients.
fn flush_events(round: &mut Round, mut adapter: Option<&mut Adapter>, hud: &mut Hud) {
    if !round.has_events() {
        return;
    }
    let round_id = round.round_id();
    let events: Vec<RoundEvent> = round.drain_events().collect();
    let geometry = round.config().geometry;
    let (rows, cols) = (round.board().rows(), round.board().cols());

    for ev in &events {
        match ev {
            RoundEvent::BoardGenerated(_) => hud.clear_popups(),
            RoundEvent::CellsRemoved { cells, count } => {
                let removed: Selection = cells.iter().copied().collect();
                if let Some(at) = removed.centroid(&geometry, rows, cols) {
                    hud.push_popup(ScorePopup::new(at, *count as u32));
                }
            }
            _ => {}
        }
        if let Some(adapter) = adapter.as_deref_mut() {
            adapter.broadcast_event(round_id, ev);
        }
    }
}
