//! GameView: maps a `core::RoundSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Screen layout, left to right: the bordered board, a one-column time bar,
//! then the side panel when the viewport is wide enough. The status line sits
//! directly under the board frame.

use crate::core::RoundSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Coord, Point, RoundPhase, ScreenLayout};

/// Frames a "+N" popup stays on screen (~1s at 60 FPS).
pub const POPUP_FRAMES: u16 = 60;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const APPLE_BG: Rgb = Rgb::new(190, 40, 45);
const SELECTED_BG: Rgb = Rgb::new(245, 200, 70);
const DRAG_BG: Rgb = Rgb::new(50, 70, 120);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Floating "+N" shown where a match was removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePopup {
    /// Board-local position (centroid of the removed cells)
    pub at: Point,
    pub count: u32,
    pub age_frames: u16,
}

impl ScorePopup {
    pub fn new(at: Point, count: u32) -> Self {
        Self {
            at,
            count,
            age_frames: 0,
        }
    }

    pub fn expired(&self) -> bool {
        self.age_frames >= POPUP_FRAMES
    }
}

/// Front-end state drawn on top of the round: popups and adapter status.
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub adapter: Option<AdapterStatusView>,
    pub popups: Vec<ScorePopup>,
}

impl Hud {
    pub fn push_popup(&mut self, popup: ScorePopup) {
        self.popups.push(popup);
    }

    /// Age popups by one frame and drop the expired ones.
    pub fn age_popups(&mut self) {
        for p in &mut self.popups {
            p.age_frames = p.age_frames.saturating_add(1);
        }
        self.popups.retain(|p| !p.expired());
    }

    pub fn clear_popups(&mut self) {
        self.popups.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// A lightweight terminal renderer for the apple board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 3x1 leaves room for a digit with a blank either side.
        Self {
            cell_w: 3,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Where the board lands on screen for this snapshot and viewport.
    ///
    /// The input side uses the same layout to turn mouse cells into
    /// board-local points.
    pub fn layout(&self, snap: &RoundSnapshot, viewport: Viewport) -> ScreenLayout {
        let (start_x, start_y) = self.frame_origin(snap, viewport);
        ScreenLayout::new(
            start_x + 1,
            start_y + 1,
            self.cell_w,
            self.cell_h,
            snap.rows,
            snap.cols,
        )
    }

    fn frame_size(&self, snap: &RoundSnapshot) -> (u16, u16) {
        (
            snap.cols.saturating_mul(self.cell_w).saturating_add(2),
            snap.rows.saturating_mul(self.cell_h).saturating_add(2),
        )
    }

    fn frame_origin(&self, snap: &RoundSnapshot, viewport: Viewport) -> (u16, u16) {
        let (frame_w, frame_h) = self.frame_size(snap);
        // Frame plus gap plus time bar; status line under the frame.
        let group_w = frame_w.saturating_add(2);
        let start_x = viewport.width.saturating_sub(group_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h.saturating_add(1)) / 2,
            AnchorY::Top => 0,
        };
        (start_x, start_y)
    }

    /// Render the round into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &RoundSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_hud(snap, &Hud::default(), viewport, fb);
    }

    pub fn render_into_with_hud(
        &self,
        snap: &RoundSnapshot,
        hud: &Hud,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let (start_x, start_y) = self.frame_origin(snap, viewport);
        let (frame_w, frame_h) = self.frame_size(snap);
        let layout = self.layout(snap, viewport);

        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for row in 0..snap.rows {
            for col in 0..snap.cols {
                self.draw_cell(fb, snap, &layout, Coord::new(row, col));
            }
        }

        if let Some(rect) = snap.drag {
            let top_left = layout.to_screen(Point::new(rect.x, rect.y));
            let bottom_right = layout.to_screen(Point::new(rect.x + rect.w, rect.y + rect.h));
            self.draw_drag(fb, snap, &layout, top_left, bottom_right);
        }

        let bar_x = start_x.saturating_add(frame_w).saturating_add(1);
        self.draw_time_bar(fb, snap, &layout, bar_x);

        let status = CellStyle::new(Rgb::new(180, 180, 190), Rgb::new(0, 0, 0));
        fb.put_str(
            start_x,
            start_y.saturating_add(frame_h),
            &snap.status().to_string(),
            status,
        );

        self.draw_side_panel(fb, snap, hud.adapter.as_ref(), viewport, bar_x.saturating_add(3), start_y);

        for popup in &hud.popups {
            self.draw_popup(fb, &layout, popup);
        }

        match snap.phase {
            RoundPhase::Idle => self.draw_overlay_text(
                fb,
                start_x,
                start_y,
                frame_w,
                frame_h,
                &["APPLE BOX", "make 10 to clear", "press S to start"],
            ),
            RoundPhase::Ended => {
                let score = format!("final score {}", snap.score);
                self.draw_overlay_text(
                    fb,
                    start_x,
                    start_y,
                    frame_w,
                    frame_h,
                    &["TIME UP", score.as_str(), "press R to play again"],
                );
            }
            RoundPhase::Playing => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &RoundSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_with_hud(&self, snap: &RoundSnapshot, hud: &Hud, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_hud(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_cell(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, layout: &ScreenLayout, coord: Coord) {
        let (px, py) = layout.cell_origin(coord);
        let (cx, cy) = (px.saturating_add(self.cell_w / 2), py.saturating_add(self.cell_h / 2));

        match snap.cell(coord) {
            Some(v) => {
                let style = if snap.is_selected(coord) {
                    CellStyle::new(Rgb::new(20, 20, 20), SELECTED_BG).bold()
                } else {
                    CellStyle::new(Rgb::new(255, 255, 255), APPLE_BG).bold()
                };
                fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
                fb.put_char(cx, cy, char::from(b'0' + v.min(9)), style);
            }
            None => {
                let style = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim();
                fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
                fb.put_char(cx, cy, '·', style);
            }
        }
    }

    /// Tint the part of the drag rectangle that is not a selected apple.
    fn draw_drag(
        &self,
        fb: &mut FrameBuffer,
        snap: &RoundSnapshot,
        layout: &ScreenLayout,
        top_left: (f32, f32),
        bottom_right: (f32, f32),
    ) {
        if layout.width() == 0 || layout.height() == 0 {
            return;
        }
        let min_x = layout.origin_x as f32;
        let min_y = layout.origin_y as f32;
        let max_x = layout.origin_x.saturating_add(layout.width() - 1) as f32;
        let max_y = layout.origin_y.saturating_add(layout.height() - 1) as f32;

        let x0 = top_left.0.floor().clamp(min_x, max_x) as u16;
        let y0 = top_left.1.floor().clamp(min_y, max_y) as u16;
        let x1 = bottom_right.0.floor().clamp(min_x, max_x) as u16;
        let y1 = bottom_right.1.floor().clamp(min_y, max_y) as u16;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let coord = Coord::new(
                    (y - layout.origin_y) / layout.cell_h,
                    (x - layout.origin_x) / layout.cell_w,
                );
                if !snap.is_selected(coord) {
                    fb.tint_rect(x, y, 1, 1, DRAG_BG);
                }
            }
        }
    }

    /// Vertical bar filled from the bottom in proportion to the time left.
    fn draw_time_bar(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, layout: &ScreenLayout, x: u16) {
        let h = layout.height();
        let filled = (snap.time_ratio * h as f32).round() as u16;
        let fill_fg = if snap.time_ratio > 0.25 {
            Rgb::new(90, 200, 110)
        } else {
            Rgb::new(230, 80, 70)
        };
        let fill = CellStyle::new(fill_fg, Rgb::new(0, 0, 0));
        let empty = CellStyle::new(Rgb::new(70, 70, 80), Rgb::new(0, 0, 0)).dim();

        for i in 0..h {
            let y = layout.origin_y.saturating_add(h - 1 - i);
            if i < filled {
                fb.put_char(x, y, '█', fill);
            } else {
                fb.put_char(x, y, '│', empty);
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &RoundSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "TIME", label);
        y = y.saturating_add(1);
        let end = fb.put_u32(panel_x, y, snap.time_left, value);
        fb.put_char(end, y, 's', value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "SELECTED", label);
        y = y.saturating_add(1);
        let end = fb.put_u32(panel_x, y, snap.preview.size as u32, value);
        let end = fb.put_str(end + 1, y, "sum", dim);
        let sum_style = if snap.preview.is_match {
            CellStyle::new(SELECTED_BG, Rgb::new(0, 0, 0)).bold()
        } else {
            value
        };
        fb.put_u32(end + 1, y, snap.preview.sum, sum_style);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "ROUND", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.round_id, value);
        y = y.saturating_add(2);

        if y >= viewport.height {
            return;
        }
        fb.put_str(panel_x, y, "AI", label);
        y = y.saturating_add(1);
        match adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                if panel_w >= 16 {
                    fb.put_str(panel_x + 3, y, "clients", dim);
                }
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, st.client_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "S", value);
                fb.put_u32(panel_x + 2, y, st.streaming_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "CTRL", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(panel_x + 5, y, id as u32, value),
                    None => fb.put_str(panel_x + 5, y, "-", value),
                };
            }
            _ => {
                fb.put_str(panel_x, y, "OFF", value);
            }
        }
    }

    fn draw_popup(&self, fb: &mut FrameBuffer, layout: &ScreenLayout, popup: &ScorePopup) {
        let (sx, sy) = layout.to_screen(popup.at);
        // Drift up one row over the popup's lifetime.
        let rise = if popup.age_frames >= POPUP_FRAMES / 2 { 1 } else { 0 };
        let y = (sy.floor().max(0.0) as u16).saturating_sub(rise);
        let digits = decimal_width(popup.count);
        let x = (sx.floor().max(0.0) as u16).saturating_sub((digits + 1) / 2);

        let style = CellStyle::new(Rgb::new(255, 240, 120), BOARD_BG).bold();
        fb.put_char(x, y, '+', style);
        fb.put_u32(x.saturating_add(1), y, popup.count, style);
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        lines: &[&str],
    ) {
        let n = lines.len() as u16;
        let top = start_y.saturating_add(frame_h.saturating_sub(n) / 2);
        let title = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        let body = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0));

        for (i, text) in lines.iter().enumerate() {
            let text_w = text.chars().count() as u16;
            let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
            let style = if i == 0 { title } else { body };
            fb.put_str(x, top + i as u16, text, style);
        }
    }
}

fn decimal_width(mut n: u32) -> u16 {
    let mut w = 1;
    while n >= 10 {
        n /= 10;
        w += 1;
    }
    w
}
