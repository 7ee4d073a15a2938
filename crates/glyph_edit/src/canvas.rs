//! The interactive editing surface.
//!
//! One [`Canvas`] owns a pixel frame plus the menu band above it and a
//! render thread that composites both into a [`HostSurface`]. All
//! mutable state lives behind a single mutex; pointer handling and the
//! render tick take it briefly and never call out to the host or the
//! menu handler while holding it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use glyph_engine::{Bitmap, PixelState, Position, Rectangle};
use parking_lot::Mutex;

use crate::{
    EditResult, HostSurface, MenuAction, MenuBar, MenuHandler, PointerAction, PointerButton, PointerEvent, SurfaceFactory, MENU_BAR_HEIGHT,
};

/// A paint or erase event younger than this is folded into the one
/// already pending instead of producing a second edit.
const DRAW_DEBOUNCE: Duration = Duration::from_millis(333);

/// How long a clicked menu button stays highlighted.
const MENU_LATCH: Duration = Duration::from_millis(350);

/// Render loop pacing for hosts whose `end_frame` does not block.
const FRAME_INTERVAL: Duration = Duration::from_millis(15);

const BACKGROUND: u32 = 0xFF00_0044;
const DEFAULT_BRUSH: u32 = 0xFFFF_FFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PendingDraw {
    Paint,
    Erase,
}

struct ReinitRequest {
    frame: Bitmap,
    scale: i32,
}

struct CanvasState {
    frame: Bitmap,
    scale: i32,
    cursor: Position,
    brush: u32,

    pending: Option<PendingDraw>,
    hold_active: bool,
    last_draw_call: Instant,

    menu: MenuBar,
    latched: Option<MenuAction>,
    last_menu_click: Instant,

    marker: bool,
    helper: bool,
    opacity: f32,
    opacity_dirty: bool,
    opacity_drag: Option<(i32, f32)>,

    reinit: Option<ReinitRequest>,
    clipboard: Option<Bitmap>,
    last_error: Option<String>,

    cell_width: i32,
    cell_height: i32,
    char_count: usize,
}

impl CanvasState {
    fn new(frame: Bitmap, scale: i32) -> Self {
        let width = frame.width();
        CanvasState {
            frame,
            scale: scale.max(1),
            cursor: Position::default(),
            brush: DEFAULT_BRUSH,
            pending: None,
            hold_active: false,
            last_draw_call: Instant::now() - DRAW_DEBOUNCE,
            menu: MenuBar::new(width),
            latched: None,
            last_menu_click: Instant::now(),
            marker: true,
            helper: false,
            opacity: 1.0,
            opacity_dirty: false,
            opacity_drag: None,
            reinit: None,
            clipboard: None,
            last_error: None,
            cell_width: 0,
            cell_height: 0,
            char_count: 0,
        }
    }

    fn apply(&mut self, frame: Bitmap, scale: i32) {
        self.menu.reinit(frame.width());
        self.frame = frame;
        self.scale = scale.max(1);
        self.cursor = Position::default();
        self.pending = None;
        self.hold_active = false;
        self.latched = None;
        self.opacity_drag = None;
        self.opacity_dirty = true;
    }

    fn set_point(&mut self, x: i32, y: i32) {
        let y = y - MENU_BAR_HEIGHT;
        if x < 0 || y < 0 || x >= self.frame.width() || y >= self.frame.height() {
            return;
        }
        self.cursor = Position::new(x, y);
        self.latched = None;
    }

    fn move_point(&mut self, dx: i32, dy: i32) {
        // deltas arrive in drag direction, the cursor moves against it
        self.cursor.x -= dx;
        self.cursor.y -= dy;
        self.cursor = self.cursor.clamped(self.frame.size());
        self.latched = None;
    }

    fn draw(&mut self, erase: bool, hold: bool) {
        let now = Instant::now();
        let rapid = !hold && now.duration_since(self.last_draw_call) < DRAW_DEBOUNCE;
        self.last_draw_call = now;
        if self.hold_active && !hold {
            self.hold_active = false;
            self.pending = None;
            if !rapid {
                return;
            }
        }
        self.pending = Some(if erase { PendingDraw::Erase } else { PendingDraw::Paint });
        self.hold_active = hold;
    }

    /// One edit step: apply the pending paint/erase (held buttons keep
    /// it pending so dragging keeps painting), expire the menu latch
    /// and repaint the band.
    fn advance(&mut self) {
        if let Some(op) = self.pending {
            if !self.frame.get(self.cursor).is_locked() {
                let state = match op {
                    PendingDraw::Paint => PixelState::Ink,
                    PendingDraw::Erase => PixelState::Empty,
                };
                self.frame.set(self.cursor, state);
            }
            if !self.hold_active {
                self.pending = None;
            }
        }

        if self.latched.is_some() && self.last_menu_click.elapsed() >= MENU_LATCH {
            self.latched = None;
        }
        self.menu.redraw(self.latched, self.marker);
    }

    /// Frame copy with the cursor marker and the crosshair helper
    /// painted on top. The stored frame never carries overlay states.
    fn composed(&self) -> Bitmap {
        let mut out = self.frame.clone();
        if self.helper {
            for x in 0..out.width() {
                overlay_helper(&mut out, Position::new(x, self.cursor.y));
            }
            for y in 0..out.height() {
                overlay_helper(&mut out, Position::new(self.cursor.x, y));
            }
        }
        if self.marker {
            let state = if self.frame.get(self.cursor).is_ink() {
                PixelState::CursorOnInk
            } else {
                PixelState::CursorOnEmpty
            };
            out.set(self.cursor, state);
        }
        out
    }

    fn cell_origin(&self) -> Option<Position> {
        if self.cell_width <= 0 || self.cell_height <= 0 {
            return None;
        }
        let stride_x = self.cell_width + 1;
        let stride_y = self.cell_height + 1;
        let col = self.cursor.x / stride_x;
        let row = self.cursor.y / stride_y;
        let columns = (self.frame.width() + 1) / stride_x;
        let index = row as usize * columns.max(1) as usize + col as usize;
        if index >= self.char_count {
            return None;
        }
        Some(Position::new(col * stride_x, row * stride_y))
    }
}

fn overlay_helper(out: &mut Bitmap, pos: Position) {
    match out.get(pos) {
        PixelState::Empty => out.set(pos, PixelState::HelperOnEmpty),
        PixelState::Ink => out.set(pos, PixelState::HelperOnInk),
        _ => {}
    }
}

/// Palette for the menu band.
fn menu_color(state: PixelState) -> Option<u32> {
    match state {
        PixelState::Ink => Some(0xFFFF_FFFF),
        PixelState::CursorOnEmpty => Some(0xFFFF_00FF),
        PixelState::GridLine => Some(0xFF00_FF00),
        PixelState::CursorOnInk => Some(0x5555_5555),
        _ => None,
    }
}

/// Palette for the editing frame; ink uses the configured brush.
fn frame_color(state: PixelState, brush: u32) -> Option<u32> {
    match state {
        PixelState::Empty => None,
        PixelState::Ink => Some(brush),
        PixelState::CursorOnEmpty => Some(0xFF00_FF00),
        PixelState::GridLine => Some(0xFF00_00FF),
        PixelState::CursorOnInk => Some(0xFF00_8800),
        PixelState::Placeholder => Some(0x5555_5555),
        PixelState::HelperOnEmpty => Some(0xFF20_2060),
        PixelState::HelperOnInk => Some(0xFF60_A060),
    }
}

/// Editable pixel canvas with its own render thread.
///
/// `show` spawns the thread; `reinit` while active queues a frame/scale
/// swap that the thread consumes without being respawned, so it is safe
/// to call from inside a [`MenuHandler`] callback. `close` is
/// synchronous and joins the thread.
pub struct Canvas {
    state: Arc<Mutex<CanvasState>>,
    closed: Arc<AtomicBool>,
    // true from spawn until the render loop's exit decision; only ever
    // cleared while the state lock is held
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
    factory: SurfaceFactory,
    handler: Arc<dyn MenuHandler>,
    title: String,
}

impl Canvas {
    pub fn new(title: &str, factory: SurfaceFactory, handler: Arc<dyn MenuHandler>) -> Self {
        Canvas {
            state: Arc::new(Mutex::new(CanvasState::new(Bitmap::default(), 1))),
            closed: Arc::new(AtomicBool::new(true)),
            running: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
            factory,
            handler,
            title: title.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// True once the render thread has stopped and no reinit is
    /// waiting; reaps the finished thread.
    pub fn is_closed(&self) -> bool {
        if !self.closed.load(Ordering::SeqCst) {
            return false;
        }
        if self.state.lock().reinit.is_some() {
            return false;
        }
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
        true
    }

    /// Present the frame. Hands it to the live render loop, or spawns
    /// a new one.
    ///
    /// The decision is made under the state lock against the `running`
    /// flag, which the render loop only clears inside its own locked
    /// exit decision: either the loop is still alive and will consume
    /// the queued request (a request already waiting is simply
    /// replaced), or it is provably on its way out and joining it
    /// cannot block.
    pub fn show(&self, frame: Bitmap, scale: i32) {
        {
            let mut st = self.state.lock();
            if self.running.load(Ordering::SeqCst) {
                st.reinit = Some(ReinitRequest { frame, scale });
                self.closed.store(true, Ordering::SeqCst);
                return;
            }
            st.reinit = None;
            st.apply(frame, scale);
            st.last_error = None;
        }
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
        self.running.store(true, Ordering::SeqCst);
        self.closed.store(false, Ordering::SeqCst);
        self.spawn();
    }

    /// Swap frame and scale. A running render thread drops its surface,
    /// opens a new one at the new dimensions and keeps going.
    pub fn reinit(&self, frame: Bitmap, scale: i32) {
        self.show(frame, scale);
    }

    /// Stop rendering and wait for the thread. Discards any queued
    /// reinit.
    pub fn close(&self) {
        self.state.lock().reinit = None;
        self.closed.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }

    pub fn set_point(&self, x: i32, y: i32) {
        self.state.lock().set_point(x, y);
    }

    pub fn move_point(&self, dx: i32, dy: i32) {
        self.state.lock().move_point(dx, dy);
    }

    pub fn draw(&self, erase: bool, hold: bool) {
        self.state.lock().draw(erase, hold);
    }

    pub fn switch_marker(&self) {
        let mut st = self.state.lock();
        st.marker = !st.marker;
    }

    pub fn set_helper(&self, on: bool) {
        self.state.lock().helper = on;
    }

    pub fn set_brush(&self, color: u32) {
        self.state.lock().brush = color;
    }

    /// Glyph cell geometry used by copy/paste; `width`/`height` are the
    /// inner cell without the separator lines.
    pub fn set_cell_metrics(&self, width: i32, height: i32, char_count: usize) {
        let mut st = self.state.lock();
        st.cell_width = width;
        st.cell_height = height;
        st.char_count = char_count;
    }

    /// Copy the glyph cell under the cursor to the clipboard.
    pub fn copy_cell(&self) {
        let mut st = self.state.lock();
        if let Some(origin) = st.cell_origin() {
            let rect = Rectangle::from(origin.x, origin.y, st.cell_width, st.cell_height);
            st.clipboard = Some(st.frame.snapshot(rect));
        }
    }

    /// Paste the clipboard into the cell under the cursor. Separator
    /// and placeholder pixels in the target are left untouched.
    pub fn paste_cell(&self) {
        let mut st = self.state.lock();
        let (origin, clip) = match (st.cell_origin(), st.clipboard.clone()) {
            (Some(origin), Some(clip)) => (origin, clip),
            _ => return,
        };
        st.frame.blit(origin, &clip);
    }

    pub fn frame_snapshot(&self) -> Bitmap {
        self.state.lock().frame.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Route a pointer event in surface pixels. Menu band clicks latch
    /// and dispatch their action; everything below edits the frame.
    pub fn pointer_event(&self, ev: PointerEvent) {
        let mut dispatch = None;
        {
            let mut st = self.state.lock();
            let scale = st.scale;
            let x = ev.x / scale;
            let y = ev.y / scale;
            if y < MENU_BAR_HEIGHT {
                match (ev.button, ev.action) {
                    (PointerButton::Secondary, PointerAction::Down) => {
                        if st.menu.hit_test(x, y) == Some(MenuAction::MarkerToggle) {
                            st.opacity_drag = Some((ev.x, st.opacity));
                        }
                    }
                    (PointerButton::Secondary, PointerAction::Up) => st.opacity_drag = None,
                    (PointerButton::Primary, PointerAction::Down) => {
                        st.pending = None;
                        st.hold_active = false;
                        if let Some(action) = st.menu.hit_test(x, y) {
                            st.latched = Some(action);
                            st.last_menu_click = Instant::now();
                            if action == MenuAction::MarkerToggle {
                                st.marker = !st.marker;
                            } else {
                                dispatch = Some(action);
                            }
                        }
                    }
                    (PointerButton::Primary, PointerAction::Up) => {}
                }
            } else {
                if ev.button == PointerButton::Secondary && ev.action == PointerAction::Up {
                    st.opacity_drag = None;
                }
                st.set_point(x, y);
                st.draw(ev.button == PointerButton::Secondary, ev.action == PointerAction::Down);
            }
        }
        match dispatch {
            Some(MenuAction::New) => self.handler.on_new_requested(),
            Some(MenuAction::Open) => self.handler.on_open_requested(),
            Some(MenuAction::Save) => self.handler.on_save_requested(),
            Some(MenuAction::TestFont) => self.handler.on_test_requested(),
            Some(MenuAction::MarkerToggle) | None => {}
        }
    }

    /// Pointer motion in surface pixels. Feeds an active opacity drag,
    /// otherwise tracks the cursor so held buttons paint along the
    /// path.
    pub fn pointer_moved(&self, x: i32, y: i32) {
        let mut st = self.state.lock();
        if let Some((start, base)) = st.opacity_drag {
            st.opacity = (base + (x - start) as f32 / 100.0).clamp(0.1, 1.0);
            st.opacity_dirty = true;
            return;
        }
        let scale = st.scale;
        st.set_point(x / scale, y / scale);
    }

    fn spawn(&self) {
        let state = self.state.clone();
        let closed = self.closed.clone();
        let running = self.running.clone();
        let factory = self.factory.clone();
        let title = self.title.clone();
        let handle = std::thread::spawn(move || render_main(&state, &closed, &running, &factory, &title));
        *self.thread.lock() = Some(handle);
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.close();
    }
}

fn render_main(state: &Mutex<CanvasState>, closed: &AtomicBool, running: &AtomicBool, factory: &SurfaceFactory, title: &str) {
    loop {
        let (width, height, scale) = {
            let st = state.lock();
            (st.frame.width(), st.frame.height(), st.scale)
        };
        let mut surface = match factory(width * scale, (height + MENU_BAR_HEIGHT) * scale, title) {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("canvas '{title}': {err}");
                let mut st = state.lock();
                st.last_error = Some(err.to_string());
                st.reinit = None;
                closed.store(true, Ordering::SeqCst);
                running.store(false, Ordering::SeqCst);
                return;
            }
        };

        while !closed.load(Ordering::SeqCst) && surface.is_active() {
            if let Err(err) = tick(state, surface.as_mut()) {
                log::error!("canvas '{title}': {err}");
                state.lock().last_error = Some(err.to_string());
                break;
            }
            std::thread::sleep(FRAME_INTERVAL);
        }
        drop(surface);

        // Exit decision and `running` are flipped in the same critical
        // section, so `show` can never observe a live loop as gone (or
        // queue a request the loop will not see).
        let keep_going = {
            let mut st = state.lock();
            match st.reinit.take() {
                Some(req) => {
                    st.apply(req.frame, req.scale);
                    closed.store(false, Ordering::SeqCst);
                    true
                }
                None => {
                    closed.store(true, Ordering::SeqCst);
                    running.store(false, Ordering::SeqCst);
                    false
                }
            }
        };
        if !keep_going {
            return;
        }
    }
}

fn tick(state: &Mutex<CanvasState>, surface: &mut dyn HostSurface) -> EditResult<()> {
    let (menu_px, frame_px, scale, brush, opacity) = {
        let mut st = state.lock();
        st.advance();
        let opacity = if st.opacity_dirty {
            st.opacity_dirty = false;
            Some(st.opacity)
        } else {
            None
        };
        (st.menu.bitmap().clone(), st.composed(), st.scale, st.brush, opacity)
    };

    if let Some(value) = opacity {
        surface.set_opacity(value)?;
    }

    surface.begin_frame(BACKGROUND)?;
    for (pos, cell) in menu_px.upscaled(scale).cells() {
        if let Some(color) = menu_color(cell) {
            surface.set_pixel(pos.x, pos.y, color)?;
        }
    }
    let y_off = MENU_BAR_HEIGHT * scale;
    for (pos, cell) in frame_px.upscaled(scale).cells() {
        if let Some(color) = frame_color(cell, brush) {
            surface.set_pixel(pos.x, pos.y + y_off, color)?;
        }
    }
    surface.end_frame()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullMenuHandler;
    use glyph_engine::Size;
    use pretty_assertions::assert_eq;

    fn bare_canvas(width: i32, height: i32) -> Canvas {
        let factory: SurfaceFactory = Arc::new(|_, _, _| {
            Err(crate::EditError::SurfaceCreation {
                message: "no surface in unit tests".into(),
            })
        });
        let canvas = Canvas::new("test", factory, Arc::new(NullMenuHandler));
        canvas.state.lock().apply(Bitmap::new(width, height), 1);
        canvas
    }

    fn advance(canvas: &Canvas) {
        canvas.state.lock().advance();
    }

    fn pixel(canvas: &Canvas, x: i32, y: i32) -> PixelState {
        canvas.state.lock().frame.get((x, y))
    }

    #[test]
    fn click_paints_exactly_once() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(3, MENU_BAR_HEIGHT + 4);
        canvas.draw(false, false);
        advance(&canvas);
        assert_eq!(pixel(&canvas, 3, 4), PixelState::Ink);
        assert_eq!(canvas.state.lock().pending, None);

        // cursor moves on, but no further op is pending
        canvas.set_point(5, MENU_BAR_HEIGHT + 5);
        advance(&canvas);
        assert_eq!(pixel(&canvas, 5, 5), PixelState::Empty);
    }

    #[test]
    fn rapid_double_click_paints_exactly_once() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(3, MENU_BAR_HEIGHT + 3);
        canvas.draw(false, false);
        canvas.draw(false, false);
        advance(&canvas);
        {
            let st = canvas.state.lock();
            let inked = st.frame.cells().filter(|(_, cell)| cell.is_ink()).count();
            assert_eq!(inked, 1);
            assert_eq!(st.pending, None);
        }

        // a render tick between the two clicks changes nothing either
        canvas.draw(false, false);
        advance(&canvas);
        canvas.draw(false, false);
        advance(&canvas);
        let st = canvas.state.lock();
        let inked = st.frame.cells().filter(|(_, cell)| cell.is_ink()).count();
        assert_eq!(inked, 1);
        assert_eq!(st.pending, None);
    }

    #[test]
    fn held_button_keeps_painting_along_the_path() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(0, MENU_BAR_HEIGHT);
        canvas.draw(false, true);
        advance(&canvas);
        canvas.set_point(1, MENU_BAR_HEIGHT);
        advance(&canvas);
        canvas.set_point(2, MENU_BAR_HEIGHT);
        advance(&canvas);
        assert_eq!(pixel(&canvas, 0, 0), PixelState::Ink);
        assert_eq!(pixel(&canvas, 1, 0), PixelState::Ink);
        assert_eq!(pixel(&canvas, 2, 0), PixelState::Ink);
    }

    #[test]
    fn slow_release_after_hold_adds_no_edit() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(2, MENU_BAR_HEIGHT + 2);
        canvas.draw(false, true);
        advance(&canvas);
        assert_eq!(pixel(&canvas, 2, 2), PixelState::Ink);

        canvas.state.lock().last_draw_call = Instant::now() - Duration::from_millis(400);
        canvas.set_point(6, MENU_BAR_HEIGHT + 6);
        canvas.draw(false, false);
        advance(&canvas);
        assert_eq!(canvas.state.lock().pending, None);
        assert_eq!(pixel(&canvas, 6, 6), PixelState::Empty);
    }

    #[test]
    fn locked_pixels_resist_paint_and_erase() {
        let canvas = bare_canvas(10, 10);
        canvas.state.lock().frame.set((4, 4), PixelState::GridLine);
        canvas.state.lock().frame.set((5, 5), PixelState::Placeholder);
        canvas.set_point(4, MENU_BAR_HEIGHT + 4);
        canvas.draw(false, false);
        advance(&canvas);
        canvas.set_point(5, MENU_BAR_HEIGHT + 5);
        canvas.draw(true, false);
        advance(&canvas);
        assert_eq!(pixel(&canvas, 4, 4), PixelState::GridLine);
        assert_eq!(pixel(&canvas, 5, 5), PixelState::Placeholder);
    }

    #[test]
    fn set_point_rejects_out_of_range() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(3, MENU_BAR_HEIGHT + 3);
        canvas.set_point(3, 3); // menu band
        canvas.set_point(42, MENU_BAR_HEIGHT + 3);
        assert_eq!(canvas.state.lock().cursor, Position::new(3, 3));
    }

    #[test]
    fn move_point_is_inverted_and_clamped() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(5, MENU_BAR_HEIGHT + 5);
        canvas.move_point(2, -3);
        assert_eq!(canvas.state.lock().cursor, Position::new(3, 8));
        canvas.move_point(100, 100);
        assert_eq!(canvas.state.lock().cursor, Position::new(0, 0));
    }

    #[test]
    fn menu_latch_expires_on_tick() {
        let canvas = bare_canvas(40, 10);
        {
            let mut st = canvas.state.lock();
            st.latched = Some(MenuAction::Save);
            st.last_menu_click = Instant::now() - Duration::from_millis(400);
        }
        advance(&canvas);
        assert_eq!(canvas.state.lock().latched, None);
    }

    #[test]
    fn marker_overlay_reflects_underlying_pixel() {
        let canvas = bare_canvas(10, 10);
        canvas.set_point(1, MENU_BAR_HEIGHT + 1);
        let composed = canvas.state.lock().composed();
        assert_eq!(composed.get((1, 1)), PixelState::CursorOnEmpty);

        canvas.state.lock().frame.set((1, 1), PixelState::Ink);
        let composed = canvas.state.lock().composed();
        assert_eq!(composed.get((1, 1)), PixelState::CursorOnInk);
        // overlay never leaks into the stored frame
        assert_eq!(pixel(&canvas, 1, 1), PixelState::Ink);
    }

    #[test]
    fn helper_crosshair_skips_locked_pixels() {
        let canvas = bare_canvas(6, 6);
        canvas.set_helper(true);
        canvas.state.lock().frame.set((0, 2), PixelState::GridLine);
        canvas.state.lock().frame.set((1, 2), PixelState::Ink);
        canvas.set_point(3, MENU_BAR_HEIGHT + 2);
        let composed = canvas.state.lock().composed();
        assert_eq!(composed.get((0, 2)), PixelState::GridLine);
        assert_eq!(composed.get((1, 2)), PixelState::HelperOnInk);
        assert_eq!(composed.get((5, 2)), PixelState::HelperOnEmpty);
        assert_eq!(composed.get((3, 0)), PixelState::HelperOnEmpty);
    }

    #[test]
    fn copy_paste_preserves_locked_target_pixels() {
        let canvas = bare_canvas(11, 5); // two 5-wide cells and a separator
        canvas.set_cell_metrics(5, 5, 2);
        {
            let mut st = canvas.state.lock();
            for x in 0..5 {
                st.frame.set((x, x % 5), PixelState::Ink);
            }
            st.frame.set((5, 2), PixelState::GridLine);
            st.frame.set((8, 2), PixelState::Placeholder);
        }
        canvas.set_point(2, MENU_BAR_HEIGHT + 2);
        canvas.copy_cell();
        canvas.set_point(7, MENU_BAR_HEIGHT + 2);
        canvas.paste_cell();

        assert_eq!(pixel(&canvas, 6, 0), PixelState::Ink);
        assert_eq!(pixel(&canvas, 7, 1), PixelState::Ink);
        // separator and placeholder survive the paste
        assert_eq!(pixel(&canvas, 5, 2), PixelState::GridLine);
        assert_eq!(pixel(&canvas, 8, 2), PixelState::Placeholder);
    }

    #[test]
    fn copy_outside_the_table_is_ignored() {
        let canvas = bare_canvas(11, 5);
        canvas.set_cell_metrics(5, 5, 1);
        canvas.set_point(8, MENU_BAR_HEIGHT + 2); // second cell, beyond char count
        canvas.copy_cell();
        assert!(canvas.state.lock().clipboard.is_none());
    }

    #[test]
    fn opacity_drag_tracks_horizontal_motion() {
        let canvas = bare_canvas(60, 10);
        advance(&canvas); // build menu regions
        let marker = canvas
            .state
            .lock()
            .menu
            .hit_test(0, 0)
            .is_none(); // sanity: origin is no button
        assert!(marker);
        canvas.state.lock().opacity_drag = Some((100, 1.0));
        canvas.pointer_moved(40, 5);
        assert!((canvas.state.lock().opacity - 0.4).abs() < 1e-6);
        canvas.pointer_moved(500, 5);
        assert!((canvas.state.lock().opacity - 1.0).abs() < 1e-6);
        assert!(canvas.state.lock().opacity_dirty);
    }

    #[test]
    fn frame_palette_covers_every_state() {
        for cell in [
            PixelState::Ink,
            PixelState::CursorOnEmpty,
            PixelState::GridLine,
            PixelState::CursorOnInk,
            PixelState::Placeholder,
            PixelState::HelperOnEmpty,
            PixelState::HelperOnInk,
        ] {
            assert!(frame_color(cell, DEFAULT_BRUSH).is_some());
        }
        assert_eq!(frame_color(PixelState::Empty, DEFAULT_BRUSH), None);
        assert_eq!(frame_color(PixelState::Ink, 0xFF12_3456), Some(0xFF12_3456));
    }

    #[test]
    fn cursor_clamps_inside_frame_size() {
        let canvas = bare_canvas(4, 4);
        canvas.state.lock().cursor = Position::new(9, 9).clamped(Size::new(4, 4));
        assert_eq!(canvas.state.lock().cursor, Position::new(3, 3));
    }
}
