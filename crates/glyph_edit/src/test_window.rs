//! Font preview window.
//!
//! Renders a fixed set of sample lines with the edited font so spacing
//! and glyph coverage can be judged at a glance. The window itself is a
//! plain [`HostSurface`] loop; primary click toggles monospace layout,
//! secondary click inverts the rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glyph_engine::{Bitmap, Font, PixelState, VirtualCanvas};
use parking_lot::Mutex;

use crate::{EditResult, HostSurface, PointerAction, PointerButton, PointerEvent};

pub const SAMPLE_LATIN: &str = "The quick brown fox jumps over the lazy dog";
pub const SAMPLE_CYRILLIC: &str = "Съешь же ещё этих мягких французских булок, да выпей чаю";
pub const SAMPLE_DIGITS: &str = "0123456789";
pub const SAMPLE_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[]{}";

const MARGIN: i32 = 50;
const BACKGROUND: u32 = 0xFF00_0044;
const FOREGROUND: u32 = 0xFFFF_FFFF;
const FRAME_INTERVAL: Duration = Duration::from_millis(15);

struct TestState {
    screen: VirtualCanvas,
    font: Font,
    text: String,
    monospace: bool,
    invert: bool,
}

impl TestState {
    fn render(&mut self) {
        self.screen.clear();
        self.screen
            .draw_text(&self.font, &self.text, MARGIN, MARGIN, PixelState::Ink, self.invert, self.monospace);
    }
}

/// Shared handle to a running font preview. Clones share the same
/// state; `stop` (or dropping the last handle's owner) ends the render
/// loop.
#[derive(Clone)]
pub struct FontTestWindow {
    state: Arc<Mutex<TestState>>,
    testing: Arc<AtomicBool>,
}

impl FontTestWindow {
    /// Preview with the standard sample lines.
    pub fn new(font: Font) -> Self {
        let text = [SAMPLE_LATIN, SAMPLE_CYRILLIC, SAMPLE_DIGITS, SAMPLE_PUNCTUATION].join("\n");
        Self::with_text(font, &text)
    }

    pub fn with_text(font: Font, text: &str) -> Self {
        let lines = text.lines().count().max(1) as i32;
        let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0) as i32;
        let width = 2 * MARGIN + longest * font.width() + (longest - 1).max(0) * font.interval();
        let height = 2 * MARGIN + lines * font.height() + (lines - 1);
        let mut state = TestState {
            screen: VirtualCanvas::new(width, height),
            font,
            text: text.to_string(),
            monospace: true,
            invert: false,
        };
        state.render();
        FontTestWindow {
            state: Arc::new(Mutex::new(state)),
            testing: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn width(&self) -> i32 {
        self.state.lock().screen.width()
    }

    pub fn height(&self) -> i32 {
        self.state.lock().screen.height()
    }

    pub fn is_testing(&self) -> bool {
        self.testing.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.testing.store(false, Ordering::SeqCst);
    }

    pub fn switch_monospace(&self) {
        let mut st = self.state.lock();
        st.monospace = !st.monospace;
        st.render();
    }

    pub fn switch_invert(&self) {
        let mut st = self.state.lock();
        st.invert = !st.invert;
        st.render();
    }

    pub fn pointer_event(&self, ev: PointerEvent) {
        if ev.action != PointerAction::Down {
            return;
        }
        match ev.button {
            PointerButton::Primary => self.switch_monospace(),
            PointerButton::Secondary => self.switch_invert(),
        }
    }

    pub fn screen_snapshot(&self) -> Bitmap {
        self.state.lock().screen.bitmap().clone()
    }

    /// Blit loop. Returns when the surface dies or `stop` is called;
    /// always clears the testing flag on the way out.
    pub fn run(&self, surface: &mut dyn HostSurface) -> EditResult<()> {
        let result = self.run_inner(surface);
        self.testing.store(false, Ordering::SeqCst);
        result
    }

    fn run_inner(&self, surface: &mut dyn HostSurface) -> EditResult<()> {
        while self.is_testing() && surface.is_active() {
            let screen = self.screen_snapshot();
            surface.begin_frame(BACKGROUND)?;
            for (pos, cell) in screen.cells() {
                if cell.is_ink() {
                    surface.set_pixel(pos.x, pos.y, FOREGROUND)?;
                }
            }
            surface.end_frame()?;
            std::thread::sleep(FRAME_INTERVAL);
        }
        Ok(())
    }
}
