//! Glue between the canvas, the font model and the filesystem.
//!
//! A [`Workspace`] owns the editing canvas and answers its menu
//! actions: `New` rebuilds an empty font table from the configured
//! settings, `Open`/`Save` go through the text font format at the
//! workspace path, `Test` launches the preview window on a worker
//! thread. The font itself is never kept authoritative in memory while
//! editing; it is reconstructed from the table pixels on demand.

use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use glyph_engine::{load_font, save_font, Font, PixelState};
use parking_lot::Mutex;

use crate::{Canvas, EditError, EditResult, FontTestWindow, MenuHandler, SurfaceFactory};

/// Creation parameters for a new font table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub columns: i32,
    pub scale: i32,
    pub char_width: i32,
    pub char_height: i32,
    pub char_count: usize,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        WorkspaceSettings {
            columns: 32,
            scale: 5,
            char_width: 5,
            char_height: 11,
            char_count: 256,
        }
    }
}

impl WorkspaceSettings {
    pub fn validate(&self) -> EditResult<()> {
        if self.columns < 24 || self.columns > 64 {
            return Err(setting_error("Column count cannot be lower than 24 or higher than 64."));
        }
        if self.char_width < 4 || self.char_width > 32 {
            return Err(setting_error("Char width cannot be lower than 4 or higher than 32."));
        }
        if self.char_height < 4 || self.char_height > 32 {
            return Err(setting_error("Char height cannot be lower than 4 or higher than 32."));
        }
        if self.scale < 1 || self.scale > 8 {
            return Err(setting_error("Scale cannot be lower than 1 or higher than 8."));
        }
        if self.char_count < 1 || self.char_count > 256 {
            return Err(setting_error("Char count cannot be lower than 1 or higher than 256."));
        }
        Ok(())
    }
}

fn setting_error(message: &str) -> EditError {
    EditError::InvalidSetting { message: message.to_string() }
}

/// Dimensions and sequence of the font currently on the canvas; the
/// pixels live in the canvas frame.
#[derive(Clone, Default)]
struct FontMeta {
    width: i32,
    height: i32,
    interval: i32,
    sequence: Vec<u32>,
}

pub struct Workspace {
    settings: WorkspaceSettings,
    canvas: Canvas,
    factory: SurfaceFactory,
    font_path: PathBuf,
    meta: Mutex<FontMeta>,
    test: Mutex<Option<(FontTestWindow, JoinHandle<()>)>>,
}

impl Workspace {
    pub fn new(settings: WorkspaceSettings, factory: SurfaceFactory, font_path: impl Into<PathBuf>) -> EditResult<Arc<Self>> {
        settings.validate()?;
        Ok(Arc::new_cyclic(|weak: &Weak<Workspace>| {
            let handler = Arc::new(WorkspaceMenu(weak.clone()));
            let canvas = Canvas::new("Font editor", factory.clone(), handler);
            Workspace {
                settings,
                canvas,
                factory,
                font_path: font_path.into(),
                meta: Mutex::new(FontMeta::default()),
                test: Mutex::new(None),
            }
        }))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn settings(&self) -> WorkspaceSettings {
        self.settings
    }

    /// The running preview window, if any.
    pub fn test_window(&self) -> Option<FontTestWindow> {
        self.test.lock().as_ref().map(|(window, _)| window.clone())
    }

    /// Start over with an empty font table from the settings.
    pub fn create(&self) -> EditResult<()> {
        let s = self.settings;
        let font = Font::empty(s.char_height, s.char_width, s.char_count)?;
        self.adopt(&font);
        Ok(())
    }

    /// Read the font file at the workspace path and show it. On error
    /// the current table stays untouched.
    pub fn load(&self) -> EditResult<()> {
        let font = load_font(&self.font_path)?;
        self.adopt(&font);
        Ok(())
    }

    /// Write the table pixels back to the workspace path.
    pub fn save(&self) -> EditResult<()> {
        let font = self.current_font()?;
        save_font(&self.font_path, &font)?;
        Ok(())
    }

    /// Preview the current table in a [`FontTestWindow`] on a worker
    /// thread; a still-running previous preview is stopped first.
    pub fn test_font(&self) -> EditResult<()> {
        let font = self.current_font()?;
        let window = FontTestWindow::new(font);

        let mut guard = self.test.lock();
        if let Some((old, handle)) = guard.take() {
            old.stop();
            let _ = handle.join();
        }

        let factory = self.factory.clone();
        let width = window.width();
        let height = window.height();
        let runner = window.clone();
        let handle = std::thread::spawn(move || match factory(width, height, "Font test") {
            Ok(mut surface) => {
                if let Err(err) = runner.run(surface.as_mut()) {
                    log::error!("font test window: {err}");
                }
            }
            Err(err) => {
                runner.stop();
                log::error!("font test window: {err}");
            }
        });
        *guard = Some((window, handle));
        Ok(())
    }

    /// Stop the preview and close the canvas.
    pub fn close(&self) {
        if let Some((window, handle)) = self.test.lock().take() {
            window.stop();
            let _ = handle.join();
        }
        self.canvas.close();
    }

    /// Rebuild the canvas around `font`: new table frame, new cell
    /// metrics, cursor back at the origin.
    fn adopt(&self, font: &Font) {
        let table = font.font_table(self.settings.columns);
        *self.meta.lock() = FontMeta {
            width: font.width(),
            height: font.height(),
            interval: font.interval(),
            sequence: font.all_chars(),
        };
        self.canvas.set_cell_metrics(font.width(), font.height(), font.char_count());
        self.canvas.reinit(table, self.settings.scale);
    }

    /// Reconstruct the font from the table pixels on the canvas.
    fn current_font(&self) -> EditResult<Font> {
        let meta = self.meta.lock().clone();
        let frame = self.canvas.frame_snapshot();
        let stride_x = meta.width + 1;
        let stride_y = meta.height + 1;
        let columns = ((frame.width() + 1) / stride_x.max(1)).max(1);

        let count = meta.sequence.len();
        let mut bits = Vec::with_capacity(count * (meta.width * meta.height).max(0) as usize);
        for idx in 0..count as i32 {
            let origin_x = (idx % columns) * stride_x;
            let origin_y = (idx / columns) * stride_y;
            for y in 0..meta.height {
                for x in 0..meta.width {
                    bits.push(u8::from(frame.get((origin_x + x, origin_y + y)) == PixelState::Ink));
                }
            }
        }
        let mut font = Font::from_dictionary(bits, meta.height, meta.width, meta.sequence)?;
        font.set_interval(meta.interval);
        Ok(font)
    }
}

/// Menu seam of the canvas, routed back into the owning workspace.
/// Failures land in the log, never in the render thread.
struct WorkspaceMenu(Weak<Workspace>);

impl WorkspaceMenu {
    fn with(&self, op: &str, f: impl FnOnce(&Workspace) -> EditResult<()>) {
        if let Some(workspace) = self.0.upgrade() {
            if let Err(err) = f(workspace.as_ref()) {
                log::error!("{op}: {err}");
            }
        }
    }
}

impl MenuHandler for WorkspaceMenu {
    fn on_new_requested(&self) {
        self.with("new font", Workspace::create);
    }

    fn on_open_requested(&self) {
        self.with("open font", Workspace::load);
    }

    fn on_save_requested(&self) {
        self.with("save font", Workspace::save);
    }

    fn on_test_requested(&self) {
        self.with("font test", Workspace::test_font);
    }
}
