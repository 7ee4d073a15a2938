//! The host surface seam.
//!
//! The editor core never opens windows or pumps OS events. The host
//! owns the window shell and hands the core a pixel-blit surface plus
//! normalized pointer events; menu actions flow back out through the
//! [`MenuHandler`] capability trait injected at construction.

use std::sync::Arc;

use crate::EditResult;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
}

/// Pointer event in surface pixel coordinates (pre-scale; the core
/// divides by the canvas scale).
#[derive(Copy, Clone, Debug)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    pub button: PointerButton,
    pub action: PointerAction,
    pub modifiers: u32,
}

/// Pixel-blit sink owned by the render loop.
///
/// `begin_frame` clears to the background color, `end_frame` presents
/// (and paces) the frame. All methods are called from the render
/// thread only.
pub trait HostSurface: Send {
    fn begin_frame(&mut self, background: u32) -> EditResult<()>;
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) -> EditResult<()>;
    fn end_frame(&mut self) -> EditResult<()>;
    fn set_opacity(&mut self, value: f32) -> EditResult<()>;
    fn is_active(&self) -> bool;
}

/// Creates the surface on the render thread; `(width, height, title)`
/// are final surface pixels. Creation failure surfaces as a resource
/// error and closes the canvas.
pub type SurfaceFactory = Arc<dyn Fn(i32, i32, &str) -> EditResult<Box<dyn HostSurface>> + Send + Sync>;

/// Menu actions a canvas can raise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    New,
    Open,
    Save,
    MarkerToggle,
    TestFont,
}

/// Typed listener for menu actions, replacing any untyped owner
/// back-reference. `MarkerToggle` is handled inside the canvas and
/// never dispatched.
pub trait MenuHandler: Send + Sync {
    fn on_new_requested(&self);
    fn on_open_requested(&self);
    fn on_save_requested(&self);
    fn on_test_requested(&self);
}

/// Handler that ignores every request; useful for tests and read-only
/// canvases.
pub struct NullMenuHandler;

impl MenuHandler for NullMenuHandler {
    fn on_new_requested(&self) {}
    fn on_open_requested(&self) {}
    fn on_save_requested(&self) {}
    fn on_test_requested(&self) {}
}
