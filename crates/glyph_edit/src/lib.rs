#![warn(clippy::all)]
#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::must_use_candidate)]

//! Interactive layer of the pixel font editor.
//!
//! Builds on `glyph_engine`: the editable [`Canvas`] with its render
//! loop and reinitialization handshake, the menu bar compositor, the
//! font test window and the workspace configuration/load/save glue.
//! All host windowing goes through the [`HostSurface`] seam; this
//! crate never touches OS handles.

mod canvas;
pub use canvas::*;

mod error;
pub use error::*;

mod host;
pub use host::*;

mod menu;
pub use menu::*;

mod test_window;
pub use test_window::*;

mod workspace;
pub use workspace::*;
