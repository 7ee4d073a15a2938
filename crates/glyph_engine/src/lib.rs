#![warn(clippy::all)]
#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::must_use_candidate)]

//! Core model for the pixel font editor: pixel states, bit grids, the
//! glyph dictionary (`Font`), offscreen compositing (`VirtualCanvas`)
//! and the text-based font file format.
//!
//! This crate is UI-free. Everything interactive (paint surface, menu
//! bar, test window) lives in `glyph_edit` on top of these types.

mod pixel;
pub use pixel::*;

mod geometry;
pub use geometry::*;

mod bitmap;
pub use bitmap::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod virtual_canvas;
pub use virtual_canvas::*;

pub mod formats;
pub use formats::*;
