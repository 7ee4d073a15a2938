//! File format support.
//!
//! The editor persists exactly one format: the text-based glyph
//! dictionary described in `text_font`.

mod text_font;
pub use text_font::*;
