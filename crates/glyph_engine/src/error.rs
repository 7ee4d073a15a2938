//! Unified error types for glyph_engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font file has invalid format: {message}")]
    InvalidFontFile { message: String },

    #[error("Glyph sequence has invalid format: {message}")]
    InvalidSequence { message: String },

    #[error("Font is corrupted or has wrong resolution ({bits} bits for {width}x{height} glyphs)")]
    CorruptDictionary { bits: usize, width: i32, height: i32 },

    #[error("Font character count is zero")]
    EmptyDictionary,

    #[error("Font character count mismatch: dictionary holds {dictionary} glyphs, sequence names {sequence}")]
    CharCountMismatch { dictionary: usize, sequence: usize },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
