//! Unified error types for glyph_edit

use glyph_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to create render surface: {message}")]
    SurfaceCreation { message: String },

    #[error("Render surface failure: {message}")]
    Surface { message: String },

    #[error("{message}")]
    InvalidSetting { message: String },
}

pub type EditResult<T> = std::result::Result<T, EditError>;
