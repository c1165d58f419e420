//! Error types for glyphrun

use thiserror::Error;

use crate::types::GlyphId;

pub type Result<T> = std::result::Result<T, GlyphRunError>;

/// Main error type for glyphrun
#[derive(Debug, Error)]
pub enum GlyphRunError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Shaping failed: {0}")]
    Shaping(#[from] ShapingError),

    #[error("Outline resolution failed: {0}")]
    Outline(#[from] OutlineError),

    #[error("Run lengths add up to {actual} characters but the text has {expected}")]
    RunLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid run boundary: start {start}, length {length}, text has {num_chars} characters")]
    InvalidRunBoundary {
        start: usize,
        length: usize,
        num_chars: usize,
    },

    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font loading errors
///
/// These only ever happen while a font handle is being built; a handle that
/// exists has a readable resource behind it.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Font file too large: {size} bytes (limit {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid font data")]
    InvalidData,

    #[error("Face index {index} out of range")]
    FaceIndexOutOfRange { index: u32 },

    #[error("Font reports units-per-em of zero")]
    ZeroUnitsPerEm,
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Outline resolution errors
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("Glyph {0} has no outline in this font")]
    GlyphNotFound(GlyphId),

    #[error("Drawing glyph {glyph} failed: {reason}")]
    DrawFailed { glyph: GlyphId, reason: String },

    #[error("Painting color glyph {glyph} failed: {reason}")]
    PaintFailed { glyph: GlyphId, reason: String },

    #[error("Backend error: {0}")]
    BackendError(String),
}
