//! Glyphrun: text in, positioned glyphs with outlines out
//!
//! A [`Font`] handle shapes text with harfrust, draws glyph outlines with
//! skrifa, caches them per glyph and layer mode, and keeps both engines in
//! step with the font's variable location.
//!
//! # Example
//!
//! ```no_run
//! use glyphrun::prelude::*;
//!
//! let mut font = OtfFont::from_path("DejaVuSans.ttf", 0)?;
//! let run = font.build_run("office", &RunOptions::default())?;
//!
//! // Which characters does the second glyph cover?
//! let chars = run.map_glyphs_to_chars([1]);
//! println!("{} glyphs, glyph 1 covers {chars:?}", run.len());
//! # Ok::<(), glyphrun::GlyphRunError>(())
//! ```

use std::path::Path;

pub use glyphrun_core::{
    config, error, traits, types, CacheStats, Font, GlyphRun, GlyphRunError, OutlineCacheConfig,
    Result, RunOptions, ShapingParams,
};
pub use glyphrun_core::run::GlyphRecord;
pub use glyphrun_fontdb as fontdb;
pub use glyphrun_outline as outline;
pub use glyphrun_shape_hr as shape_hr;

use glyphrun_core::error::FontLoadError;
use glyphrun_fontdb::FontFile;
use glyphrun_outline::SkrifaOutlines;
use glyphrun_shape_hr::HarfrustEngine;

/// OpenType/TrueType fonts, shaped with harfrust and drawn with skrifa
pub struct OtfFont;

impl OtfFont {
    /// Opens face `face_index` of the font file at `path`
    pub fn from_path(path: impl AsRef<Path>, face_index: u32) -> Result<Font> {
        let file = FontFile::from_file_index(path, face_index)?;
        Self::assemble(file)
    }

    /// Builds a font handle over in-memory font bytes
    pub fn from_data(data: Vec<u8>, face_index: u32) -> Result<Font> {
        let file = FontFile::from_data_index(data, face_index)?;
        Self::assemble(file)
    }

    fn assemble(file: FontFile) -> Result<Font> {
        let shaper = HarfrustEngine::new(file.data().clone(), file.face_index());
        let outlines =
            SkrifaOutlines::new(file.data().clone(), file.face_index()).map_err(|err| {
                log::debug!("Outline backend rejected font: {err}");
                FontLoadError::InvalidData
            })?;
        Font::new(Box::new(file), Box::new(shaper), Box::new(outlines))
    }
}

/// Common imports for typical usage
pub mod prelude {
    pub use crate::OtfFont;
    pub use glyphrun_core::{
        error::{GlyphRunError, Result},
        run::GlyphRecord,
        types::{Direction, GlyphId, LayerMode, Outline, Tag, VarLocation},
        Font, GlyphRun, RunOptions, ShapingParams,
    };
}
