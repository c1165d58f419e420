//! The contracts between a font handle and its collaborators
//!
//! A [`crate::Font`] never parses font files, shapes text or draws outlines
//! itself. It holds one value of each trait below and drives them.
//!
//! - [`FontResource`] - already-parsed metadata: units per em, axes, palettes
//! - [`ShapingEngine`] - characters to glyph ids with clusters and advances
//! - [`OutlineProvider`] - glyph ids to outlines at the configured location

use std::collections::BTreeSet;

use crate::error::{OutlineError, Result};
use crate::types::{
    Axes, GlyphId, LayerMode, LayoutTable, Outline, Palette, Rgba, ScriptLanguages, ShapedGlyph,
    Tag, VarLocation,
};
use crate::ShapeRequest;

/// Font metadata that was decoded when the font was loaded
///
/// ```ignore
/// struct StaticFont;
///
/// impl FontResource for StaticFont {
///     fn units_per_em(&self) -> u16 {
///         1000
///     }
///
///     fn axes(&self) -> Axes {
///         Axes::default() // not a variable font
///     }
/// }
/// ```
pub trait FontResource: Send {
    /// The font's design grid, from the `head` table
    fn units_per_em(&self) -> u16;

    /// Variation axes in font order; empty for static fonts
    fn axes(&self) -> Axes;

    /// Color palettes, first palette being the default
    fn color_palettes(&self) -> Vec<Palette> {
        vec![vec![Rgba::black()]]
    }
}

/// Where characters become glyphs
///
/// Script itemisation, bidi and feature application all live behind this
/// trait. Clusters in the result index characters of the `text` argument.
pub trait ShapingEngine: Send {
    /// Identify yourself in logs and error messages
    fn name(&self) -> &'static str;

    /// Shape one run of text
    fn shape(&self, text: &str, request: &ShapeRequest<'_>) -> Result<Vec<ShapedGlyph>>;

    /// Feature tags the given layout table declares
    fn features(&self, table: LayoutTable) -> BTreeSet<Tag>;

    /// Scripts and their languages the given layout table declares
    fn scripts_and_languages(&self, table: LayoutTable) -> ScriptLanguages;
}

/// Where glyph ids become outlines
///
/// Implementations draw at whatever location was last passed to
/// [`OutlineProvider::set_var_location`].
pub trait OutlineProvider: Send {
    /// Your backend's signature
    fn name(&self) -> &'static str;

    /// Produce the outline of one glyph
    fn outline(&self, glyph: GlyphId, mode: LayerMode) -> std::result::Result<Outline, OutlineError>;

    /// Move to a new design-space location
    ///
    /// Static fonts have nothing to reconfigure.
    fn set_var_location(&mut self, _location: &VarLocation) {}
}
