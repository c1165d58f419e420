//! Glyph outlines from skrifa, at whatever location the font is set to
//!
//! [`SkrifaOutlines`] is the outline provider a [`glyphrun_core::Font`]
//! delegates to on a cache miss. It draws glyphs unhinted and unscaled, so
//! every path comes back in font units with y pointing up, ready for the
//! caller to scale and flip for its own canvas.
//!
//! Monochrome mode draws the glyph's `glyf`/`CFF` outline. Color-layer mode
//! walks the glyph's COLR paint graph and flattens it into an ordered list of
//! `(path, palette index)` layers; glyphs without color data become a single
//! layer in palette entry 0.

use std::sync::Arc;

use kurbo::{Affine, BezPath};
use skrifa::color::{Brush, ColorPainter, ColorStop, CompositeMode, Transform};
use skrifa::instance::{Location, LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId as SkrifaGlyphId, MetadataProvider, Tag as SkrifaTag};

use glyphrun_core::{
    error::OutlineError,
    traits::OutlineProvider,
    types::{ColorLayer, GlyphId, LayerMode, Outline, VarLocation, FOREGROUND_PALETTE_INDEX},
};

/// An OutlinePen that builds a kurbo path in font units
#[derive(Default)]
struct BezPen {
    path: BezPath,
}

impl BezPen {
    fn finish(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for BezPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path
            .quad_to((cx0 as f64, cy0 as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            (cx0 as f64, cy0 as f64),
            (cx1 as f64, cy1 as f64),
            (x as f64, y as f64),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Draw one glyph's outline at `location`
fn draw_glyph(
    font: &FontRef<'_>,
    glyph: GlyphId,
    location: LocationRef<'_>,
) -> Result<BezPath, OutlineError> {
    let outline = font
        .outline_glyphs()
        .get(SkrifaGlyphId::new(glyph))
        .ok_or(OutlineError::GlyphNotFound(glyph))?;

    let mut pen = BezPen::default();
    outline
        .draw(DrawSettings::unhinted(Size::unscaled(), location), &mut pen)
        .map_err(|err| OutlineError::DrawFailed {
            glyph,
            reason: err.to_string(),
        })?;
    Ok(pen.finish())
}

/// Palette entry a gradient is recorded with: its first stop's
fn first_stop_index(stops: &[ColorStop]) -> u16 {
    stops
        .first()
        .map(|stop| stop.palette_index)
        .unwrap_or(FOREGROUND_PALETTE_INDEX)
}

fn convert_transform(t: Transform) -> Affine {
    Affine::new([
        t.xx as f64,
        t.yx as f64,
        t.xy as f64,
        t.yy as f64,
        t.dx as f64,
        t.dy as f64,
    ])
}

/// A ColorPainter that records filled glyph clips as color layers
///
/// Every `fill` under a glyph clip becomes one layer: the innermost clip
/// glyph's outline, transformed by the transforms in effect when the clip
/// was pushed, colored by the brush's palette entry. Compositing modes and
/// gradient geometry are not represented in the flattened result.
struct LayerCollector<F> {
    draw: F,
    transform_stack: Vec<Affine>,
    clip_stack: Vec<Option<BezPath>>,
    layers: Vec<ColorLayer>,
    error: Option<OutlineError>,
}

impl<F> LayerCollector<F>
where
    F: FnMut(GlyphId) -> Result<BezPath, OutlineError>,
{
    fn new(draw: F) -> Self {
        Self {
            draw,
            transform_stack: vec![Affine::IDENTITY],
            clip_stack: Vec::new(),
            layers: Vec::new(),
            error: None,
        }
    }

    fn current_transform(&self) -> Affine {
        self.transform_stack
            .last()
            .copied()
            .unwrap_or(Affine::IDENTITY)
    }

    fn current_clip(&self) -> Option<&BezPath> {
        self.clip_stack.iter().rev().find_map(Option::as_ref)
    }

    fn finish(self) -> Result<Vec<ColorLayer>, OutlineError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.layers),
        }
    }
}

impl<F> ColorPainter for LayerCollector<F>
where
    F: FnMut(GlyphId) -> Result<BezPath, OutlineError>,
{
    fn push_transform(&mut self, transform: Transform) {
        let combined = self.current_transform() * convert_transform(transform);
        self.transform_stack.push(combined);
    }

    fn pop_transform(&mut self) {
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        }
    }

    fn push_clip_glyph(&mut self, glyph_id: SkrifaGlyphId) {
        let glyph = glyph_id.to_u32();
        match (self.draw)(glyph) {
            Ok(mut path) => {
                path.apply_affine(self.current_transform());
                self.clip_stack.push(Some(path));
            },
            Err(err) => {
                log::debug!("push_clip_glyph: glyph {glyph} could not be drawn: {err}");
                if self.error.is_none() {
                    self.error = Some(err);
                }
                self.clip_stack.push(None);
            },
        }
    }

    fn push_clip_box(&mut self, _clip_box: skrifa::raw::types::BoundingBox<f32>) {
        // A box bounds a glyph clip but never stands in for one
        self.clip_stack.push(None);
    }

    fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    fn fill(&mut self, brush: Brush<'_>) {
        let palette_index = match brush {
            Brush::Solid { palette_index, .. } => palette_index,
            Brush::LinearGradient { color_stops, .. }
            | Brush::RadialGradient { color_stops, .. }
            | Brush::SweepGradient { color_stops, .. } => first_stop_index(color_stops),
        };

        let Some(path) = self.current_clip().cloned() else {
            log::trace!("fill outside any glyph clip ignored");
            return;
        };
        self.layers.push(ColorLayer {
            path,
            palette_index,
        });
    }

    fn push_layer(&mut self, _composite_mode: CompositeMode) {}

    fn pop_layer(&mut self) {}
}

/// Outline provider backed by skrifa
pub struct SkrifaOutlines {
    data: Arc<[u8]>,
    face_index: u32,
    location: Location,
}

impl SkrifaOutlines {
    /// Wraps shared font bytes; fails if they do not parse
    pub fn new(data: Arc<[u8]>, face_index: u32) -> Result<Self, OutlineError> {
        FontRef::from_index(&data, face_index)
            .map_err(|err| OutlineError::BackendError(format!("skrifa cannot read font: {err}")))?;
        Ok(Self {
            data,
            face_index,
            location: Location::default(),
        })
    }

    fn font(&self) -> Result<FontRef<'_>, OutlineError> {
        FontRef::from_index(&self.data, self.face_index)
            .map_err(|err| OutlineError::BackendError(format!("skrifa cannot read font: {err}")))
    }

    /// Normalized coordinates of the configured location, one per axis
    pub fn normalized_coords(&self) -> Vec<f32> {
        self.location
            .coords()
            .iter()
            .map(|coord| coord.to_f32())
            .collect()
    }

    fn color_layers(&self, font: &FontRef<'_>, glyph: GlyphId) -> Result<Vec<ColorLayer>, OutlineError> {
        let location = LocationRef::from(&self.location);

        let Some(color_glyph) = font.color_glyphs().get(SkrifaGlyphId::new(glyph)) else {
            let path = draw_glyph(font, glyph, location)?;
            return Ok(vec![ColorLayer {
                path,
                palette_index: 0,
            }]);
        };

        let mut collector = LayerCollector::new(|clip| draw_glyph(font, clip, location));
        color_glyph
            .paint(location, &mut collector)
            .map_err(|err| OutlineError::PaintFailed {
                glyph,
                reason: format!("{err:?}"),
            })?;
        let layers = collector.finish()?;
        log::trace!("glyph {glyph}: {} color layers", layers.len());
        Ok(layers)
    }
}

impl OutlineProvider for SkrifaOutlines {
    fn name(&self) -> &'static str {
        "skrifa"
    }

    fn outline(&self, glyph: GlyphId, mode: LayerMode) -> Result<Outline, OutlineError> {
        let font = self.font()?;
        match mode {
            LayerMode::Monochrome => {
                draw_glyph(&font, glyph, LocationRef::from(&self.location)).map(Outline::Path)
            },
            LayerMode::ColorLayers => self.color_layers(&font, glyph).map(Outline::Layers),
        }
    }

    fn set_var_location(&mut self, location: &VarLocation) {
        // `new` parsed these bytes already, and they never change
        let font = match self.font() {
            Ok(font) => font,
            Err(err) => {
                debug_assert!(false, "validated font bytes stopped parsing: {err}");
                log::error!("Cannot apply variable location {location:?}: {err}");
                return;
            },
        };
        self.location = font.axes().location(
            location
                .iter()
                .map(|(tag, value)| (SkrifaTag::new(&tag.to_bytes()), value)),
        );
        log::debug!("skrifa outlines now at {location:?}");
    }
}

impl std::fmt::Debug for SkrifaOutlines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkrifaOutlines")
            .field("len", &self.data.len())
            .field("face_index", &self.face_index)
            .field("coords", &self.normalized_coords())
            .finish()
    }
}
