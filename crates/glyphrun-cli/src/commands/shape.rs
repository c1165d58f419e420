//! Shape command implementation
//!
//! Builds one glyph run and prints it in a HarfBuzz-like JSON layout, with
//! the glyph-to-character cluster map alongside.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::ShapeArgs;
use glyphrun::types::{Direction, LayerMode, Outline, Tag, VarLocation};
use glyphrun::{GlyphRun, OtfFont, RunOptions, ShapingParams};

#[derive(Serialize)]
struct GlyphReport {
    g: u32,
    cl: usize,
    ax: f32,
    ay: f32,
    dx: f32,
    dy: f32,
    x: f32,
    y: f32,
    layers: usize,
    chars: Vec<usize>,
}

#[derive(Serialize)]
struct ShapeReport {
    text: String,
    units_per_em: u16,
    vertical: bool,
    var_location: BTreeMap<String, f32>,
    end_pos: (f32, f32),
    glyphs: Vec<GlyphReport>,
}

/// Parse "liga=0,+smcp,-kern,calt" into feature settings
pub(crate) fn parse_features(input: Option<&str>) -> Result<Vec<(Tag, u32)>> {
    let Some(input) = input else {
        return Ok(Vec::new());
    };

    let mut result = Vec::new();
    for part in input.split([',', ' ']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (tag, value) = if let Some(tag) = part.strip_prefix('+') {
            (tag, 1)
        } else if let Some(tag) = part.strip_prefix('-') {
            (tag, 0)
        } else if let Some((tag, value)) = part.split_once('=') {
            let value = value
                .parse()
                .with_context(|| format!("invalid feature value in {part:?}"))?;
            (tag, value)
        } else {
            (part, 1)
        };

        let tag: Tag = tag
            .parse()
            .with_context(|| format!("invalid feature tag in {part:?}"))?;
        result.push((tag, value));
    }

    Ok(result)
}

/// Parse "wght=700,wdth=80" into a variable location
pub(crate) fn parse_variations(input: Option<&str>) -> Result<Option<VarLocation>> {
    let Some(input) = input else {
        return Ok(None);
    };

    let mut location = VarLocation::new();
    for part in input.split([',', ' ']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((tag, value)) = part.split_once('=') else {
            bail!("variation {part:?} must look like tag=value");
        };
        let tag: Tag = tag
            .parse()
            .with_context(|| format!("invalid axis tag in {part:?}"))?;
        let value: f32 = value
            .parse()
            .with_context(|| format!("invalid axis value in {part:?}"))?;
        location.set(tag, value);
    }

    Ok(Some(location))
}

fn params(args: &ShapeArgs) -> Result<ShapingParams> {
    let direction = match args.direction.as_deref() {
        Some(direction) => Some(direction.parse::<Direction>().map_err(anyhow::Error::msg)?),
        None => None,
    };

    Ok(ShapingParams {
        features: parse_features(args.features.as_deref())?,
        variations: parse_variations(args.variations.as_deref())?,
        direction,
        language: args.language.clone(),
        script: args.script.clone(),
        layer_mode: LayerMode::from(args.color_layers),
    })
}

fn report(text: &str, run: &GlyphRun, var_location: &VarLocation) -> ShapeReport {
    let glyphs = run
        .glyphs()
        .iter()
        .enumerate()
        .map(|(index, glyph)| {
            let (x, y) = glyph.pos.unwrap_or_default();
            let layers = match glyph.outline.as_ref() {
                Outline::Path(_) => 1,
                Outline::Layers(layers) => layers.len(),
            };
            GlyphReport {
                g: glyph.glyph,
                cl: glyph.cluster,
                ax: glyph.ax,
                ay: glyph.ay,
                dx: glyph.dx,
                dy: glyph.dy,
                x,
                y,
                layers,
                chars: run.map_glyphs_to_chars([index]).into_iter().collect(),
            }
        })
        .collect();

    ShapeReport {
        text: text.to_string(),
        units_per_em: run.units_per_em(),
        vertical: run.is_vertical(),
        var_location: var_location
            .iter()
            .map(|(tag, value)| (tag.to_string(), value))
            .collect(),
        end_pos: run.end_pos(),
        glyphs,
    }
}

pub fn run(args: &ShapeArgs) -> Result<()> {
    let options = RunOptions {
        run_lengths: args.run_lengths.clone(),
        params: params(args)?,
    };

    let mut font = OtfFont::from_path(&args.font_file, args.face_index)
        .with_context(|| format!("failed to open {}", args.font_file.display()))?;
    let run = font
        .build_run(&args.text, &options)
        .with_context(|| format!("failed to shape {:?}", args.text))?;
    log::debug!("cache after shaping: {:?}", font.cache_stats());

    super::print_json(&report(&args.text, &run, font.var_location()), args.pretty)
}
