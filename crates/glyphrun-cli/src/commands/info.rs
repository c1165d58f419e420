//! Info command implementation
//!
//! Reports what a font offers: metrics, variation axes, layout inventories
//! and color palettes.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::InfoArgs;
use glyphrun::types::{Rgba, Tag};
use glyphrun::{Font, OtfFont};

#[derive(Serialize)]
struct AxisReport {
    tag: String,
    name: String,
    min: f32,
    default: f32,
    max: f32,
}

#[derive(Serialize)]
struct InfoReport {
    units_per_em: u16,
    shaper: &'static str,
    outlines: &'static str,
    axes: Vec<AxisReport>,
    scripts: BTreeMap<String, Vec<String>>,
    features_gsub: Vec<String>,
    features_gpos: Vec<String>,
    palettes: Vec<Vec<String>>,
}

fn hex(color: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
}

fn tags<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Vec<String> {
    tags.into_iter().map(|tag| tag.to_string()).collect()
}

fn report(font: &Font) -> InfoReport {
    InfoReport {
        units_per_em: font.units_per_em(),
        shaper: font.shaper_name(),
        outlines: font.outline_provider_name(),
        axes: font
            .axes()
            .iter()
            .map(|axis| AxisReport {
                tag: axis.tag.to_string(),
                name: axis.name.clone(),
                min: axis.min_value,
                default: axis.default_value,
                max: axis.max_value,
            })
            .collect(),
        scripts: font
            .scripts()
            .iter()
            .map(|(script, languages)| (script.to_string(), tags(languages)))
            .collect(),
        features_gsub: tags(font.features_gsub()),
        features_gpos: tags(font.features_gpos()),
        palettes: font
            .color_palettes()
            .iter()
            .map(|palette| palette.iter().copied().map(hex).collect())
            .collect(),
    }
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let font = OtfFont::from_path(&args.font_file, args.face_index)
        .with_context(|| format!("failed to open {}", args.font_file.display()))?;
    super::print_json(&report(&font), args.pretty)
}
