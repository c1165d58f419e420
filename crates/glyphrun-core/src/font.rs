//! The font handle: one font resource, its shaper, its outlines
//!
//! A [`Font`] owns mutable state, the outline cache and the active variable
//! location, and changes it as a side effect of shaping. It is `Send` but
//! not meant to be shared: give each worker its own handle, or put one
//! behind a lock.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::OutlineCacheConfig;
use crate::error::{FontLoadError, Result};
use crate::location::VarLocationTracker;
use crate::outline_cache::{CacheStats, OutlineCache};
use crate::run::{sub_runs, GlyphRecord, GlyphRun, GlyphRunBuilder, RunOptions};
use crate::traits::{FontResource, OutlineProvider, ShapingEngine};
use crate::types::{
    Axes, GlyphId, LayerMode, LayoutTable, Outline, Palette, ScriptLanguages, Tag, VarLocation,
};
use crate::{ShapeRequest, ShapingParams};

/// Union of two script/language inventories
///
/// GSUB and GPOS each declare their own scripts; a script present in either
/// is supported, with every language either table lists for it.
pub fn merge_scripts_and_languages(a: &ScriptLanguages, b: &ScriptLanguages) -> ScriptLanguages {
    let mut merged = a.clone();
    for (script, languages) in b {
        merged
            .entry(*script)
            .or_default()
            .extend(languages.iter().copied());
    }
    merged
}

/// A loaded font ready to shape text
pub struct Font {
    resource: Box<dyn FontResource>,
    shaper: Box<dyn ShapingEngine>,
    outline_provider: Box<dyn OutlineProvider>,
    outline_cache: OutlineCache,
    location: VarLocationTracker,

    units_per_em: OnceCell<u16>,
    axes: OnceCell<Axes>,
    scripts: OnceCell<ScriptLanguages>,
    features_gsub: OnceCell<BTreeSet<Tag>>,
    features_gpos: OnceCell<BTreeSet<Tag>>,
    color_palettes: OnceCell<Vec<Palette>>,
}

impl Font {
    /// Assemble a font from its collaborators
    ///
    /// Fails when the resource reports a zero units-per-em, which no usable
    /// font has.
    pub fn new(
        resource: Box<dyn FontResource>,
        shaper: Box<dyn ShapingEngine>,
        outline_provider: Box<dyn OutlineProvider>,
    ) -> Result<Self> {
        if resource.units_per_em() == 0 {
            return Err(FontLoadError::ZeroUnitsPerEm.into());
        }

        log::debug!(
            "Font handle created: shaper={}, outlines={}",
            shaper.name(),
            outline_provider.name()
        );

        Ok(Self {
            resource,
            shaper,
            outline_provider,
            outline_cache: OutlineCache::new(OutlineCacheConfig::from_env()),
            location: VarLocationTracker::new(),
            units_per_em: OnceCell::new(),
            axes: OnceCell::new(),
            scripts: OnceCell::new(),
            features_gsub: OnceCell::new(),
            features_gpos: OnceCell::new(),
            color_palettes: OnceCell::new(),
        })
    }

    /// Replace the outline cache with one sized by `config`
    pub fn with_cache_config(mut self, config: OutlineCacheConfig) -> Self {
        self.outline_cache = OutlineCache::new(config);
        self
    }

    pub fn units_per_em(&self) -> u16 {
        *self
            .units_per_em
            .get_or_init(|| self.resource.units_per_em())
    }

    /// Variation axes; empty for static fonts
    pub fn axes(&self) -> &Axes {
        self.axes.get_or_init(|| self.resource.axes())
    }

    /// Scripts and languages from GSUB and GPOS combined
    pub fn scripts(&self) -> &ScriptLanguages {
        self.scripts.get_or_init(|| {
            let gsub = self.shaper.scripts_and_languages(LayoutTable::Gsub);
            let gpos = self.shaper.scripts_and_languages(LayoutTable::Gpos);
            merge_scripts_and_languages(&gsub, &gpos)
        })
    }

    pub fn features_gsub(&self) -> &BTreeSet<Tag> {
        self.features_gsub
            .get_or_init(|| self.shaper.features(LayoutTable::Gsub))
    }

    pub fn features_gpos(&self) -> &BTreeSet<Tag> {
        self.features_gpos
            .get_or_init(|| self.shaper.features(LayoutTable::Gpos))
    }

    /// Color palettes; the first one is the default
    pub fn color_palettes(&self) -> &[Palette] {
        self.color_palettes
            .get_or_init(|| self.resource.color_palettes())
    }

    /// The location outlines are currently drawn at
    pub fn var_location(&self) -> &VarLocation {
        self.location.current()
    }

    /// Move to `location`, purging cached outlines if it differs
    ///
    /// Axes the font does not define are ignored. Returns whether the
    /// location changed.
    pub fn set_var_location(&mut self, location: Option<&VarLocation>) -> bool {
        let axes = self.axes.get_or_init(|| self.resource.axes());
        self.location.set_location(
            location,
            axes,
            &mut self.outline_cache,
            self.outline_provider.as_mut(),
        )
    }

    /// One outline at the current location, from cache when possible
    pub fn outline(&mut self, glyph: GlyphId, mode: LayerMode) -> Result<Arc<Outline>> {
        Ok(self
            .outline_cache
            .get(glyph, mode, self.outline_provider.as_ref())?)
    }

    /// Outlines for several glyphs, in the order given
    pub fn outlines(
        &mut self,
        glyphs: impl IntoIterator<Item = GlyphId>,
        mode: LayerMode,
    ) -> Result<Vec<Arc<Outline>>> {
        glyphs
            .into_iter()
            .map(|glyph| self.outline(glyph, mode))
            .collect()
    }

    /// Shape `text` and attach an outline to every glyph
    ///
    /// Applies `params.variations` first, which may purge the outline cache.
    /// Clusters in the result index characters of `text`.
    pub fn shape(&mut self, text: &str, params: &ShapingParams) -> Result<Vec<GlyphRecord>> {
        self.set_var_location(params.variations.as_ref());

        let request = ShapeRequest {
            features: &params.features,
            location: self.location.current(),
            direction: params.direction,
            language: params.language.as_deref(),
            script: params.script.as_deref(),
        };
        let shaped = self.shaper.shape(text, &request)?;
        log::debug!(
            "{} shaped {} characters into {} glyphs",
            self.shaper.name(),
            text.chars().count(),
            shaped.len()
        );

        shaped
            .into_iter()
            .map(|glyph| {
                let outline = self.outline(glyph.glyph, params.layer_mode)?;
                Ok(GlyphRecord {
                    glyph: glyph.glyph,
                    cluster: glyph.cluster,
                    ax: glyph.ax,
                    ay: glyph.ay,
                    dx: glyph.dx,
                    dy: glyph.dy,
                    outline,
                    pos: None,
                })
            })
            .collect()
    }

    /// Shape every sub-run of `text` and merge them into one positioned run
    pub fn build_run(&mut self, text: &str, options: &RunOptions) -> Result<GlyphRun> {
        let runs = sub_runs(text, &options.run_lengths)?;
        let num_chars: usize = runs.iter().map(|(_, length, _)| length).sum();
        let vertical = options
            .params
            .direction
            .is_some_and(|direction| direction.is_vertical());

        let mut builder = GlyphRunBuilder::new(num_chars, self.units_per_em(), vertical);
        for (start, length, slice) in runs {
            let records = self.shape(slice, &options.params)?;
            builder.push_sub_run(start, length, records)?;
        }
        builder.finish()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.outline_cache.stats()
    }

    pub fn shaper_name(&self) -> &'static str {
        self.shaper.name()
    }

    pub fn outline_provider_name(&self) -> &'static str {
        self.outline_provider.name()
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("shaper", &self.shaper.name())
            .field("outline_provider", &self.outline_provider.name())
            .field("var_location", self.location.current())
            .field("cache", &self.outline_cache.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> Tag {
        s.parse().unwrap()
    }

    #[test]
    fn test_merge_scripts_and_languages() {
        let gsub = ScriptLanguages::from([
            (tag("latn"), BTreeSet::from([tag("TRK"), tag("NLD")])),
            (tag("cyrl"), BTreeSet::new()),
        ]);
        let gpos = ScriptLanguages::from([
            (tag("latn"), BTreeSet::from([tag("ROM")])),
            (tag("arab"), BTreeSet::from([tag("URD")])),
        ]);

        let merged = merge_scripts_and_languages(&gsub, &gpos);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[&tag("latn")],
            BTreeSet::from([tag("NLD"), tag("ROM"), tag("TRK")])
        );
        assert!(merged[&tag("cyrl")].is_empty());
        assert_eq!(merged[&tag("arab")], BTreeSet::from([tag("URD")]));
    }
}
