//! Glyph outlines, computed once per location
//!
//! Outlines depend on the variable location they were drawn at, so the
//! cache is only ever valid for one location. Two maps are kept, one per
//! [`LayerMode`], so a color-layer outline and a monochrome outline of the
//! same glyph never share or overwrite each other.
//!
//! Only the location tracker calls [`OutlineCache::purge`].

use std::sync::Arc;

use lru::LruCache;

use crate::config::OutlineCacheConfig;
use crate::error::OutlineError;
use crate::traits::OutlineProvider;
use crate::types::{GlyphId, LayerMode, Outline};

/// Counters describing how the cache has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub purges: u64,
    pub monochrome_entries: usize,
    pub color_entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered without the outline engine
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Per-font outline store keyed by glyph and layer mode
pub struct OutlineCache {
    monochrome: LruCache<GlyphId, Arc<Outline>>,
    color: LruCache<GlyphId, Arc<Outline>>,
    hits: u64,
    misses: u64,
    purges: u64,
}

impl OutlineCache {
    pub fn new(config: OutlineCacheConfig) -> Self {
        let make = || match config.capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            monochrome: make(),
            color: make(),
            hits: 0,
            misses: 0,
            purges: 0,
        }
    }

    fn map_mut(&mut self, mode: LayerMode) -> &mut LruCache<GlyphId, Arc<Outline>> {
        match mode {
            LayerMode::Monochrome => &mut self.monochrome,
            LayerMode::ColorLayers => &mut self.color,
        }
    }

    fn map(&self, mode: LayerMode) -> &LruCache<GlyphId, Arc<Outline>> {
        match mode {
            LayerMode::Monochrome => &self.monochrome,
            LayerMode::ColorLayers => &self.color,
        }
    }

    /// Return the cached outline, asking `provider` on a miss
    ///
    /// Failures are not cached; the next lookup asks the provider again.
    pub fn get(
        &mut self,
        glyph: GlyphId,
        mode: LayerMode,
        provider: &dyn OutlineProvider,
    ) -> Result<Arc<Outline>, OutlineError> {
        if let Some(outline) = self.map_mut(mode).get(&glyph) {
            let outline = Arc::clone(outline);
            self.hits += 1;
            log::trace!("outline cache hit: glyph {glyph} ({mode:?})");
            return Ok(outline);
        }

        self.misses += 1;
        log::trace!(
            "outline cache miss: glyph {glyph} ({mode:?}), asking {}",
            provider.name()
        );
        let outline = Arc::new(provider.outline(glyph, mode)?);
        self.map_mut(mode).put(glyph, Arc::clone(&outline));
        Ok(outline)
    }

    /// Look without computing or touching recency
    pub fn peek(&self, glyph: GlyphId, mode: LayerMode) -> Option<&Arc<Outline>> {
        self.map(mode).peek(&glyph)
    }

    /// Drop every entry in both maps
    pub fn purge(&mut self) {
        log::debug!(
            "Purging outline cache ({} monochrome, {} color entries)",
            self.monochrome.len(),
            self.color.len()
        );
        self.monochrome.clear();
        self.color.clear();
        self.purges += 1;
    }

    pub fn len(&self, mode: LayerMode) -> usize {
        self.map(mode).len()
    }

    pub fn is_empty(&self) -> bool {
        self.monochrome.is_empty() && self.color.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            purges: self.purges,
            monochrome_entries: self.monochrome.len(),
            color_entries: self.color.len(),
        }
    }
}

impl Default for OutlineCache {
    fn default() -> Self {
        Self::new(OutlineCacheConfig::default())
    }
}
