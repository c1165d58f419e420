//! Pure Rust shaping engine using harfrust
//!
//! Harfrust is a pure Rust port of HarfBuzz, so this engine shapes every
//! script HarfBuzz does without any C dependencies. It also answers the
//! layout inventory questions (which features and scripts GSUB and GPOS
//! declare) by reading those tables with `read-fonts`.
//!
//! Advances and offsets come back in font units. Clusters come back as
//! character indices into the shaped text, not byte offsets.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use harfrust::{
    Direction as HrDirection, Feature, FontRef as HrFontRef, GlyphBuffer, Language, Script,
    ShaperData, ShaperInstance, Tag as HrTag, UnicodeBuffer, Variation,
};
use read_fonts::{FontRef as ReadFontRef, TableProvider};

use glyphrun_core::{
    error::{Result, ShapingError},
    traits::ShapingEngine,
    types::{Direction, LayoutTable, ScriptLanguages, ShapedGlyph, Tag},
    ShapeRequest,
};

/// Text shaping powered by harfrust
#[derive(Clone)]
pub struct HarfrustEngine {
    data: Arc<[u8]>,
    face_index: u32,
}

impl HarfrustEngine {
    /// Creates an engine over shared font bytes
    pub fn new(data: Arc<[u8]>, face_index: u32) -> Self {
        Self { data, face_index }
    }

    fn hr_font(&self) -> Result<HrFontRef<'_>> {
        HrFontRef::from_index(&self.data, self.face_index)
            .map_err(|err| ShapingError::BackendError(format!("harfrust cannot read font: {err}")).into())
    }

    fn read_font(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::from_index(&self.data, self.face_index).ok()
    }

    /// Translates our direction enum to harfrust's format
    fn to_hr_direction(dir: Direction) -> HrDirection {
        match dir {
            Direction::LeftToRight => HrDirection::LeftToRight,
            Direction::RightToLeft => HrDirection::RightToLeft,
            Direction::TopToBottom => HrDirection::TopToBottom,
            Direction::BottomToTop => HrDirection::BottomToTop,
        }
    }

    fn to_hr_tag(tag: Tag) -> HrTag {
        HrTag::new(&tag.to_bytes())
    }

    fn from_raw_tag(bytes: [u8; 4]) -> Tag {
        Tag::new(&bytes)
    }

    /// Character index for every byte offset of `text`, plus one past the end
    fn char_index_by_byte(text: &str) -> Vec<usize> {
        let mut table = vec![0; text.len() + 1];
        let mut char_index = 0;
        for (byte, ch) in text.char_indices() {
            for slot in &mut table[byte..byte + ch.len_utf8()] {
                *slot = char_index;
            }
            char_index += 1;
        }
        table[text.len()] = char_index;
        table
    }

    /// Convert harfrust's glyph buffer, turning byte clusters into character indices
    fn extract_glyphs(buffer: &GlyphBuffer, text: &str) -> Result<Vec<ShapedGlyph>> {
        let char_index = Self::char_index_by_byte(text);
        buffer
            .glyph_infos()
            .iter()
            .zip(buffer.glyph_positions())
            .map(|(info, pos)| {
                let cluster = *char_index.get(info.cluster as usize).ok_or_else(|| {
                    ShapingError::BackendError(format!(
                        "cluster byte offset {} outside {} bytes of text",
                        info.cluster,
                        text.len()
                    ))
                })?;
                Ok(ShapedGlyph {
                    glyph: info.glyph_id,
                    cluster,
                    ax: pos.x_advance as f32,
                    ay: pos.y_advance as f32,
                    dx: pos.x_offset as f32,
                    dy: pos.y_offset as f32,
                })
            })
            .collect()
    }
}

impl ShapingEngine for HarfrustEngine {
    fn name(&self) -> &'static str {
        "harfrust"
    }

    fn shape(&self, text: &str, request: &ShapeRequest<'_>) -> Result<Vec<ShapedGlyph>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let hr_font = self.hr_font()?;

        // ShaperData caches font tables and is the expensive part
        let shaper_data = ShaperData::new(&hr_font);

        let instance = if request.location.is_empty() {
            None
        } else {
            let variations: Vec<Variation> = request
                .location
                .iter()
                .map(|(tag, value)| Variation {
                    tag: Self::to_hr_tag(tag),
                    value,
                })
                .collect();
            Some(ShaperInstance::from_variations(&hr_font, variations))
        };

        let shaper = shaper_data
            .shaper(&hr_font)
            .instance(instance.as_ref())
            .build();

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);

        if let Some(direction) = request.direction {
            buffer.set_direction(Self::to_hr_direction(direction));
        }

        if let Some(lang) = request.language {
            match Language::from_str(lang) {
                Ok(language) => buffer.set_language(language),
                Err(_) => log::warn!("Ignoring unparsable language {lang:?}"),
            }
        }

        if let Some(script_str) = request.script {
            let script = Tag::from_str(script_str)
                .ok()
                .and_then(|tag| Script::from_iso15924_tag(Self::to_hr_tag(tag)));
            match script {
                Some(script) => buffer.set_script(script),
                None => log::warn!("Ignoring unknown script {script_str:?}"),
            }
        }

        // Anything left unset is guessed from the text
        buffer.guess_segment_properties();

        let features: Vec<Feature> = request
            .features
            .iter()
            .map(|&(tag, value)| Feature {
                tag: Self::to_hr_tag(tag),
                value,
                start: 0,
                end: u32::MAX,
            })
            .collect();

        let output = shaper.shape(buffer, &features);
        let glyphs = Self::extract_glyphs(&output, text)?;
        log::trace!("harfrust: {} chars -> {} glyphs", text.chars().count(), glyphs.len());
        Ok(glyphs)
    }

    fn features(&self, table: LayoutTable) -> BTreeSet<Tag> {
        let Some(font) = self.read_font() else {
            return BTreeSet::new();
        };
        let list = match table {
            LayoutTable::Gsub => font.gsub().and_then(|gsub| gsub.feature_list()),
            LayoutTable::Gpos => font.gpos().and_then(|gpos| gpos.feature_list()),
        };
        match list {
            Ok(list) => list
                .feature_records()
                .iter()
                .map(|record| Self::from_raw_tag(record.feature_tag().to_be_bytes()))
                .collect(),
            Err(_) => BTreeSet::new(),
        }
    }

    fn scripts_and_languages(&self, table: LayoutTable) -> ScriptLanguages {
        let Some(font) = self.read_font() else {
            return ScriptLanguages::new();
        };
        let list = match table {
            LayoutTable::Gsub => font.gsub().and_then(|gsub| gsub.script_list()),
            LayoutTable::Gpos => font.gpos().and_then(|gpos| gpos.script_list()),
        };
        let Ok(list) = list else {
            return ScriptLanguages::new();
        };

        let data = list.offset_data();
        list.script_records()
            .iter()
            .map(|record| {
                let languages = record
                    .script(data)
                    .map(|script| {
                        script
                            .lang_sys_records()
                            .iter()
                            .map(|lang| Self::from_raw_tag(lang.lang_sys_tag().to_be_bytes()))
                            .collect()
                    })
                    .unwrap_or_default();
                (Self::from_raw_tag(record.script_tag().to_be_bytes()), languages)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphrun_core::types::VarLocation;

    fn request(location: &VarLocation) -> ShapeRequest<'_> {
        ShapeRequest {
            features: &[],
            location,
            direction: None,
            language: None,
            script: None,
        }
    }

    #[test]
    fn test_empty_text() {
        let engine = HarfrustEngine::new(Arc::from(Vec::new()), 0);
        let location = VarLocation::new();
        let result = engine.shape("", &request(&location)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_unreadable_font_is_an_error() {
        let engine = HarfrustEngine::new(Arc::from(vec![0u8; 64]), 0);
        let location = VarLocation::new();
        assert!(engine.shape("Hi", &request(&location)).is_err());
    }

    #[test]
    fn test_unreadable_font_has_empty_inventories() {
        let engine = HarfrustEngine::new(Arc::from(vec![0u8; 64]), 0);
        assert!(engine.features(LayoutTable::Gsub).is_empty());
        assert!(engine.scripts_and_languages(LayoutTable::Gpos).is_empty());
    }

    #[test]
    fn test_char_index_by_byte() {
        // 'é' takes two bytes, '€' three
        let table = HarfrustEngine::char_index_by_byte("aé€b");
        assert_eq!(table, vec![0, 1, 1, 2, 2, 2, 3, 4]);
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(
            HarfrustEngine::to_hr_direction(Direction::RightToLeft),
            HrDirection::RightToLeft
        );
        assert_eq!(
            HarfrustEngine::to_hr_direction(Direction::TopToBottom),
            HrDirection::TopToBottom
        );
    }
}
