use std::collections::{BTreeSet, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use glyphrun_core::error::{FontLoadError, OutlineError};
use glyphrun_core::traits::{FontResource, OutlineProvider, ShapingEngine};
use glyphrun_core::types::{
    Axes, Axis, ColorLayer, Direction, GlyphId, LayerMode, LayoutTable, Outline, ScriptLanguages,
    ShapedGlyph, Tag, VarLocation,
};
use glyphrun_core::{
    Font, GlyphRunError, OutlineCacheConfig, RunOptions, ShapeRequest, ShapingParams,
};
use kurbo::{BezPath, Shape};

const WGHT: Tag = Tag::new(b"wght");
const LIGA: Tag = Tag::new(b"liga");
const FI_LIGATURE: GlyphId = 1000;

#[derive(Default, Clone)]
struct Counters {
    axes: Arc<AtomicUsize>,
    shapes: Arc<AtomicUsize>,
    features: Arc<AtomicUsize>,
    outlines: Arc<AtomicUsize>,
    relocations: Arc<AtomicUsize>,
}

struct TestResource {
    units_per_em: u16,
    counters: Counters,
}

impl FontResource for TestResource {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn axes(&self) -> Axes {
        self.counters.axes.fetch_add(1, Ordering::SeqCst);
        Axes::new(vec![Axis {
            tag: WGHT,
            name: "Weight".into(),
            min_value: 100.0,
            default_value: 400.0,
            max_value: 900.0,
        }])
    }
}

/// Maps each character to its code point, forms an "fi" ligature
struct LigatureShaper {
    counters: Counters,
}

impl ShapingEngine for LigatureShaper {
    fn name(&self) -> &'static str {
        "ligature-shaper"
    }

    fn shape(
        &self,
        text: &str,
        request: &ShapeRequest<'_>,
    ) -> glyphrun_core::Result<Vec<ShapedGlyph>> {
        self.counters.shapes.fetch_add(1, Ordering::SeqCst);
        let ligatures = !request.features.contains(&(LIGA, 0));
        let vertical = request.direction.is_some_and(|d| d.is_vertical());
        let chars: Vec<char> = text.chars().collect();

        let mut glyphs = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let (glyph, consumed) = if ligatures && chars[i] == 'f' && chars.get(i + 1) == Some(&'i') {
                (FI_LIGATURE, 2)
            } else {
                (chars[i] as GlyphId, 1)
            };
            let advance = if glyph == FI_LIGATURE { 550.0 } else { 500.0 };
            glyphs.push(ShapedGlyph {
                glyph,
                cluster: i,
                ax: if vertical { 0.0 } else { advance },
                ay: if vertical { -1000.0 } else { 0.0 },
                dx: 0.0,
                dy: 0.0,
            });
            i += consumed;
        }

        if request.direction == Some(Direction::RightToLeft) {
            glyphs.reverse();
        }
        Ok(glyphs)
    }

    fn features(&self, table: LayoutTable) -> BTreeSet<Tag> {
        self.counters.features.fetch_add(1, Ordering::SeqCst);
        match table {
            LayoutTable::Gsub => BTreeSet::from([LIGA]),
            LayoutTable::Gpos => BTreeSet::from([Tag::new(b"kern")]),
        }
    }

    fn scripts_and_languages(&self, table: LayoutTable) -> ScriptLanguages {
        let latn = Tag::new(b"latn");
        match table {
            LayoutTable::Gsub => ScriptLanguages::from([(latn, BTreeSet::from([Tag::new(b"TRK ")]))]),
            LayoutTable::Gpos => ScriptLanguages::from([
                (latn, BTreeSet::new()),
                (Tag::new(b"grek"), BTreeSet::new()),
            ]),
        }
    }
}

/// Draws a bar whose width encodes the current weight
struct WeightOutlines {
    weight: f64,
    counters: Counters,
}

impl OutlineProvider for WeightOutlines {
    fn name(&self) -> &'static str {
        "weight-outlines"
    }

    fn outline(&self, glyph: GlyphId, mode: LayerMode) -> Result<Outline, OutlineError> {
        self.counters.outlines.fetch_add(1, Ordering::SeqCst);
        if glyph == '?' as GlyphId {
            return Err(OutlineError::GlyphNotFound(glyph));
        }
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((self.weight, 0.0));
        path.line_to((self.weight, 700.0));
        path.close_path();
        Ok(match mode {
            LayerMode::Monochrome => Outline::Path(path),
            LayerMode::ColorLayers => Outline::Layers(vec![ColorLayer {
                path,
                palette_index: 0,
            }]),
        })
    }

    fn set_var_location(&mut self, location: &VarLocation) {
        self.counters.relocations.fetch_add(1, Ordering::SeqCst);
        self.weight = location.get(WGHT).unwrap_or(400.0) as f64;
    }
}

fn test_font() -> (Font, Counters) {
    let counters = Counters::default();
    let font = Font::new(
        Box::new(TestResource {
            units_per_em: 1000,
            counters: counters.clone(),
        }),
        Box::new(LigatureShaper {
            counters: counters.clone(),
        }),
        Box::new(WeightOutlines {
            weight: 400.0,
            counters: counters.clone(),
        }),
    )
    .unwrap()
    .with_cache_config(OutlineCacheConfig::unbounded());
    (font, counters)
}

fn outline_width(outline: &Outline) -> f64 {
    outline.paths()[0].bounding_box().width()
}

#[test]
fn fi_ligature_maps_both_ways() {
    let (mut font, _) = test_font();
    let run = font.build_run("fi", &RunOptions::default()).unwrap();

    assert_eq!(run.len(), 1);
    assert_eq!(run.glyphs()[0].glyph, FI_LIGATURE);
    assert_eq!(run.glyphs()[0].cluster, 0);
    assert_eq!(run.map_glyphs_to_chars([0]), BTreeSet::from([0, 1]));
    assert_eq!(run.map_chars_to_glyphs([0]), BTreeSet::from([0]));
    assert_eq!(run.map_chars_to_glyphs([1]), BTreeSet::from([0]));
}

#[test]
fn disabling_liga_keeps_two_glyphs() {
    let (mut font, _) = test_font();
    let options = RunOptions {
        params: ShapingParams {
            features: vec![(LIGA, 0)],
            ..Default::default()
        },
        ..Default::default()
    };
    let run = font.build_run("fi", &options).unwrap();
    assert_eq!(run.len(), 2);
    assert_eq!(run.map_chars_to_glyphs([1]), BTreeSet::from([1]));
}

#[test]
fn second_sub_run_clusters_are_offset() {
    let (mut font, _) = test_font();
    let text = "abcdefgh";

    let alone = font.shape("defgh", &ShapingParams::default()).unwrap();
    let options = RunOptions {
        run_lengths: vec![3, 5],
        ..Default::default()
    };
    let run = font.build_run(text, &options).unwrap();

    let merged: Vec<usize> = run.glyphs()[3..].iter().map(|g| g.cluster).collect();
    let expected: Vec<usize> = alone.iter().map(|g| g.cluster + 3).collect();
    assert_eq!(merged, expected);
    assert!(run.glyphs().iter().all(|g| g.cluster < run.num_chars()));
}

#[test]
fn run_length_mismatch_fails() {
    let (mut font, counters) = test_font();
    let options = RunOptions {
        run_lengths: vec![3, 4],
        ..Default::default()
    };
    let err = font.build_run("abcdefgh", &options).unwrap_err();
    assert!(matches!(
        err,
        GlyphRunError::RunLengthMismatch {
            expected: 8,
            actual: 7
        }
    ));
    assert_eq!(counters.shapes.load(Ordering::SeqCst), 0, "nothing is shaped");
}

#[test]
fn positions_form_a_running_sum() {
    let (mut font, _) = test_font();
    let options = RunOptions {
        run_lengths: vec![2, 3],
        ..Default::default()
    };
    let run = font.build_run("fixyz", &options).unwrap();

    let glyphs = run.glyphs();
    assert_eq!(glyphs[0].pos, Some((0.0, 0.0)));
    for pair in glyphs.windows(2) {
        let (x, y) = pair[0].pos.unwrap();
        assert_eq!(pair[1].pos, Some((x + pair[0].ax, y + pair[0].ay)));
    }
    let total: f32 = glyphs.iter().map(|g| g.ax).sum();
    assert_eq!(run.end_pos(), (total, 0.0));
    assert_eq!(run.end_pos(), (2050.0, 0.0));
}

#[test]
fn vertical_direction_marks_run() {
    let (mut font, _) = test_font();
    let options = RunOptions {
        params: ShapingParams {
            direction: Some(Direction::TopToBottom),
            ..Default::default()
        },
        ..Default::default()
    };
    let run = font.build_run("ab", &options).unwrap();
    assert!(run.is_vertical());
    assert_eq!(run.end_pos(), (0.0, -2000.0));
    assert_eq!(run.units_per_em(), 1000);
}

#[test]
fn right_to_left_mapping() {
    let (mut font, _) = test_font();
    let options = RunOptions {
        params: ShapingParams {
            direction: Some(Direction::RightToLeft),
            ..Default::default()
        },
        ..Default::default()
    };
    let run = font.build_run("abc", &options).unwrap();
    assert_eq!(run.map_chars_to_glyphs([0]), BTreeSet::from([2]));
    assert_eq!(run.map_glyphs_to_chars([0]), BTreeSet::from([2]));
    assert!(!run.is_vertical());
}

#[test]
fn color_and_monochrome_entries_are_independent() {
    let (mut font, counters) = test_font();

    let color = font.outline('a' as GlyphId, LayerMode::ColorLayers).unwrap();
    let mono = font.outline('a' as GlyphId, LayerMode::Monochrome).unwrap();
    assert!(color.is_layered());
    assert!(!mono.is_layered());

    let color_again = font.outline('a' as GlyphId, LayerMode::ColorLayers).unwrap();
    assert!(Arc::ptr_eq(&color, &color_again));

    let stats = font.cache_stats();
    assert_eq!(stats.monochrome_entries, 1);
    assert_eq!(stats.color_entries, 1);
    assert_eq!(counters.outlines.load(Ordering::SeqCst), 2);
}

#[test]
fn same_location_twice_keeps_cache() {
    let (mut font, counters) = test_font();
    let bold = VarLocation::new().with(WGHT, 700.0);
    let params = ShapingParams {
        variations: Some(bold.clone()),
        ..Default::default()
    };

    font.shape("ab", &params).unwrap();
    font.shape("ab", &ShapingParams {
        variations: Some(VarLocation::new().with(WGHT, 700.0)),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(font.cache_stats().purges, 1);
    assert_eq!(counters.relocations.load(Ordering::SeqCst), 1);
    assert_eq!(counters.outlines.load(Ordering::SeqCst), 2);
    assert_eq!(font.var_location(), &bold);
}

#[test]
fn new_location_purges_before_next_lookup() {
    let (mut font, _) = test_font();
    let light = ShapingParams {
        variations: Some(VarLocation::new().with(WGHT, 200.0)),
        ..Default::default()
    };
    let heavy = ShapingParams {
        variations: Some(VarLocation::new().with(WGHT, 900.0)),
        ..Default::default()
    };

    let before = font.shape("a", &light).unwrap();
    let after = font.shape("a", &heavy).unwrap();

    assert_eq!(outline_width(&before[0].outline), 200.0);
    assert_eq!(outline_width(&after[0].outline), 900.0);
    assert!(!Arc::ptr_eq(&before[0].outline, &after[0].outline));
}

#[test]
fn unknown_axis_does_not_purge() {
    let (mut font, counters) = test_font();
    font.shape("ab", &ShapingParams::default()).unwrap();

    let with_unknown = ShapingParams {
        variations: Some(VarLocation::new().with(Tag::new(b"XXXX"), 42.0)),
        ..Default::default()
    };
    font.shape("ab", &with_unknown).unwrap();

    assert_eq!(font.cache_stats().purges, 0);
    assert_eq!(counters.relocations.load(Ordering::SeqCst), 0);
    assert_eq!(counters.outlines.load(Ordering::SeqCst), 2);
    assert!(font.var_location().is_empty());
}

#[test]
fn missing_outline_is_propagated() {
    let (mut font, _) = test_font();
    let err = font.build_run("a?b", &RunOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        GlyphRunError::Outline(OutlineError::GlyphNotFound(g)) if g == '?' as GlyphId
    ));
}

#[test]
fn zero_units_per_em_is_a_construction_failure() {
    let counters = Counters::default();
    let err = Font::new(
        Box::new(TestResource {
            units_per_em: 0,
            counters: counters.clone(),
        }),
        Box::new(LigatureShaper {
            counters: counters.clone(),
        }),
        Box::new(WeightOutlines {
            weight: 400.0,
            counters,
        }),
    )
    .unwrap_err();
    assert!(matches!(err, GlyphRunError::FontLoad(FontLoadError::ZeroUnitsPerEm)));
}

#[test]
fn introspection_is_computed_once() {
    let (mut font, counters) = test_font();

    assert_eq!(font.axes().len(), 1);
    assert_eq!(font.axes().len(), 1);
    font.set_var_location(Some(&VarLocation::new().with(WGHT, 500.0)));
    assert_eq!(counters.axes.load(Ordering::SeqCst), 1);

    assert!(font.features_gsub().contains(&LIGA));
    assert!(font.features_gsub().contains(&LIGA));
    assert!(font.features_gpos().contains(&Tag::new(b"kern")));
    assert_eq!(counters.features.load(Ordering::SeqCst), 2);

    let scripts = font.scripts();
    let names: HashSet<String> = scripts.keys().map(|t| t.to_string()).collect();
    assert_eq!(names, HashSet::from(["latn".to_string(), "grek".to_string()]));
    assert_eq!(scripts[&Tag::new(b"latn")].len(), 1);

    assert_eq!(font.color_palettes().len(), 1);
}

#[test]
fn empty_text_builds_empty_run() {
    let (mut font, _) = test_font();
    let run = font.build_run("", &RunOptions::default()).unwrap();
    assert!(run.is_empty());
    assert_eq!(run.num_chars(), 0);
    assert_eq!(run.end_pos(), (0.0, 0.0));
}
