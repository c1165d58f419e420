//! End-to-end runs over fonts in `testdata/fonts`; each test skips when its font is absent.

use std::path::PathBuf;

use glyphrun::prelude::*;

fn open(name: &str) -> Option<Font> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/fonts")
        .join(name);
    if !path.exists() {
        eprintln!("Skipping test: font not found at {}", path.display());
        return None;
    }
    Some(OtfFont::from_path(&path, 0).expect("open test font"))
}

#[test]
fn run_covers_every_character() {
    let Some(mut font) = open("DejaVuSans.ttf") else {
        return;
    };
    let text = "Hello, world";
    let run = font.build_run(text, &RunOptions::default()).unwrap();

    assert_eq!(run.num_chars(), text.chars().count());
    let all_glyphs: Vec<usize> = (0..run.len()).collect();
    let covered = run.map_glyphs_to_chars(all_glyphs);
    assert_eq!(covered.len(), run.num_chars());
    assert!(run.end_pos().0 > 0.0);
}

#[test]
fn sub_runs_offset_clusters() {
    let Some(mut font) = open("DejaVuSans.ttf") else {
        return;
    };
    let options = RunOptions {
        run_lengths: vec![3, 3],
        ..RunOptions::default()
    };
    let run = font.build_run("abcdef", &options).unwrap();
    let clusters: Vec<usize> = run.glyphs().iter().map(|g| g.cluster).collect();
    assert_eq!(clusters, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn second_shape_hits_the_cache() {
    let Some(mut font) = open("DejaVuSans.ttf") else {
        return;
    };
    let params = ShapingParams::default();
    font.shape("aaaa", &params).unwrap();
    let stats = font.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);
}

#[test]
fn variable_font_reports_axes_and_moves() {
    let Some(mut font) = open("RobotoFlex-Variable.ttf") else {
        return;
    };
    assert!(font.axes().contains(Tag::new(b"wght")));

    let params = ShapingParams {
        variations: Some(VarLocation::new().with(Tag::new(b"wght"), 700.0)),
        ..ShapingParams::default()
    };
    font.shape("a", &params).unwrap();
    assert_eq!(font.var_location().get(Tag::new(b"wght")), Some(700.0));
    assert_eq!(font.cache_stats().purges, 1);
}

#[test]
fn static_font_reports_layout_inventories() {
    let Some(font) = open("DejaVuSans.ttf") else {
        return;
    };
    assert!(font.scripts().contains_key(&Tag::new(b"latn")));
    assert!(!font.features_gsub().is_empty());
    assert!(!font.color_palettes().is_empty());
}
