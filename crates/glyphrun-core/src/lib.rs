//! glyphrun core: from text runs to positioned, outlined glyphs
//!
//! This crate sits between a shaping engine and an outline engine. It owns
//! the per-font state that has to stay consistent while text is shaped over
//! and over in an interactive application:
//!
//! 1. **Outline cache** - outlines per glyph and per layer mode
//! 2. **Location tracker** - the active variable-font location, purging the
//!    cache whenever it moves
//! 3. **Font handle** - the three collaborators behind one `shape()` call
//! 4. **Glyph runs** - sub-runs stitched into one positioned sequence with a
//!    two-way glyph/character index
//!
//! ## Shaping a run
//!
//! ```rust,no_run
//! use glyphrun_core::{Font, RunOptions};
//! # use glyphrun_core::traits::*;
//! # fn collaborators() -> (Box<dyn FontResource>, Box<dyn ShapingEngine>, Box<dyn OutlineProvider>) {
//! #     unimplemented!()
//! # }
//!
//! let (resource, shaper, outlines) = collaborators();
//! let mut font = Font::new(resource, shaper, outlines)?;
//!
//! let run = font.build_run("office", &RunOptions::default())?;
//! let chars = run.map_glyphs_to_chars([0]);
//! # Ok::<(), glyphrun_core::GlyphRunError>(())
//! ```
//!
//! ## The traits behind a font
//!
//! - [`traits::FontResource`] - already-parsed font metadata
//! - [`traits::ShapingEngine`] - characters to glyph ids, clusters, advances
//! - [`traits::OutlineProvider`] - glyph ids to outlines at a location

pub mod cluster;
pub mod config;
pub mod error;
pub mod font;
pub mod location;
pub mod outline_cache;
pub mod run;
pub mod traits;

pub use config::OutlineCacheConfig;
pub use error::{GlyphRunError, Result};
pub use font::{merge_scripts_and_languages, Font};
pub use location::VarLocationTracker;
pub use outline_cache::{CacheStats, OutlineCache};
pub use run::{GlyphRun, RunOptions};

/// The data structures shared by every crate in the workspace
pub mod types {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fmt;
    use std::str::FromStr;

    use kurbo::BezPath;

    use crate::error::GlyphRunError;

    /// Unique identifier for a glyph within a font
    pub type GlyphId = u32;

    /// Palette index that means "use the foreground color"
    pub const FOREGROUND_PALETTE_INDEX: u16 = 0xFFFF;

    /// A four-byte OpenType tag such as `wght`, `liga` or `latn`
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Tag([u8; 4]);

    impl Tag {
        pub const fn new(bytes: &[u8; 4]) -> Self {
            Self(*bytes)
        }

        pub const fn to_bytes(self) -> [u8; 4] {
            self.0
        }
    }

    impl FromStr for Tag {
        type Err = GlyphRunError;

        /// Tags shorter than four characters are padded with spaces.
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let bytes = s.as_bytes();
            if bytes.is_empty()
                || bytes.len() > 4
                || !bytes.iter().all(|b| (0x20..=0x7E).contains(b))
            {
                return Err(GlyphRunError::InvalidTag(s.to_string()));
            }
            let mut tag = [b' '; 4];
            tag[..bytes.len()].copy_from_slice(bytes);
            Ok(Self(tag))
        }
    }

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for &b in &self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Tag({self})")
        }
    }

    /// Which way the text flows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Direction {
        LeftToRight,
        RightToLeft,
        TopToBottom,
        BottomToTop,
    }

    impl Direction {
        pub fn is_vertical(self) -> bool {
            matches!(self, Direction::TopToBottom | Direction::BottomToTop)
        }
    }

    impl FromStr for Direction {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "ltr" => Ok(Direction::LeftToRight),
                "rtl" => Ok(Direction::RightToLeft),
                "ttb" => Ok(Direction::TopToBottom),
                "btt" => Ok(Direction::BottomToTop),
                other => Err(format!("unknown direction: {other}")),
            }
        }
    }

    /// One design axis of a variable font
    #[derive(Debug, Clone, PartialEq)]
    pub struct Axis {
        pub tag: Tag,
        pub name: String,
        pub min_value: f32,
        pub default_value: f32,
        pub max_value: f32,
    }

    /// The axes of a font, in the order the font defines them
    ///
    /// Empty for static fonts.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Axes(Vec<Axis>);

    impl Axes {
        pub fn new(axes: Vec<Axis>) -> Self {
            Self(axes)
        }

        pub fn get(&self, tag: Tag) -> Option<&Axis> {
            self.0.iter().find(|axis| axis.tag == tag)
        }

        pub fn contains(&self, tag: Tag) -> bool {
            self.get(tag).is_some()
        }

        pub fn iter(&self) -> impl Iterator<Item = &Axis> {
            self.0.iter()
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    /// A point in design space: axis tag to user-space value
    ///
    /// An empty location means every axis sits at its default.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct VarLocation(BTreeMap<Tag, f32>);

    impl VarLocation {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&mut self, tag: Tag, value: f32) {
            self.0.insert(tag, value);
        }

        pub fn with(mut self, tag: Tag, value: f32) -> Self {
            self.set(tag, value);
            self
        }

        pub fn get(&self, tag: Tag) -> Option<f32> {
            self.0.get(&tag).copied()
        }

        pub fn iter(&self) -> impl Iterator<Item = (Tag, f32)> + '_ {
            self.0.iter().map(|(tag, value)| (*tag, *value))
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Keep only the axes the font defines
        pub fn filtered(&self, axes: &Axes) -> VarLocation {
            VarLocation(
                self.0
                    .iter()
                    .filter(|(tag, _)| axes.contains(**tag))
                    .map(|(tag, value)| (*tag, *value))
                    .collect(),
            )
        }
    }

    impl FromIterator<(Tag, f32)> for VarLocation {
        fn from_iter<I: IntoIterator<Item = (Tag, f32)>>(iter: I) -> Self {
            Self(iter.into_iter().collect())
        }
    }

    /// Whether an outline is requested as one path or as color layers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum LayerMode {
        #[default]
        Monochrome,
        ColorLayers,
    }

    impl From<bool> for LayerMode {
        fn from(color_layers: bool) -> Self {
            if color_layers {
                LayerMode::ColorLayers
            } else {
                LayerMode::Monochrome
            }
        }
    }

    /// One layer of a color glyph, painted with a palette entry
    #[derive(Debug, Clone, PartialEq)]
    pub struct ColorLayer {
        pub path: BezPath,
        pub palette_index: u16,
    }

    /// Outline data for one glyph, in font units with y pointing up
    #[derive(Debug, Clone, PartialEq)]
    pub enum Outline {
        Path(BezPath),
        Layers(Vec<ColorLayer>),
    }

    impl Outline {
        pub fn is_layered(&self) -> bool {
            matches!(self, Outline::Layers(_))
        }

        /// Every path in painting order
        pub fn paths(&self) -> Vec<&BezPath> {
            match self {
                Outline::Path(path) => vec![path],
                Outline::Layers(layers) => layers.iter().map(|layer| &layer.path).collect(),
            }
        }
    }

    /// What the shaping engine hands back for one glyph
    ///
    /// `cluster` is relative to the text passed to the engine.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ShapedGlyph {
        pub glyph: GlyphId,
        pub cluster: usize,
        pub ax: f32,
        pub ay: f32,
        pub dx: f32,
        pub dy: f32,
    }

    /// Which layout table an inventory question is about
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LayoutTable {
        Gsub,
        Gpos,
    }

    /// Script tag to the language tags declared under it
    pub type ScriptLanguages = BTreeMap<Tag, BTreeSet<Tag>>;

    /// An sRGB color with alpha
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rgba {
        pub r: u8,
        pub g: u8,
        pub b: u8,
        pub a: u8,
    }

    impl Rgba {
        pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
            Self { r, g, b, a }
        }

        pub const fn black() -> Self {
            Self::new(0, 0, 0, 255)
        }
    }

    pub type Palette = Vec<Rgba>;
}

/// How a single `shape()` call should behave
#[derive(Debug, Clone, Default)]
pub struct ShapingParams {
    /// OpenType features with their values, e.g. `(liga, 0)` to disable ligatures
    pub features: Vec<(types::Tag, u32)>,
    /// Requested location; `None` means the default location
    pub variations: Option<types::VarLocation>,
    /// `None` lets the shaping engine guess
    pub direction: Option<types::Direction>,
    pub language: Option<String>,
    pub script: Option<String>,
    pub layer_mode: types::LayerMode,
}

/// Everything the shaping engine needs besides the text itself
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequest<'a> {
    pub features: &'a [(types::Tag, u32)],
    pub location: &'a types::VarLocation,
    pub direction: Option<types::Direction>,
    pub language: Option<&'a str>,
    pub script: Option<&'a str>,
}
