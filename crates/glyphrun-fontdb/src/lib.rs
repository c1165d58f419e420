//! Where font files become font resources
//!
//! Reads font bytes from disk or memory, checks that they parse, and exposes
//! the metadata a [`glyphrun_core::Font`] asks for: units per em, variation
//! axes with their English names, and CPAL color palettes.
//!
//! ## Memory Management
//!
//! The bytes live in one `Arc<[u8]>` that the shaping and outline backends
//! share. Parsed views (`FontRef`) are created on demand, which keeps TTC
//! collections working: the face index picks the face every time.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use read_fonts::{FontRef as ReadFontRef, ReadError, TableProvider};
use skrifa::color::ColorPalettes;
use skrifa::MetadataProvider;

use glyphrun_core::{
    error::{FontLoadError, GlyphRunError, Result},
    traits::FontResource,
    types::{Axes, Axis, Palette, Rgba, Tag},
};

/// Largest font file we agree to read (50MB)
pub const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024;

/// A font's bytes, validated and ready to be shared
#[derive(Clone)]
pub struct FontFile {
    data: Arc<[u8]>,
    face_index: u32,
    units_per_em: u16,
}

impl FontFile {
    /// Opens a font file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_index(path, 0)
    }

    /// Opens one face of a font file (TTC/OTC collections)
    pub fn from_file_index(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|err| Self::open_error(path, err))?;
        if meta.len() > MAX_FONT_SIZE {
            return Err(FontLoadError::TooLarge {
                size: meta.len(),
                max: MAX_FONT_SIZE,
            }
            .into());
        }

        let data = fs::read(path).map_err(|err| Self::open_error(path, err))?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Self::from_data_index(data, face_index)
    }

    /// A missing file is a load failure; anything else the OS reports stays an IO error
    fn open_error(path: &Path, err: io::Error) -> GlyphRunError {
        if err.kind() == io::ErrorKind::NotFound {
            FontLoadError::FileNotFound(path.display().to_string()).into()
        } else {
            log::debug!("Cannot read {}: {err}", path.display());
            err.into()
        }
    }

    /// Turns raw font bytes into a font file
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_index(data, 0)
    }

    /// Turns raw font bytes into one face of a font file
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let font = ReadFontRef::from_index(&data, face_index).map_err(|err| match err {
            ReadError::InvalidCollectionIndex(index) => FontLoadError::FaceIndexOutOfRange { index },
            other => {
                log::debug!("Font data rejected: {other}");
                FontLoadError::InvalidData
            },
        })?;

        // No head table means no metrics; nothing downstream can work
        let units_per_em = font
            .head()
            .map_err(|_| FontLoadError::InvalidData)?
            .units_per_em();
        if units_per_em == 0 {
            return Err(FontLoadError::ZeroUnitsPerEm.into());
        }

        Ok(Self {
            data: data.into(),
            face_index,
            units_per_em,
        })
    }

    /// The shared font bytes
    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }

    /// Returns the face index for collections (0 for single fonts)
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    /// Creates a parsed view on demand
    fn font_ref(&self) -> Option<skrifa::FontRef<'_>> {
        skrifa::FontRef::from_index(&self.data, self.face_index).ok()
    }

    /// Reads the variation axes from `fvar`, named via the `name` table
    pub fn read_axes(&self) -> Axes {
        let Some(font) = self.font_ref() else {
            return Axes::default();
        };

        let axes = font
            .axes()
            .iter()
            .map(|axis| {
                let tag = Tag::new(&axis.tag().to_be_bytes());
                let name = font
                    .localized_strings(axis.name_id())
                    .english_or_first()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| tag.to_string());
                Axis {
                    tag,
                    name,
                    min_value: axis.min_value(),
                    default_value: axis.default_value(),
                    max_value: axis.max_value(),
                }
            })
            .collect();
        Axes::new(axes)
    }

    /// Reads every CPAL palette; empty when the font has none
    pub fn read_palettes(&self) -> Vec<Palette> {
        let Some(font) = self.font_ref() else {
            return Vec::new();
        };

        let palettes = ColorPalettes::new(&font);
        let mut result = Vec::new();
        for index in 0..=u16::MAX {
            let Some(palette) = palettes.get(index) else {
                break;
            };
            result.push(
                palette
                    .colors()
                    .iter()
                    .map(|c| Rgba::new(c.red, c.green, c.blue, c.alpha))
                    .collect(),
            );
        }
        result
    }
}

impl FontResource for FontFile {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn axes(&self) -> Axes {
        self.read_axes()
    }

    fn color_palettes(&self) -> Vec<Palette> {
        let palettes = self.read_palettes();
        if palettes.is_empty() {
            vec![vec![Rgba::black()]]
        } else {
            palettes
        }
    }
}

impl std::fmt::Debug for FontFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFile")
            .field("len", &self.data.len())
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}
