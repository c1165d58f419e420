//! Glyph runs: several shaped sub-runs stitched into one positioned sequence
//!
//! A caller splits its text into sub-runs that share script, language and
//! direction. Each sub-run is shaped on its own, so the clusters the shaping
//! engine reports are relative to that slice. The builder moves them back
//! into whole-text coordinates, appends the glyphs, and once everything is
//! in place walks the sequence a single time to lay down pen positions.
//!
//! The finished [`GlyphRun`] never changes again. Its glyph/character index
//! is built on first use and then shared by every reader.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use crate::cluster::ClusterMapping;
use crate::error::{GlyphRunError, Result, ShapingError};
use crate::types::{GlyphId, Outline};
use crate::ShapingParams;

/// One glyph of a run, with its outline resolved
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRecord {
    pub glyph: GlyphId,
    /// Character index this glyph starts at
    pub cluster: usize,
    pub ax: f32,
    pub ay: f32,
    pub dx: f32,
    pub dy: f32,
    pub outline: Arc<Outline>,
    /// Pen position before this glyph's advance; set when the run is finished
    pub pos: Option<(f32, f32)>,
}

impl GlyphRecord {
    /// Where the outline origin lands: pen position plus glyph offset
    pub fn draw_pos(&self) -> Option<(f32, f32)> {
        self.pos.map(|(x, y)| (x + self.dx, y + self.dy))
    }
}

/// How [`crate::Font::build_run`] should split and shape the text
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Sub-run lengths in characters; must add up to the text length.
    /// Empty means the whole text is one run.
    pub run_lengths: Vec<usize>,
    /// Direction, script, language, features and location shared by every sub-run
    pub params: ShapingParams,
}

/// Split `text` into `(start, length, slice)` triples, in characters
///
/// A length sum that differs from the character count is a caller bug and
/// is reported as [`GlyphRunError::RunLengthMismatch`]; lengths too large
/// to add up at all as [`GlyphRunError::InvalidRunBoundary`].
pub fn sub_runs<'a>(text: &'a str, run_lengths: &[usize]) -> Result<Vec<(usize, usize, &'a str)>> {
    // Byte offset of every character boundary, including the end
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let num_chars = boundaries.len() - 1;

    if run_lengths.is_empty() {
        return Ok(vec![(0, num_chars, text)]);
    }

    let total = run_lengths
        .iter()
        .try_fold(0usize, |sum, &length| {
            sum.checked_add(length).ok_or(GlyphRunError::InvalidRunBoundary {
                start: sum,
                length,
                num_chars,
            })
        })
        .map_err(|err| {
            log::error!("Run lengths {run_lengths:?} overflow");
            err
        })?;
    if total != num_chars {
        log::error!("Run lengths {run_lengths:?} sum to {total}, text has {num_chars} characters");
        return Err(GlyphRunError::RunLengthMismatch {
            expected: num_chars,
            actual: total,
        });
    }

    let mut start = 0;
    let mut runs = Vec::with_capacity(run_lengths.len());
    for &length in run_lengths {
        let end = start + length;
        runs.push((start, length, &text[boundaries[start]..boundaries[end]]));
        start = end;
    }
    Ok(runs)
}

/// Accumulates shaped sub-runs, then fixes positions once
#[derive(Debug)]
pub struct GlyphRunBuilder {
    glyphs: Vec<GlyphRecord>,
    num_chars: usize,
    units_per_em: u16,
    vertical: bool,
    next_start: usize,
}

impl GlyphRunBuilder {
    pub fn new(num_chars: usize, units_per_em: u16, vertical: bool) -> Self {
        Self {
            glyphs: Vec::new(),
            num_chars,
            units_per_em,
            vertical,
            next_start: 0,
        }
    }

    /// Append one shaped sub-run starting at character `start`
    ///
    /// `records` carry clusters relative to the sub-run; they are shifted
    /// by `start` here. Sub-runs must arrive in order and without gaps.
    pub fn push_sub_run(
        &mut self,
        start: usize,
        length: usize,
        records: Vec<GlyphRecord>,
    ) -> Result<()> {
        let in_bounds = start
            .checked_add(length)
            .is_some_and(|end| end <= self.num_chars);
        if start != self.next_start || !in_bounds {
            log::error!(
                "Sub-run {start}+{length} does not continue at {} within {} characters",
                self.next_start,
                self.num_chars
            );
            return Err(GlyphRunError::InvalidRunBoundary {
                start,
                length,
                num_chars: self.num_chars,
            });
        }

        if let Some(bad) = records.iter().find(|record| record.cluster >= length) {
            return Err(ShapingError::BackendError(format!(
                "cluster {} outside a sub-run of {length} characters",
                bad.cluster
            ))
            .into());
        }

        self.glyphs.extend(records.into_iter().map(|mut record| {
            record.cluster += start;
            record
        }));
        self.next_start = start + length;
        Ok(())
    }

    /// Lay down pen positions and freeze the run
    pub fn finish(mut self) -> Result<GlyphRun> {
        if self.next_start != self.num_chars {
            return Err(GlyphRunError::RunLengthMismatch {
                expected: self.num_chars,
                actual: self.next_start,
            });
        }

        let (mut x, mut y) = (0.0f32, 0.0f32);
        for record in &mut self.glyphs {
            record.pos = Some((x, y));
            x += record.ax;
            y += record.ay;
        }

        Ok(GlyphRun {
            glyphs: self.glyphs,
            num_chars: self.num_chars,
            units_per_em: self.units_per_em,
            vertical: self.vertical,
            end_pos: (x, y),
            mapping: OnceLock::new(),
        })
    }
}

/// A finished, positioned sequence of glyphs for one piece of text
#[derive(Debug)]
pub struct GlyphRun {
    glyphs: Vec<GlyphRecord>,
    num_chars: usize,
    units_per_em: u16,
    vertical: bool,
    end_pos: (f32, f32),
    mapping: OnceLock<ClusterMapping>,
}

impl GlyphRun {
    pub fn glyphs(&self) -> &[GlyphRecord] {
        &self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Length of the original text, in characters
    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// Pen position after the last glyph
    pub fn end_pos(&self) -> (f32, f32) {
        self.end_pos
    }

    fn mapping(&self) -> &ClusterMapping {
        self.mapping.get_or_init(|| {
            let clusters: Vec<usize> = self.glyphs.iter().map(|g| g.cluster).collect();
            ClusterMapping::new(&clusters, self.num_chars)
        })
    }

    /// All characters the given glyphs were shaped from
    pub fn map_glyphs_to_chars(&self, glyph_indices: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mapping = self.mapping();
        glyph_indices
            .into_iter()
            .flat_map(|gi| mapping.chars_for_glyph(gi).iter().copied())
            .collect()
    }

    /// All glyphs drawn for the given characters
    pub fn map_chars_to_glyphs(&self, char_indices: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mapping = self.mapping();
        char_indices
            .into_iter()
            .flat_map(|ci| mapping.glyphs_for_char(ci).iter().copied())
            .collect()
    }
}
