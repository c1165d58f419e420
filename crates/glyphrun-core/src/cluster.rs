//! Two-way index between glyphs and the characters they came from
//!
//! Each distinct cluster value owns the characters from itself up to the
//! next larger cluster value, or to the end of the text for the largest
//! one. A ligature therefore owns every character it swallowed, and every
//! glyph produced from a decomposed character shares that character.
//! Characters before the smallest cluster belong to no glyph.

/// Glyph-to-characters and character-to-glyphs tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMapping {
    glyph_to_chars: Vec<Vec<usize>>,
    char_to_glyphs: Vec<Vec<usize>>,
}

impl ClusterMapping {
    /// Build both tables from final cluster values
    ///
    /// Cluster values at or beyond `num_chars` own nothing.
    pub fn new(clusters: &[usize], num_chars: usize) -> Self {
        let mut starts: Vec<usize> = clusters.to_vec();
        starts.sort_unstable();
        starts.dedup();

        let span_of = |cluster: usize| -> std::ops::Range<usize> {
            // `cluster` is always present in `starts`
            let idx = starts.partition_point(|&start| start < cluster);
            let end = starts.get(idx + 1).copied().unwrap_or(num_chars);
            cluster.min(num_chars)..end.min(num_chars)
        };

        let mut glyph_to_chars = Vec::with_capacity(clusters.len());
        let mut char_to_glyphs = vec![Vec::new(); num_chars];

        for (glyph_index, &cluster) in clusters.iter().enumerate() {
            let chars: Vec<usize> = span_of(cluster).collect();
            for &ci in &chars {
                char_to_glyphs[ci].push(glyph_index);
            }
            glyph_to_chars.push(chars);
        }

        Self {
            glyph_to_chars,
            char_to_glyphs,
        }
    }

    /// Characters of one glyph; empty for an unknown glyph index
    pub fn chars_for_glyph(&self, glyph_index: usize) -> &[usize] {
        self.glyph_to_chars
            .get(glyph_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Glyphs of one character; empty when nothing was drawn for it
    pub fn glyphs_for_char(&self, char_index: usize) -> &[usize] {
        self.char_to_glyphs
            .get(char_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
