//! Unicode normalization, run before GSUB: decomposes input to the form
//! the font's lookups are likeliest to match, with shaper-provided
//! decompose/compose overrides taking priority over the canonical
//! Unicode mapping.

use unicode_normalization::char::{compose, decompose_canonical};

use crate::buffer::Buffer;
use crate::shapers::ShapingEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizationMode {
    /// Decompose to NFD, then recompose anything the shaper/font pair
    /// can't use decomposed (the common case: most fonts want precomposed
    /// glyphs but shaping needs canonical order for diacritic stacking).
    Default,
    /// Leave the input exactly as given.
    None,
    /// Fully compose to NFC and stop; used by shapers whose scripts never
    /// benefit from decomposition (plain Core Latin/Cyrillic text).
    Composed,
}

/// Decomposes every glyph via the shaper's `decompose` hook (falling back
/// to canonical Unicode decomposition), inserting the produced base+mark
/// pair in place and propagating the original cluster to both.
pub fn decompose(buffer: &mut Buffer, shaper: &dyn ShapingEngine, mode: NormalizationMode) {
    if mode != NormalizationMode::Default {
        return;
    }
    let mut i = 0;
    while i < buffer.len() {
        let cp = buffer.info[i].codepoint;
        let Some(ch) = char::from_u32(cp) else {
            i += 1;
            continue;
        };
        if let Some((a, b)) = shaper.decompose(ch) {
            apply_decomposition(buffer, i, a, b);
            i += 1; // re-visit from the newly inserted second half next
            continue;
        }
        let mut produced = Vec::new();
        decompose_canonical(ch, |c| produced.push(c));
        if produced.len() == 2 {
            apply_decomposition(buffer, i, produced[0], produced[1]);
        }
        i += 1;
    }
}

fn apply_decomposition(buffer: &mut Buffer, at: usize, a: char, b: char) {
    let cluster = buffer.info[at].cluster;
    buffer.info[at] = crate::buffer::GlyphInfo::from_codepoint(a as u32, cluster);
    buffer.replicate(at, 1);
    buffer.info[at + 1] = crate::buffer::GlyphInfo::from_codepoint(b as u32, cluster);
    buffer.pos[at + 1] = Default::default();
}

/// Recomposes adjacent base+mark pairs the shaper/font pair can render
/// precomposed, via the shaper's `compose` hook first and canonical
/// Unicode composition as the fallback.
pub fn recompose(buffer: &mut Buffer, shaper: &dyn ShapingEngine, mode: NormalizationMode) {
    if mode != NormalizationMode::Composed && mode != NormalizationMode::Default {
        return;
    }
    let mut i = 0;
    while i + 1 < buffer.len() {
        let a = char::from_u32(buffer.info[i].codepoint);
        let b = char::from_u32(buffer.info[i + 1].codepoint);
        let (Some(a), Some(b)) = (a, b) else {
            i += 1;
            continue;
        };
        let composed = shaper.compose(a, b).or_else(|| compose(a, b));
        if let Some(c) = composed {
            let cluster = buffer.info[i].cluster;
            buffer.info[i] = crate::buffer::GlyphInfo::from_codepoint(c as u32, cluster);
            buffer.info.remove(i + 1);
            buffer.pos.remove(i + 1);
            continue;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Direction;
    use crate::shapers::core::CoreShaper;

    #[test]
    fn decomposes_precomposed_e_acute() {
        let mut buffer = Buffer::from_codepoints(&[0x00E9], Direction::LeftToRight); // e with acute
        decompose(&mut buffer, &CoreShaper::new(), NormalizationMode::Default);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.info[0].codepoint, 'e' as u32);
        assert_eq!(buffer.info[1].codepoint, 0x0301);
    }

    #[test]
    fn recomposes_back_to_precomposed() {
        let mut buffer = Buffer::from_codepoints(&['e' as u32, 0x0301], Direction::LeftToRight);
        recompose(&mut buffer, &CoreShaper::new(), NormalizationMode::Default);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.info[0].codepoint, 0x00E9);
    }

    #[test]
    fn none_mode_leaves_buffer_untouched() {
        let mut buffer = Buffer::from_codepoints(&[0x00E9], Direction::LeftToRight);
        decompose(&mut buffer, &CoreShaper::new(), NormalizationMode::None);
        assert_eq!(buffer.len(), 1);
    }
}
