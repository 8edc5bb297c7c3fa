//! A synthetic fallback for isol/init/medi/fina when a font doesn't carry
//! its own GSUB Arabic-form features: Unicode's Arabic Presentation
//! Forms-B block (U+FE70..U+FEFC) already encodes these forms, so many
//! legacy fonts expose them directly through `cmap` instead of GSUB. This
//! builds a lookup from (base codepoint, action) to a presentation-form
//! codepoint and resolves it through `cmap` rather than synthesizing
//! binary GSUB subtable bytes.
//!
//! Built once per shaper instance and shared across runs; see
//! [`SyntheticGsub::new`].

use std::collections::HashMap;

use ot_tables::Font;

use crate::shapers::arabic::joining::Action;

/// (isolated, initial, medial, final) presentation forms, where 0 means
/// "no distinct form exists for this position".
type Forms = (u32, u32, u32, u32);

#[rustfmt::skip]
const BASE_FORMS: &[(u32, Forms)] = &[
    (0x0621, (0xFE80, 0, 0, 0)),             // hamza (isolated only)
    (0x0622, (0xFE81, 0, 0, 0xFE82)),        // alef with madda above
    (0x0623, (0xFE83, 0, 0, 0xFE84)),        // alef with hamza above
    (0x0624, (0xFE85, 0, 0, 0xFE86)),        // waw with hamza above
    (0x0625, (0xFE87, 0, 0, 0xFE88)),        // alef with hamza below
    (0x0626, (0xFE89, 0xFE8B, 0xFE8C, 0xFE8A)), // yeh with hamza above
    (0x0627, (0xFE8D, 0, 0, 0xFE8E)),        // alef
    (0x0628, (0xFE8F, 0xFE91, 0xFE92, 0xFE90)), // beh
    (0x0629, (0xFE93, 0, 0, 0xFE94)),        // teh marbuta
    (0x062A, (0xFE95, 0xFE97, 0xFE98, 0xFE96)), // teh
    (0x062B, (0xFE99, 0xFE9B, 0xFE9C, 0xFE9A)), // theh
    (0x062C, (0xFE9D, 0xFE9F, 0xFEA0, 0xFE9E)), // jeem
    (0x062D, (0xFEA1, 0xFEA3, 0xFEA4, 0xFEA2)), // hah
    (0x062E, (0xFEA5, 0xFEA7, 0xFEA8, 0xFEA6)), // khah
    (0x062F, (0xFEA9, 0, 0, 0xFEAA)),        // dal
    (0x0630, (0xFEAB, 0, 0, 0xFEAC)),        // thal
    (0x0631, (0xFEAD, 0, 0, 0xFEAE)),        // reh
    (0x0632, (0xFEAF, 0, 0, 0xFEB0)),        // zain
    (0x0633, (0xFEB1, 0xFEB3, 0xFEB4, 0xFEB2)), // seen
    (0x0634, (0xFEB5, 0xFEB7, 0xFEB8, 0xFEB6)), // sheen
    (0x0635, (0xFEB9, 0xFEBB, 0xFEBC, 0xFEBA)), // sad
    (0x0636, (0xFEBD, 0xFEBF, 0xFEC0, 0xFEBE)), // dad
    (0x0637, (0xFEC1, 0xFEC3, 0xFEC4, 0xFEC2)), // tah
    (0x0638, (0xFEC5, 0xFEC7, 0xFEC8, 0xFEC6)), // zah
    (0x0639, (0xFEC9, 0xFECB, 0xFECC, 0xFECA)), // ain
    (0x063A, (0xFECD, 0xFECF, 0xFED0, 0xFECE)), // ghain
    (0x0641, (0xFED1, 0xFED3, 0xFED4, 0xFED2)), // feh
    (0x0642, (0xFED5, 0xFED7, 0xFED8, 0xFED6)), // qaf
    (0x0643, (0xFED9, 0xFEDB, 0xFEDC, 0xFEDA)), // kaf
    (0x0644, (0xFEDD, 0xFEDF, 0xFEE0, 0xFEDE)), // lam
    (0x0645, (0xFEE1, 0xFEE3, 0xFEE4, 0xFEE2)), // meem
    (0x0646, (0xFEE5, 0xFEE7, 0xFEE8, 0xFEE6)), // noon
    (0x0647, (0xFEE9, 0xFEEB, 0xFEEC, 0xFEEA)), // heh
    (0x0648, (0xFEED, 0, 0, 0xFEEE)),        // waw
    (0x0649, (0xFEEF, 0, 0, 0xFEF0)),        // alef maksura
    (0x064A, (0xFEF1, 0xFEF3, 0xFEF4, 0xFEF2)), // yeh
];

/// Lam-alef ligatures: `isol`/`fina` lam followed by one of the four alef
/// variants collapses to a single presentation-form glyph. Keyed by the
/// alef codepoint; values are (isolated-form, final-form) ligature points.
const LAM_ALEF_LIGATURES: &[(u32, (u32, u32))] = &[
    (0x0622, (0xFEF5, 0xFEF6)),
    (0x0623, (0xFEF7, 0xFEF8)),
    (0x0625, (0xFEF9, 0xFEFA)),
    (0x0627, (0xFEFB, 0xFEFC)),
];

pub struct SyntheticGsub {
    forms: HashMap<u32, Forms>,
    lam_alef: HashMap<u32, (u32, u32)>,
}

impl SyntheticGsub {
    pub fn new() -> Self {
        SyntheticGsub {
            forms: BASE_FORMS.iter().copied().collect(),
            lam_alef: LAM_ALEF_LIGATURES.iter().copied().collect(),
        }
    }

    /// Looks up the presentation-form codepoint for `base` in `action`,
    /// returning `None` when that position has no distinct form (so the
    /// caller should leave the base codepoint's own glyph alone).
    pub fn form_for(&self, base: u32, action: Action) -> Option<u32> {
        let forms = *self.forms.get(&base)?;
        let cp = match action {
            Action::Isol | Action::None => forms.0,
            Action::Init => forms.1,
            Action::Medi => forms.2,
            Action::Fina | Action::Fin2 | Action::Fin3 | Action::Med2 => forms.3,
            Action::StretchingFixed | Action::StretchingRepeating => forms.0,
        };
        if cp == 0 {
            None
        } else {
            Some(cp)
        }
    }

    /// If `lam` (0x0644) is immediately followed by one of the four alef
    /// variants and the lam is in isol/fina position, returns the merged
    /// ligature codepoint to use in place of both glyphs.
    pub fn lam_alef_ligature(&self, lam: u32, alef: u32, lam_action: Action) -> Option<u32> {
        if lam != 0x0644 {
            return None;
        }
        let (isol, fina) = *self.lam_alef.get(&alef)?;
        Some(match lam_action {
            Action::Isol | Action::None => isol,
            _ => fina,
        })
    }

    /// Resolves a presentation-form codepoint to a glyph id via the font's
    /// `cmap`, falling back to `None` when the font has no glyph for it
    /// (meaning the fallback genuinely doesn't apply for this font).
    pub fn glyph_for(&self, font: &mut Font, codepoint: u32) -> Option<font_types::GlyphId> {
        font.cmap()?.best_subtable()?.lookup(codepoint)
    }
}

impl Default for SyntheticGsub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beh_forms_cover_all_four_positions() {
        let synth = SyntheticGsub::new();
        assert_eq!(synth.form_for(0x0628, Action::Isol), Some(0xFE8F));
        assert_eq!(synth.form_for(0x0628, Action::Init), Some(0xFE91));
        assert_eq!(synth.form_for(0x0628, Action::Medi), Some(0xFE92));
        assert_eq!(synth.form_for(0x0628, Action::Fina), Some(0xFE90));
    }

    #[test]
    fn alef_has_no_medial_form() {
        let synth = SyntheticGsub::new();
        assert_eq!(synth.form_for(0x0627, Action::Medi), None);
    }

    #[test]
    fn lam_alef_ligates() {
        let synth = SyntheticGsub::new();
        assert_eq!(synth.lam_alef_ligature(0x0644, 0x0627, Action::Isol), Some(0xFEFB));
        assert_eq!(synth.lam_alef_ligature(0x0644, 0x0627, Action::Fina), Some(0xFEFC));
    }
}
