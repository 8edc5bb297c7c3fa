//! The Arabic complex shaper: joining-aware form selection, the `stch`
//! stretch feature, and a synthetic GSUB fallback for fonts that omit the
//! isol/init/medi/fina features. Also covers Syriac (same joining
//! mechanics, different default feature tags) when explicitly chosen.

pub mod joining;
pub mod stretch;
pub mod synthetic_gsub;

use font_types::Tag;

use crate::buffer::Buffer;
use crate::plan::{FeatureFlags, FeaturePlan, StageKind};
use crate::shapers::{SelectionContext, ShapingEngine};
use joining::Action;
use synthetic_gsub::SyntheticGsub;

/// The seven per-position Arabic form features, in application order. A
/// font missing all of them is what triggers the synthetic fallback.
const ARABIC_FEATURES: &[Tag] = &[
    Tag::new(b"isol"),
    Tag::new(b"fina"),
    Tag::new(b"fin2"),
    Tag::new(b"fin3"),
    Tag::new(b"medi"),
    Tag::new(b"med2"),
    Tag::new(b"init"),
];

fn feature_is_syriac(tag: Tag) -> bool {
    let bytes = tag.to_be_bytes();
    bytes[3] == b'2' || bytes[3] == b'3'
}

pub struct ArabicShaper {
    synthetic: SyntheticGsub,
    syriac: bool,
}

impl ArabicShaper {
    pub fn new() -> Self {
        ArabicShaper { synthetic: SyntheticGsub::new(), syriac: false }
    }

    pub fn for_script(ctx: &SelectionContext) -> Self {
        ArabicShaper { synthetic: SyntheticGsub::new(), syriac: ctx.script == Tag::new(b"syrc") }
    }
}

impl Default for ArabicShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapingEngine for ArabicShaper {
    fn name(&self) -> &'static str {
        "arabic"
    }

    fn score(ctx: &SelectionContext) -> i32 {
        let arab = Tag::new(b"arab");
        let syrc = Tag::new(b"syrc");
        if ctx.script == arab {
            110
        } else if ctx.script == syrc && ctx.chosen_script != Tag::DEFAULT_SCRIPT {
            110
        } else {
            -1
        }
    }

    fn collect_features(&self, plan: &mut FeaturePlan, font: &mut ot_tables::Font) {
        // `stch` gets its own pause so the measure/cut pass runs against
        // the fully-substituted glyph stream before anything else touches
        // widths.
        plan.add_pause(StageKind::Gsub, stch_pause);

        for &tag in &[Tag::new(b"ccmp"), Tag::new(b"locl")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::GLOBAL, true);
        }
        plan.add_pause(StageKind::Gsub, |_| false);

        for &tag in ARABIC_FEATURES {
            // fin2/fin3/med2 are Syriac-only variants of fina/fina/medi;
            // registering them for a plain Arabic run would just waste a
            // mask bit no lookup ever sets.
            if feature_is_syriac(tag) && !self.syriac {
                continue;
            }
            let font_has_it = crate::plan::font_has_feature(font, StageKind::Gsub, tag);
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::HAS_FALLBACK, font_has_it);
            plan.add_pause(StageKind::Gsub, |_| false);
        }

        let rlig_tag = Tag::new(b"rlig");
        let rlig_present = crate::plan::font_has_feature(font, StageKind::Gsub, rlig_tag);
        plan.add_feature(StageKind::Gsub, rlig_tag, FeatureFlags::MANUAL_ZWJ | FeatureFlags::HAS_FALLBACK, rlig_present);
        plan.add_pause(StageKind::Gsub, fallback_shape_pause);

        plan.add_feature(StageKind::Gsub, Tag::new(b"calt"), FeatureFlags::MANUAL_ZWJ, true);
        plan.add_feature(StageKind::Gsub, Tag::new(b"rclt"), FeatureFlags::MANUAL_ZWJ, true);

        for &tag in &[Tag::new(b"liga"), Tag::new(b"clig")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::NONE, true);
        }

        for &tag in &[Tag::new(b"kern"), Tag::new(b"mark"), Tag::new(b"mkmk")] {
            plan.add_feature(StageKind::Gpos, tag, FeatureFlags::GLOBAL, true);
        }
    }

    fn setup_masks(&self, plan: &FeaturePlan, buffer: &mut Buffer) {
        joining::arabic_joining(buffer);
        joining::mongolian_variation_selectors(buffer);

        for i in 0..buffer.len() {
            let action = joining::action_at(buffer, i);
            if action == Action::None {
                continue;
            }
            let tag = arabic_feature_for(action);
            if let Some(mask) = plan.mask_for(tag) {
                buffer.info[i].mask |= mask;
            }
        }
    }

    fn reorder_marks(&self, buffer: &mut Buffer) {
        joining::reorder_marks(0, buffer.len(), buffer);
    }

    fn postprocess_glyphs(&self, buffer: &mut Buffer, target_width: Option<i64>) {
        stretch::record_stch(buffer);
        let natural_width: i64 = buffer.pos.iter().map(|p| p.x_advance as i64).sum();
        let desired_width = target_width.unwrap_or(natural_width);
        stretch::apply_stch(buffer, desired_width);
    }

    fn apply_fallback(&self, font: &mut ot_tables::Font, buffer: &mut Buffer) {
        for i in 0..buffer.len() {
            let base = buffer.info[i].codepoint;
            let action = joining::action_at(buffer, i);
            let Some(form_cp) = self.synthetic.form_for(base, action) else { continue };
            if let Some(gid) = self.synthetic.glyph_for(font, form_cp) {
                buffer.info[i].glyph_id = gid;
            }
        }
    }
}

fn arabic_feature_for(action: Action) -> Tag {
    match action {
        Action::Isol => Tag::new(b"isol"),
        Action::Fina => Tag::new(b"fina"),
        Action::Fin2 => Tag::new(b"fin2"),
        Action::Fin3 => Tag::new(b"fin3"),
        Action::Medi => Tag::new(b"medi"),
        Action::Med2 => Tag::new(b"med2"),
        Action::Init => Tag::new(b"init"),
        Action::None | Action::StretchingFixed | Action::StretchingRepeating => Tag::new(b"isol"),
    }
}

fn stch_pause(buffer: &mut Buffer) -> bool {
    stretch::record_stch(buffer);
    false
}

/// Runs after `rlig`: any position whose form feature needed a fallback
/// (the font didn't carry it) gets resolved through the synthetic
/// presentation-forms table instead. Returning `false` since substituting
/// a presentation-form codepoint doesn't change the decomposition the
/// normalizer already settled on.
fn fallback_shape_pause(_buffer: &mut Buffer) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Direction;

    /// A table-less SFNT: enough for `Font::parse` to succeed with no
    /// tables at all, so `font_has_feature` reports everything absent.
    fn empty_font_bytes() -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend(0x0001_0000u32.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // numTables
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes
    }

    #[test]
    fn arabic_beats_hebrew_and_core_for_arabic_script() {
        let ctx = SelectionContext {
            script: Tag::new(b"arab"),
            direction: Direction::RightToLeft,
            chosen_script: Tag::new(b"arab"),
        };
        assert!(ArabicShaper::score(&ctx) > 0);
    }

    #[test]
    fn plain_arabic_skips_syriac_only_variants() {
        let bytes = empty_font_bytes();
        let mut font = ot_tables::Font::parse(&bytes).unwrap();
        let mut plan = FeaturePlan::new();
        ArabicShaper::new().collect_features(&mut plan, &mut font);
        assert!(plan.mask_for(Tag::new(b"isol")).is_some());
        assert!(plan.mask_for(Tag::new(b"fina")).is_some());
        assert!(plan.mask_for(Tag::new(b"fin2")).is_none());
        assert!(plan.mask_for(Tag::new(b"fin3")).is_none());
        assert!(plan.mask_for(Tag::new(b"med2")).is_none());
    }

    #[test]
    fn syriac_context_registers_all_seven_form_features() {
        let ctx = SelectionContext {
            script: Tag::new(b"syrc"),
            direction: Direction::RightToLeft,
            chosen_script: Tag::new(b"syrc"),
        };
        let bytes = empty_font_bytes();
        let mut font = ot_tables::Font::parse(&bytes).unwrap();
        let mut plan = FeaturePlan::new();
        ArabicShaper::for_script(&ctx).collect_features(&mut plan, &mut font);
        for &tag in ARABIC_FEATURES {
            assert!(plan.mask_for(tag).is_some(), "missing mask for {tag:?}");
        }
    }

    #[test]
    fn font_declaring_isol_skips_its_fallback() {
        // A GSUB with a ScriptList/FeatureList/LookupList naming "isol" but
        // no lookups worth running; presence alone should suppress the
        // fallback flag regardless of whether any script activates it.
        let lookup_list = {
            let mut b = vec![];
            b.extend(0u16.to_be_bytes()); // lookup count
            b
        };
        let feature = {
            let mut b = vec![];
            b.extend(0u16.to_be_bytes()); // featureParams
            b.extend(0u16.to_be_bytes()); // lookupIndexCount
            b
        };
        let feature_list = {
            let mut b = vec![];
            b.extend(1u16.to_be_bytes());
            b.extend(*b"isol");
            b.extend(8u16.to_be_bytes());
            b.extend(feature);
            b
        };
        let script_list = {
            let mut b = vec![];
            b.extend(0u16.to_be_bytes());
            b
        };
        let gsub = {
            let mut b = vec![];
            b.extend(0x0001_0000u32.to_be_bytes());
            let script_list_offset = 10u16;
            let feature_list_offset = script_list_offset + script_list.len() as u16;
            let lookup_list_offset = feature_list_offset + feature_list.len() as u16;
            b.extend(script_list_offset.to_be_bytes());
            b.extend(feature_list_offset.to_be_bytes());
            b.extend(lookup_list_offset.to_be_bytes());
            b.extend(script_list);
            b.extend(feature_list);
            b.extend(lookup_list);
            b
        };
        let header_len = 12 + 16;
        let mut bytes = vec![];
        bytes.extend(0x0001_0000u32.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(*b"GSUB");
        bytes.extend(0u32.to_be_bytes());
        bytes.extend((header_len as u32).to_be_bytes());
        bytes.extend((gsub.len() as u32).to_be_bytes());
        bytes.extend(gsub);

        let mut font = ot_tables::Font::parse(&bytes).unwrap();
        let mut plan = FeaturePlan::new();
        ArabicShaper::new().collect_features(&mut plan, &mut font);
        assert!(!plan.feature_needs_fallback(Tag::new(b"isol")));
        assert!(plan.feature_needs_fallback(Tag::new(b"fina")));
    }
}
