//! The shaper capability set and registry: a closed set of hooks any
//! complex shaper may implement, selected per-run by [`select_shaper`].

pub mod arabic;
pub mod core;
pub mod hebrew;

use font_types::Tag;

use crate::buffer::Buffer;
use crate::plan::FeaturePlan;

/// A pause callback: invoked between feature stages, with the chance to
/// mutate the buffer. Returning `true` asks the driver to re-run
/// normalization before the next stage proceeds.
pub type PauseCallback = fn(&mut Buffer) -> bool;

/// What the registry scores a shaper against.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext {
    pub script: Tag,
    pub direction: crate::buffer::Direction,
    /// The script actually chosen for this run, which may differ from
    /// `script` itself is the input codepoints' detected script rather than
    /// caller override; kept distinct so Syriac-vs-DFLT scoring (see
    /// [`arabic::ArabicShaper::score`]) can tell them apart.
    pub chosen_script: Tag,
}

/// The closed capability set every shaper may implement. Hooks default to
/// no-ops via the trait's default methods; `CollectFeatures` and
/// `SetupMasks` are the only ones every real shaper overrides.
pub trait ShapingEngine {
    fn name(&self) -> &'static str;

    fn score(ctx: &SelectionContext) -> i32
    where
        Self: Sized;

    fn collect_features(&self, plan: &mut FeaturePlan, font: &mut ot_tables::Font);

    fn override_features(&self, _plan: &mut FeaturePlan) {}

    fn setup_masks(&self, _plan: &FeaturePlan, _buffer: &mut Buffer) {}

    fn preprocess_text(&self, _buffer: &mut Buffer) {}

    fn reorder_marks(&self, _buffer: &mut Buffer) {}

    /// `target_width` is the justification width a layout engine wants this
    /// run stretched or shrunk to, in the same units as glyph advances;
    /// `None` means "use the run's own natural width" (a no-op for
    /// width-dependent passes like Arabic `stch`, by design rather than by
    /// accident).
    fn postprocess_glyphs(&self, _buffer: &mut Buffer, _target_width: Option<i64>) {}

    /// Called once, after the driver notices the font lacks a feature a
    /// plan step declared [`crate::plan::FeatureFlags::HAS_FALLBACK`] for.
    /// Most shapers have no fallback and leave this a no-op; Arabic
    /// resolves presentation-form codepoints through `cmap` here instead.
    fn apply_fallback(&self, _font: &mut ot_tables::Font, _buffer: &mut Buffer) {}

    fn decompose(&self, ch: char) -> Option<(char, char)> {
        default_canonical_decompose(ch)
    }

    fn compose(&self, a: char, b: char) -> Option<char> {
        default_canonical_compose(a, b)
    }
}

fn default_canonical_decompose(_ch: char) -> Option<(char, char)> {
    None
}

fn default_canonical_compose(_a: char, _b: char) -> Option<char> {
    None
}

/// Picks the highest-scoring shaper for `ctx`. Core always matches (score
/// 0), so this never returns `None`.
pub fn select_shaper(ctx: &SelectionContext) -> Box<dyn ShapingEngine> {
    let arabic_score = arabic::ArabicShaper::score(ctx);
    let hebrew_score = hebrew::HebrewShaper::score(ctx);
    let core_score = core::CoreShaper::score(ctx);

    if arabic_score >= hebrew_score && arabic_score >= core_score && arabic_score >= 0 {
        Box::new(arabic::ArabicShaper::for_script(ctx))
    } else if hebrew_score >= core_score && hebrew_score >= 0 {
        Box::new(hebrew::HebrewShaper::new())
    } else {
        Box::new(core::CoreShaper::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Direction;

    #[test]
    fn syriac_defaults_to_core_unless_chosen() {
        let syrc = Tag::new(b"syrc");
        let dflt = Tag::DEFAULT_SCRIPT;
        let ctx_default = SelectionContext { script: syrc, direction: Direction::RightToLeft, chosen_script: dflt };
        assert_eq!(select_shaper(&ctx_default).name(), "core");

        let ctx_chosen = SelectionContext { script: syrc, direction: Direction::RightToLeft, chosen_script: syrc };
        assert_eq!(select_shaper(&ctx_chosen).name(), "arabic");
    }

    #[test]
    fn arabic_script_always_picks_arabic_shaper() {
        let arab = Tag::new(b"arab");
        let ctx = SelectionContext { script: arab, direction: Direction::RightToLeft, chosen_script: arab };
        assert_eq!(select_shaper(&ctx).name(), "arabic");
    }
}
