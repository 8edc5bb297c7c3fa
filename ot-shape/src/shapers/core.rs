//! The Core shaper: universal fallback with no script-specific behavior.
//! Always matches, so every run has somewhere to land.

use font_types::Tag;

use crate::plan::{FeatureFlags, FeaturePlan, StageKind};
use crate::shapers::{SelectionContext, ShapingEngine};

pub struct CoreShaper;

impl CoreShaper {
    pub fn new() -> Self {
        CoreShaper
    }
}

impl Default for CoreShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapingEngine for CoreShaper {
    fn name(&self) -> &'static str {
        "core"
    }

    fn score(_ctx: &SelectionContext) -> i32 {
        0
    }

    fn collect_features(&self, plan: &mut FeaturePlan, _font: &mut ot_tables::Font) {
        for &tag in &[Tag::new(b"ccmp"), Tag::new(b"locl")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::GLOBAL, true);
        }
        for &tag in &[Tag::new(b"rlig"), Tag::new(b"liga"), Tag::new(b"clig"), Tag::new(b"calt")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::GLOBAL, true);
        }
        for &tag in &[Tag::new(b"kern"), Tag::new(b"mark"), Tag::new(b"mkmk")] {
            plan.add_feature(StageKind::Gpos, tag, FeatureFlags::GLOBAL, true);
        }
    }
}
