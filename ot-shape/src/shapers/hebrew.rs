//! The Hebrew shaper: mostly the Core feature set, scored higher than Core
//! so it wins for Hebrew script runs; no joining state machine is needed
//! since Hebrew letters don't change shape by position.

use font_types::Tag;

use crate::plan::{FeatureFlags, FeaturePlan, StageKind};
use crate::shapers::{SelectionContext, ShapingEngine};

pub struct HebrewShaper;

impl HebrewShaper {
    pub fn new() -> Self {
        HebrewShaper
    }
}

impl Default for HebrewShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapingEngine for HebrewShaper {
    fn name(&self) -> &'static str {
        "hebrew"
    }

    fn score(ctx: &SelectionContext) -> i32 {
        if ctx.script == Tag::new(b"hebr") {
            100
        } else {
            -1
        }
    }

    fn collect_features(&self, plan: &mut FeaturePlan, _font: &mut ot_tables::Font) {
        for &tag in &[Tag::new(b"ccmp"), Tag::new(b"locl")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::GLOBAL, true);
        }
        for &tag in &[Tag::new(b"dlig"), Tag::new(b"liga"), Tag::new(b"clig"), Tag::new(b"calt")] {
            plan.add_feature(StageKind::Gsub, tag, FeatureFlags::GLOBAL, true);
        }
        for &tag in &[Tag::new(b"kern"), Tag::new(b"mark"), Tag::new(b"mkmk")] {
            plan.add_feature(StageKind::Gpos, tag, FeatureFlags::GLOBAL, true);
        }
    }
}
