//! Feature planning: turns (script, language, user features, shaper) into
//! an ordered sequence of GSUB/GPOS stages with pauses, and assigns each
//! active feature its mask bit.

use font_types::Tag;

use crate::shapers::PauseCallback;

pub const MAX_MASKED_FEATURES: usize = 32;

/// Per-feature planning flags, hand-rolled the same way as
/// [`ot_tables::tables::lookup_flags::LookupFlags`] rather than pulled in
/// from a bitflags crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags(u8);

impl FeatureFlags {
    pub const NONE: FeatureFlags = FeatureFlags(0);
    /// The shaper applies this feature itself via explicit mask checks
    /// rather than letting it run unconditionally within its stage.
    pub const MANUAL_ZWJ: FeatureFlags = FeatureFlags(1 << 0);
    /// If the font doesn't provide this feature, the shaper has a fallback
    /// synthesis path (e.g. Arabic's synthetic GSUB).
    pub const HAS_FALLBACK: FeatureFlags = FeatureFlags(1 << 1);
    /// Applies to every glyph regardless of per-cluster feature ranges.
    pub const GLOBAL: FeatureFlags = FeatureFlags(1 << 2);

    pub const fn contains(self, other: FeatureFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: FeatureFlags) -> FeatureFlags {
        FeatureFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for FeatureFlags {
    type Output = FeatureFlags;
    fn bitor(self, rhs: FeatureFlags) -> FeatureFlags {
        self.union(rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Gsub,
    Gpos,
}

/// One step in the plan's timeline: either a feature becomes active within
/// the current stage, or a pause hands control to the shaper.
pub enum PlanStep {
    Feature { tag: Tag, mask: u32, flags: FeatureFlags, needs_fallback: bool },
    Pause { stage: StageKind, callback: PauseCallback },
}

/// A fully built feature plan: the ordered steps, each tagged with the
/// stage (GSUB/GPOS) it belongs to.
pub struct FeaturePlan {
    steps: Vec<(StageKind, PlanStep)>,
    next_bit: u32,
    dropped_overflow: Vec<Tag>,
}

impl FeaturePlan {
    pub fn new() -> Self {
        FeaturePlan { steps: Vec::new(), next_bit: 0, dropped_overflow: Vec::new() }
    }

    /// Registers a feature, in collection order, and returns the mask bit
    /// assigned to it (or `None` once [`MAX_MASKED_FEATURES`] is exceeded).
    ///
    /// Per the open question on overflow policy: this implementation drops
    /// — rather than panics on, or silently aliases — features past the
    /// 32nd, and records the dropped tag so a caller can inspect what was
    /// lost via [`FeaturePlan::dropped_overflow`].
    pub fn add_feature(
        &mut self,
        stage: StageKind,
        tag: Tag,
        flags: FeatureFlags,
        font_has_feature: bool,
    ) -> Option<u32> {
        if self.next_bit as usize >= MAX_MASKED_FEATURES {
            log::warn!("dropping feature {:?}, {} mask bits already assigned", tag, MAX_MASKED_FEATURES);
            self.dropped_overflow.push(tag);
            return None;
        }
        let mask = 1u32 << self.next_bit;
        self.next_bit += 1;
        let needs_fallback = flags.contains(FeatureFlags::HAS_FALLBACK) && !font_has_feature;
        self.steps.push((stage, PlanStep::Feature { tag, mask, flags, needs_fallback }));
        Some(mask)
    }

    pub fn add_pause(&mut self, stage: StageKind, callback: PauseCallback) {
        self.steps.push((stage, PlanStep::Pause { stage, callback }));
    }

    pub fn dropped_overflow(&self) -> &[Tag] {
        &self.dropped_overflow
    }

    pub fn steps(&self, stage: StageKind) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(move |(s, _)| *s == stage).map(|(_, step)| step)
    }

    /// `true` when `tag` was declared with [`FeatureFlags::HAS_FALLBACK`]
    /// and the font did not provide it.
    pub fn feature_needs_fallback(&self, tag: Tag) -> bool {
        self.steps.iter().any(|(_, step)| match step {
            PlanStep::Feature { tag: t, needs_fallback, .. } => *t == tag && *needs_fallback,
            PlanStep::Pause { .. } => false,
        })
    }

    /// The OR of every [`FeatureFlags::GLOBAL`] feature's mask bit: these
    /// run unconditionally, so the driver sets them on every glyph up
    /// front rather than relying on a shaper's `setup_masks` to cover them.
    pub fn global_mask(&self) -> u32 {
        self.steps.iter().fold(0, |acc, (_, step)| match step {
            PlanStep::Feature { mask, flags, .. } if flags.contains(FeatureFlags::GLOBAL) => acc | *mask,
            _ => acc,
        })
    }

    pub fn mask_for(&self, tag: Tag) -> Option<u32> {
        self.steps.iter().find_map(|(_, step)| match step {
            PlanStep::Feature { tag: t, mask, .. } if *t == tag => Some(*mask),
            _ => None,
        })
    }
}

impl Default for FeaturePlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the font's `stage` table declares `tag` at all, independent of
/// any particular script/language activating it. Shapers use this to
/// decide whether a [`FeatureFlags::HAS_FALLBACK`] feature needs its
/// fallback synthesis path.
pub fn font_has_feature(font: &mut ot_tables::Font, stage: StageKind, tag: Tag) -> bool {
    match stage {
        StageKind::Gsub => font.gsub().is_some_and(|g| g.feature_list.iter().any(|(_, t, _)| t == tag)),
        StageKind::Gpos => font.gpos().is_some_and(|g| g.feature_list.iter().any(|(_, t, _)| t == tag)),
    }
}
