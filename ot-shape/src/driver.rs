//! The shaping driver: wires buffer construction, shaper selection,
//! feature planning, normalization, GSUB/GPOS application and the output
//! sink into the one sequence every run follows.

use font_types::{GlyphId, Tag};
use ot_tables::tables::classdef::ClassDef;
use ot_tables::tables::context::{match_glyph_sequence, ChainedSequenceContext, SequenceContext, SequenceLookupRecord};
use ot_tables::tables::coverage::Coverage;
use ot_tables::tables::gdef::GlyphClass;
use ot_tables::tables::gpos::{self, Gpos, GposLookup, GposSubtable, PairPosKind, SinglePosKind};
use ot_tables::tables::gsub::{self, Gsub, GsubLookup, GsubSubtable, SingleSubstKind};
use ot_tables::tables::lookup_flags::LookupFlags;
use ot_tables::Font;

use crate::buffer::{Buffer, Direction, GlyphPosition};
use crate::error::ShapeError;
use crate::normalize::{self, NormalizationMode};
use crate::plan::{FeaturePlan, PlanStep, StageKind};
use crate::shapers::{select_shaper, SelectionContext, ShapingEngine};

/// Where shaped output goes. A `Vec<(GlyphId, GlyphPosition, cluster)>`
/// based sink is provided for tests; real callers implement this against
/// their own glyph-run representation.
pub trait OutputSink {
    fn push_glyph(&mut self, glyph: GlyphId, pos: GlyphPosition, cluster: u32) -> Result<(), crate::error::SinkError>;
}

/// A minimal in-memory sink, mostly useful for tests and for callers that
/// just want a `Vec` back.
#[derive(Default)]
pub struct VecSink(pub Vec<(GlyphId, GlyphPosition, u32)>);

impl OutputSink for VecSink {
    fn push_glyph(&mut self, glyph: GlyphId, pos: GlyphPosition, cluster: u32) -> Result<(), crate::error::SinkError> {
        self.0.push((glyph, pos, cluster));
        Ok(())
    }
}

pub struct ShapeRequest<'a> {
    pub codepoints: &'a [u32],
    pub script: Tag,
    pub chosen_script: Tag,
    pub direction: Direction,
    pub normalization: NormalizationMode,
    /// `(tag, enabled)`: `true` turns a feature on (or keeps an
    /// already-global one on), `false` clears its mask bit even if the
    /// shaper registered it as [`crate::plan::FeatureFlags::GLOBAL`].
    pub user_features: &'a [(Tag, bool)],
    /// The justification target width (same units as glyph advances) a
    /// layout engine wants the run stretched or shrunk to. `None` means
    /// "use the run's own natural width", which makes width-dependent
    /// passes like Arabic `stch` a no-op by design rather than by
    /// accident.
    pub target_width: Option<i64>,
}

/// Runs the full pipeline for one run of text against one font, pushing
/// the resulting glyphs into `sink`.
pub fn shape(font: &mut Font, request: &ShapeRequest, sink: &mut dyn OutputSink) -> Result<(), ShapeError> {
    let mut buffer = Buffer::from_codepoints(request.codepoints, request.direction);

    let ctx = SelectionContext { script: request.script, direction: request.direction, chosen_script: request.chosen_script };
    let shaper = select_shaper(&ctx);

    let mut plan = FeaturePlan::new();
    shaper.collect_features(&mut plan, font);
    shaper.override_features(&mut plan);

    shaper.preprocess_text(&mut buffer);
    normalize::decompose(&mut buffer, shaper.as_ref(), request.normalization);
    if request.normalization == NormalizationMode::Composed {
        // No decomposition ran for this mode, so this is the only
        // normalization pass `Composed` gets, and it must run before GSUB
        // so lookups see fully-composed input.
        normalize::recompose(&mut buffer, shaper.as_ref(), request.normalization);
    }

    buffer.set_masks(plan.global_mask());
    shaper.setup_masks(&plan, &mut buffer);
    for &(tag, enabled) in request.user_features {
        if let Some(mask) = plan.mask_for(tag) {
            if enabled {
                buffer.set_masks(mask);
            } else {
                buffer.clear_masks(mask);
            }
        }
    }

    map_to_glyphs(font, &mut buffer);

    run_stage(font, &plan, StageKind::Gsub, request.script, &mut buffer, shaper.as_ref());
    run_stage(font, &plan, StageKind::Gpos, request.script, &mut buffer, shaper.as_ref());

    if request.normalization == NormalizationMode::Default {
        // The decomposed form had to survive GSUB/GPOS (mark attachment
        // may depend on it); only now does it get folded back down for
        // fonts/shapers that would rather render it precomposed.
        normalize::recompose(&mut buffer, shaper.as_ref(), request.normalization);
    }

    shaper.reorder_marks(&mut buffer);
    shaper.postprocess_glyphs(&mut buffer, request.target_width);

    if buffer.direction.is_backward() {
        buffer.info.reverse();
        buffer.pos.reverse();
    }

    for (info, pos) in buffer.info.iter().zip(buffer.pos.iter()) {
        sink.push_glyph(info.glyph_id, *pos, info.cluster).map_err(ShapeError::Sink)?;
    }
    Ok(())
}

fn map_to_glyphs(font: &mut Font, buffer: &mut Buffer) {
    let Some(cmap) = font.cmap() else { return };
    let Some(subtable) = cmap.best_subtable() else { return };
    for g in &mut buffer.info {
        if let Some(gid) = subtable.lookup(g.codepoint) {
            g.glyph_id = gid;
        }
    }
    let total_advance = font.hmtx().map(|hmtx| {
        buffer.info.iter().map(|g| hmtx.advance_width(g.glyph_id) as i32).collect::<Vec<_>>()
    });
    if let Some(advances) = total_advance {
        for (pos, advance) in buffer.pos.iter_mut().zip(advances) {
            pos.x_advance = advance;
        }
    }
}

fn run_stage(
    font: &mut Font,
    plan: &FeaturePlan,
    stage: StageKind,
    script: Tag,
    buffer: &mut Buffer,
    shaper: &dyn ShapingEngine,
) {
    let table_script = font_script_lookups(font, stage, script);
    if table_script.is_none() {
        log::debug!("font has no usable {:?} script record, {:?} stage is a no-op", script, stage);
    }

    for step in plan.steps(stage).collect::<Vec<_>>() {
        match step {
            PlanStep::Feature { tag, mask, needs_fallback, .. } => {
                if *needs_fallback {
                    shaper.apply_fallback(font, buffer);
                    continue;
                }
                let Some(lookup_indices) = table_script.as_ref().and_then(|f| f.get(*tag)) else { continue };
                match stage {
                    StageKind::Gsub => {
                        if let Some(gsub) = font.gsub() {
                            for &index in lookup_indices {
                                if let Some(lookup) = gsub.lookup(index) {
                                    for err in lookup.decode_errors() {
                                        font.record_subtable_error(gsub::TAG, err);
                                    }
                                    apply_gsub_lookup(font, &gsub, &lookup, buffer, *mask);
                                }
                            }
                        }
                    }
                    StageKind::Gpos => {
                        if let Some(gpos) = font.gpos() {
                            for &index in lookup_indices {
                                if let Some(lookup) = gpos.lookup(index) {
                                    for err in lookup.decode_errors() {
                                        font.record_subtable_error(gpos::TAG, err);
                                    }
                                    apply_gpos_lookup(&gpos, &lookup, buffer, *mask);
                                }
                            }
                        }
                    }
                }
            }
            PlanStep::Pause { callback, .. } => {
                let renormalize = callback(buffer);
                if renormalize {
                    // Only decompose here: an immediate recompose would
                    // undo it before the rest of the stage runs against it.
                    normalize::decompose(buffer, shaper, NormalizationMode::Default);
                }
            }
        }
    }
}

/// A tag -> lookup-indices map for whatever feature names the font's
/// default LangSys under `script` (falling back to the `DFLT` script)
/// actually activates, built once per stage so each feature step is a
/// cheap lookup rather than a fresh table walk.
struct FeatureLookups(std::collections::HashMap<Tag, Vec<u16>>);

impl FeatureLookups {
    fn get(&self, tag: Tag) -> Option<&[u16]> {
        self.0.get(&tag).map(|v| v.as_slice())
    }
}

fn font_script_lookups(font: &mut Font, stage: StageKind, script: Tag) -> Option<FeatureLookups> {
    let (script_list, feature_list) = match stage {
        StageKind::Gsub => {
            let gsub = font.gsub()?;
            (gsub.script_list, gsub.feature_list)
        }
        StageKind::Gpos => {
            let gpos = font.gpos()?;
            (gpos.script_list, gpos.feature_list)
        }
    };
    let script_record = script_list.get(script).or_else(|| script_list.get(Tag::DEFAULT_SCRIPT)).or_else(|| {
        (0..script_list.len()).find_map(|i| script_list.tag_at(i).and_then(|t| script_list.get(t)))
    })?;
    let lang_sys = script_record.default_lang_sys()?;
    let mut map = std::collections::HashMap::new();
    for index in lang_sys.feature_indices() {
        if let Some((tag, feature)) = feature_list.get(index) {
            map.entry(tag).or_insert_with(Vec::new).extend(feature.lookup_indices());
        }
    }
    Some(FeatureLookups(map))
}

fn should_skip(flags: LookupFlags, font: &mut Font, glyph: GlyphId) -> bool {
    if !flags.ignore_base_glyphs() && !flags.ignore_ligatures() && !flags.ignore_marks() {
        return false;
    }
    let Some(gdef) = font.gdef() else { return false };
    match gdef.glyph_class(glyph) {
        GlyphClass::Base => flags.ignore_base_glyphs(),
        GlyphClass::Ligature => flags.ignore_ligatures(),
        GlyphClass::Mark => flags.ignore_marks(),
        GlyphClass::Component => false,
    }
}

/// Nested-lookup application inside a Context/ChainedContext match can
/// itself land on another context subtable; this bounds how deep that can
/// recurse before a cyclic or pathological lookup graph gets cut off.
const MAX_CONTEXT_RECURSION: u8 = 8;

fn apply_gsub_lookup(font: &mut Font, gsub: &Gsub, lookup: &GsubLookup, buffer: &mut Buffer, mask: u32) {
    let flags = lookup.flags();
    let mut i = 0;
    while i < buffer.len() {
        if buffer.info[i].mask & mask == 0 || should_skip(flags, font, buffer.info[i].glyph_id) {
            i += 1;
            continue;
        }
        for sub_index in 0..lookup.subtable_count() {
            let Some(subtable) = lookup.subtable(sub_index) else { continue };
            if apply_gsub_subtable(gsub, subtable, buffer, i, 0) {
                break;
            }
        }
        i += 1;
    }
}

fn apply_gsub_subtable(gsub: &Gsub, subtable: &GsubSubtable, buffer: &mut Buffer, i: usize, depth: u8) -> bool {
    let glyph = buffer.info[i].glyph_id;
    match subtable {
        GsubSubtable::Single { coverage, deltas } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let substitute = match deltas {
                SingleSubstKind::Delta(delta) => {
                    GlyphId::new((glyph.to_u16() as i32 + *delta as i32) as u16)
                }
                SingleSubstKind::List(..) => match deltas.apply(cov_index) {
                    Some(g) => g,
                    None => return false,
                },
            };
            buffer.info[i].glyph_id = substitute;
            true
        }
        GsubSubtable::Multiple { coverage, sequences } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let Some(seq) = sequences.get(cov_index as usize) else { return false };
            if seq.is_empty() {
                return false;
            }
            buffer.info[i].glyph_id = seq[0];
            buffer.info[i].multiplied = true;
            buffer.info[i].lig_comp = 0;
            buffer.replicate(i, seq.len() - 1);
            for (k, &g) in seq.iter().enumerate().skip(1) {
                buffer.info[i + k].glyph_id = g;
                buffer.info[i + k].multiplied = true;
                buffer.info[i + k].lig_comp = k as u8;
            }
            true
        }
        GsubSubtable::Alternate { coverage, alternates } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let Some(alts) = alternates.get(cov_index as usize) else { return false };
            let Some(&first) = alts.first() else { return false };
            buffer.info[i].glyph_id = first;
            true
        }
        GsubSubtable::Ligature { coverage, ligature_sets } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let Some(set) = ligature_sets.get(cov_index as usize) else { return false };
            for lig in set {
                let needed = lig.component_count.saturating_sub(1);
                if i + needed >= buffer.len() {
                    continue;
                }
                // Component glyph ids after the first aren't retained by
                // `Ligature` (see `ligature_components`); this driver only
                // needs count-based matching since the per-shaper Context
                // lookups resolve the finer-grained cases.
                buffer.merge_clusters(i, i + needed);
                buffer.info[i].glyph_id = lig.glyph;
                for k in (1..=needed).rev() {
                    buffer.info.remove(i + k);
                    buffer.pos.remove(i + k);
                }
                return true;
            }
            false
        }
        GsubSubtable::Context(ctx) => apply_gsub_context(gsub, ctx, buffer, i, depth),
        GsubSubtable::ChainContext(ctx) => apply_gsub_chain_context(gsub, ctx, buffer, i, depth),
        GsubSubtable::ReverseChainSingle { coverage, backtrack, lookahead, substitutes } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            if !match_reverse_coverage_seq(backtrack, buffer, i) || !match_coverage_seq(lookahead, buffer, i + 1) {
                return false;
            }
            let Some(&substitute) = substitutes.get(cov_index as usize) else { return false };
            buffer.info[i].glyph_id = substitute;
            true
        }
    }
}

fn apply_gsub_context(gsub: &Gsub, ctx: &SequenceContext, buffer: &mut Buffer, i: usize, depth: u8) -> bool {
    if depth >= MAX_CONTEXT_RECURSION {
        return false;
    }
    let glyph = buffer.info[i].glyph_id;
    match ctx {
        SequenceContext::Format1 { coverage, rule_sets } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let Some(rules) = rule_sets.get(cov_index as usize) else { return false };
            for rule in rules {
                if match_literal(&rule.input, buffer, i + 1) {
                    return run_sequence_lookups_gsub(gsub, &rule.lookups, buffer, i, depth);
                }
            }
            false
        }
        SequenceContext::Format2 { coverage, class_def, class_rule_sets } => {
            if coverage.get(glyph).is_none() {
                return false;
            }
            let class = class_def.get(glyph) as usize;
            let Some(rules) = class_rule_sets.get(class) else { return false };
            for rule in rules {
                if match_class(&rule.input, class_def, buffer, i + 1) {
                    return run_sequence_lookups_gsub(gsub, &rule.lookups, buffer, i, depth);
                }
            }
            false
        }
        SequenceContext::Format3 { input, lookups } => {
            if !match_coverage_seq(input, buffer, i) {
                return false;
            }
            run_sequence_lookups_gsub(gsub, lookups, buffer, i, depth)
        }
    }
}

fn apply_gsub_chain_context(gsub: &Gsub, ctx: &ChainedSequenceContext, buffer: &mut Buffer, i: usize, depth: u8) -> bool {
    if depth >= MAX_CONTEXT_RECURSION {
        return false;
    }
    let glyph = buffer.info[i].glyph_id;
    match ctx {
        ChainedSequenceContext::Format1 { coverage, rule_sets } => {
            let Some(cov_index) = coverage.get(glyph) else { return false };
            let Some(rules) = rule_sets.get(cov_index as usize) else { return false };
            for rule in rules {
                if match_reverse_literal(&rule.backtrack, buffer, i)
                    && match_literal(&rule.input, buffer, i + 1)
                    && match_literal(&rule.lookahead, buffer, i + 1 + rule.input.len())
                {
                    return run_sequence_lookups_gsub(gsub, &rule.lookups, buffer, i, depth);
                }
            }
            false
        }
        ChainedSequenceContext::Format2 { coverage, backtrack_class_def, input_class_def, lookahead_class_def, class_rule_sets } => {
            if coverage.get(glyph).is_none() {
                return false;
            }
            let class = input_class_def.get(glyph) as usize;
            let Some(rules) = class_rule_sets.get(class) else { return false };
            for rule in rules {
                if match_reverse_class(&rule.backtrack, backtrack_class_def, buffer, i)
                    && match_class(&rule.input, input_class_def, buffer, i + 1)
                    && match_class(&rule.lookahead, lookahead_class_def, buffer, i + 1 + rule.input.len())
                {
                    return run_sequence_lookups_gsub(gsub, &rule.lookups, buffer, i, depth);
                }
            }
            false
        }
        ChainedSequenceContext::Format3 { backtrack, input, lookahead, lookups } => {
            if !match_reverse_coverage_seq(backtrack, buffer, i)
                || !match_coverage_seq(input, buffer, i)
                || !match_coverage_seq(lookahead, buffer, i + input.len())
            {
                return false;
            }
            run_sequence_lookups_gsub(gsub, lookups, buffer, i, depth)
        }
    }
}

fn run_sequence_lookups_gsub(gsub: &Gsub, records: &[SequenceLookupRecord], buffer: &mut Buffer, base: usize, depth: u8) -> bool {
    let mut applied = false;
    for record in records {
        let pos = base + record.sequence_index as usize;
        if pos >= buffer.len() {
            continue;
        }
        let Some(lookup) = gsub.lookup(record.lookup_list_index) else { continue };
        for sub_index in 0..lookup.subtable_count() {
            let Some(subtable) = lookup.subtable(sub_index) else { continue };
            if apply_gsub_subtable(gsub, subtable, buffer, pos, depth + 1) {
                applied = true;
                break;
            }
        }
    }
    applied
}

fn glyph_at(buffer: &Buffer, pos: usize) -> Option<GlyphId> {
    buffer.info.get(pos).map(|info| info.glyph_id)
}

fn match_literal(expected: &[u16], buffer: &Buffer, start: usize) -> bool {
    match_glyph_sequence(expected, |pos| glyph_at(buffer, pos), start, |want, g| g.to_u16() == want)
}

fn match_reverse_literal(expected: &[u16], buffer: &Buffer, anchor: usize) -> bool {
    match_glyph_sequence(
        expected,
        |k| anchor.checked_sub(1 + k).and_then(|pos| glyph_at(buffer, pos)),
        0,
        |want, g| g.to_u16() == want,
    )
}

fn match_class(expected: &[u16], class_def: &ClassDef, buffer: &Buffer, start: usize) -> bool {
    match_glyph_sequence(expected, |pos| glyph_at(buffer, pos), start, |want, g| class_def.get(g) == want)
}

fn match_reverse_class(expected: &[u16], class_def: &ClassDef, buffer: &Buffer, anchor: usize) -> bool {
    match_glyph_sequence(
        expected,
        |k| anchor.checked_sub(1 + k).and_then(|pos| glyph_at(buffer, pos)),
        0,
        |want, g| class_def.get(g) == want,
    )
}

fn match_coverage_seq(coverages: &[Coverage], buffer: &Buffer, start: usize) -> bool {
    coverages
        .iter()
        .enumerate()
        .all(|(k, cov)| buffer.info.get(start + k).is_some_and(|info| cov.get(info.glyph_id).is_some()))
}

fn match_reverse_coverage_seq(coverages: &[Coverage], buffer: &Buffer, anchor: usize) -> bool {
    coverages.iter().enumerate().all(|(k, cov)| {
        anchor
            .checked_sub(1 + k)
            .and_then(|pos| buffer.info.get(pos))
            .is_some_and(|info| cov.get(info.glyph_id).is_some())
    })
}

fn apply_gpos_lookup(gpos: &Gpos, lookup: &GposLookup, buffer: &mut Buffer, mask: u32) {
    for i in 0..buffer.len() {
        if buffer.info[i].mask & mask == 0 {
            continue;
        }
        for sub_index in 0..lookup.subtable_count() {
            let Some(subtable) = lookup.subtable(sub_index) else { continue };
            apply_gpos_subtable(gpos, subtable, buffer, i, 0);
        }
    }
}

fn apply_gpos_subtable(gpos: &Gpos, subtable: &GposSubtable, buffer: &mut Buffer, i: usize, depth: u8) {
    let glyph = buffer.info[i].glyph_id;
    match subtable {
        GposSubtable::Single { coverage, kind } => {
            let Some(cov_index) = coverage.get(glyph) else { return };
            let record = match kind {
                SinglePosKind::Shared(record) => Some(*record),
                SinglePosKind::PerGlyph(records) => records.get(cov_index as usize).copied(),
            };
            if let Some(record) = record {
                apply_value_record(&mut buffer.pos[i], &record);
            }
        }
        GposSubtable::Pair { coverage, kind } => {
            if i + 1 >= buffer.len() {
                return;
            }
            let Some(cov_index) = coverage.get(glyph) else { return };
            let next = buffer.info[i + 1].glyph_id;
            match kind {
                PairPosKind::Specific(sets) => {
                    let Some(set) = sets.get(cov_index as usize) else { return };
                    if let Some((_, first, second)) = set.iter().find(|(g, _, _)| *g == next) {
                        apply_value_record(&mut buffer.pos[i], first);
                        apply_value_record(&mut buffer.pos[i + 1], second);
                    }
                }
                PairPosKind::ByClass { class_def1, class_def2, class2_count, records, .. } => {
                    let class1 = class_def1.get(glyph) as usize;
                    let class2 = class_def2.get(next) as usize;
                    if let Some((first, second)) = records.get(class1 * *class2_count as usize + class2) {
                        apply_value_record(&mut buffer.pos[i], first);
                        apply_value_record(&mut buffer.pos[i + 1], second);
                    }
                }
            }
        }
        GposSubtable::Context(ctx) => apply_gpos_context(gpos, ctx, buffer, i, depth),
        GposSubtable::ChainContext(ctx) => apply_gpos_chain_context(gpos, ctx, buffer, i, depth),
        // Attachment GPOS types need anchor resolution against a chosen
        // base/mark-class pairing, which is positioning machinery this
        // driver doesn't build; a documented scope cut (see DESIGN.md).
        GposSubtable::Cursive { .. }
        | GposSubtable::MarkToBase { .. }
        | GposSubtable::MarkToLigature { .. }
        | GposSubtable::MarkToMark { .. } => {}
    }
}

fn apply_gpos_context(gpos: &Gpos, ctx: &SequenceContext, buffer: &mut Buffer, i: usize, depth: u8) {
    if depth >= MAX_CONTEXT_RECURSION || i >= buffer.len() {
        return;
    }
    let glyph = buffer.info[i].glyph_id;
    match ctx {
        SequenceContext::Format1 { coverage, rule_sets } => {
            let Some(cov_index) = coverage.get(glyph) else { return };
            let Some(rules) = rule_sets.get(cov_index as usize) else { return };
            for rule in rules {
                if match_literal(&rule.input, buffer, i + 1) {
                    run_sequence_lookups_gpos(gpos, &rule.lookups, buffer, i, depth);
                    return;
                }
            }
        }
        SequenceContext::Format2 { coverage, class_def, class_rule_sets } => {
            if coverage.get(glyph).is_none() {
                return;
            }
            let class = class_def.get(glyph) as usize;
            let Some(rules) = class_rule_sets.get(class) else { return };
            for rule in rules {
                if match_class(&rule.input, class_def, buffer, i + 1) {
                    run_sequence_lookups_gpos(gpos, &rule.lookups, buffer, i, depth);
                    return;
                }
            }
        }
        SequenceContext::Format3 { input, lookups } => {
            if match_coverage_seq(input, buffer, i) {
                run_sequence_lookups_gpos(gpos, lookups, buffer, i, depth);
            }
        }
    }
}

fn apply_gpos_chain_context(gpos: &Gpos, ctx: &ChainedSequenceContext, buffer: &mut Buffer, i: usize, depth: u8) {
    if depth >= MAX_CONTEXT_RECURSION || i >= buffer.len() {
        return;
    }
    let glyph = buffer.info[i].glyph_id;
    match ctx {
        ChainedSequenceContext::Format1 { coverage, rule_sets } => {
            let Some(cov_index) = coverage.get(glyph) else { return };
            let Some(rules) = rule_sets.get(cov_index as usize) else { return };
            for rule in rules {
                if match_reverse_literal(&rule.backtrack, buffer, i)
                    && match_literal(&rule.input, buffer, i + 1)
                    && match_literal(&rule.lookahead, buffer, i + 1 + rule.input.len())
                {
                    run_sequence_lookups_gpos(gpos, &rule.lookups, buffer, i, depth);
                    return;
                }
            }
        }
        ChainedSequenceContext::Format2 { coverage, backtrack_class_def, input_class_def, lookahead_class_def, class_rule_sets } => {
            if coverage.get(glyph).is_none() {
                return;
            }
            let class = input_class_def.get(glyph) as usize;
            let Some(rules) = class_rule_sets.get(class) else { return };
            for rule in rules {
                if match_reverse_class(&rule.backtrack, backtrack_class_def, buffer, i)
                    && match_class(&rule.input, input_class_def, buffer, i + 1)
                    && match_class(&rule.lookahead, lookahead_class_def, buffer, i + 1 + rule.input.len())
                {
                    run_sequence_lookups_gpos(gpos, &rule.lookups, buffer, i, depth);
                    return;
                }
            }
        }
        ChainedSequenceContext::Format3 { backtrack, input, lookahead, lookups } => {
            if match_reverse_coverage_seq(backtrack, buffer, i)
                && match_coverage_seq(input, buffer, i)
                && match_coverage_seq(lookahead, buffer, i + input.len())
            {
                run_sequence_lookups_gpos(gpos, lookups, buffer, i, depth);
            }
        }
    }
}

fn run_sequence_lookups_gpos(gpos: &Gpos, records: &[SequenceLookupRecord], buffer: &mut Buffer, base: usize, depth: u8) {
    for record in records {
        let pos = base + record.sequence_index as usize;
        if pos >= buffer.len() {
            continue;
        }
        let Some(lookup) = gpos.lookup(record.lookup_list_index) else { continue };
        for sub_index in 0..lookup.subtable_count() {
            let Some(subtable) = lookup.subtable(sub_index) else { continue };
            apply_gpos_subtable(gpos, subtable, buffer, pos, depth + 1);
        }
    }
}

fn apply_value_record(pos: &mut GlyphPosition, record: &ot_tables::tables::gpos::ValueRecord) {
    pos.x_offset += record.x_placement as i32;
    pos.y_offset += record.y_placement as i32;
    pos.x_advance += record.x_advance as i32;
    pos.y_advance += record.y_advance as i32;
}
