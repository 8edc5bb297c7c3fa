//! End-to-end driver conformance scenarios: a hand-built font exercises one
//! GSUB/GPOS lookup type or shaper behavior each, checked against the
//! glyphs and positions `driver::shape` actually produces.

mod common;

use font_types::{GlyphId, Tag};
use ot_shape::{shape, Direction, ShapeRequest, VecSink};
use ot_tables::Font;

fn shape_codepoints(font_bytes: &[u8], codepoints: &[u32], script: Tag, direction: Direction) -> Vec<GlyphId> {
    let mut font = Font::parse(font_bytes).unwrap();
    let request = ShapeRequest {
        codepoints,
        script,
        chosen_script: script,
        direction,
        normalization: ot_shape::NormalizationMode::Default,
        user_features: &[],
        target_width: None,
    };
    let mut sink = VecSink::default();
    shape(&mut font, &request, &mut sink).unwrap();
    sink.0.into_iter().map(|(g, _, _)| g).collect()
}

#[test]
fn latin_fi_ligature_merges_via_gsub() {
    // glyphs: 0 notdef, 2 'f', 3 'i', 4 the 'fi' ligature
    let ligature_table = {
        let mut b = Vec::new();
        b.extend(4u16.to_be_bytes()); // ligature glyph
        b.extend(2u16.to_be_bytes()); // component count
        b.extend(3u16.to_be_bytes()); // component glyph ('i', unused by the driver's count-only match)
        b
    };
    let ligature_set = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // ligatureCount
        b.extend(4u16.to_be_bytes()); // offset to the ligature table
        b.extend(ligature_table);
        b
    };
    let coverage = common::coverage_format1(&[2]);
    let subtable = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // substFormat
        let cov_offset = 8u16;
        let lig_set_offset = cov_offset + coverage.len() as u16;
        b.extend(cov_offset.to_be_bytes());
        b.extend(1u16.to_be_bytes()); // ligSetCount
        b.extend(lig_set_offset.to_be_bytes());
        b.extend(coverage);
        b.extend(ligature_set);
        b
    };
    let gsub = common::build_layout_table(b"liga", common::lookup(4, subtable));
    let cmap = common::cmap_format12(&[('f' as u32, 2), ('i' as u32, 3)]);
    let font_bytes = common::build_sfnt(&[
        (b"cmap", cmap),
        (b"hhea", common::hhea(5)),
        (b"hmtx", common::hmtx(&[500, 500, 600, 300, 700])),
        (b"GSUB", gsub),
    ]);

    let glyphs = shape_codepoints(&font_bytes, &['f' as u32, 'i' as u32], Tag::new(b"latn"), Direction::LeftToRight);
    assert_eq!(glyphs, vec![GlyphId::new(4)]);
}

#[test]
fn arabic_presentation_form_fallback_when_font_lacks_gsub() {
    // No GSUB table at all: every isol/init/medi/fina feature needs the
    // synthetic presentation-forms fallback. "بيت" (beh, yeh, teh) is three
    // dual-joining letters in a row, so it comes out init/medi/fina.
    let beh_init = 0xFE91u32;
    let yeh_medi = 0xFEF3u32;
    let teh_fina = 0xFE96u32;
    let cmap = common::cmap_format12(&[(beh_init, 10), (yeh_medi, 11), (teh_fina, 12)]);
    let font_bytes = common::build_sfnt(&[(b"cmap", cmap)]);

    let glyphs = shape_codepoints(&font_bytes, &[0x0628, 0x064A, 0x062A], Tag::new(b"arab"), Direction::RightToLeft);

    // RTL output is reversed to visual order, so the first glyph pushed is
    // logically-last (teh, final form).
    assert_eq!(glyphs, vec![GlyphId::new(12), GlyphId::new(11), GlyphId::new(10)]);
}

#[test]
fn corrupt_pair_pos_classdef_is_treated_as_identity() {
    // classDef1 carries format 5, which doesn't exist; PairPos format 2
    // fails to decode and the driver must skip the lookup rather than
    // panic, leaving positions at their hmtx-derived advances.
    let coverage = common::coverage_format1(&[2]);
    let bad_class_def = {
        let mut b = Vec::new();
        b.extend(5u16.to_be_bytes());
        b
    };
    let ok_class_def = {
        let mut b = Vec::new();
        b.extend(2u16.to_be_bytes()); // format 2
        b.extend(0u16.to_be_bytes()); // rangeCount
        b
    };
    let subtable = {
        let mut b = Vec::new();
        b.extend(2u16.to_be_bytes()); // format 2
        let cov_offset = 16u16;
        b.extend(cov_offset.to_be_bytes());
        b.extend(0u16.to_be_bytes()); // valueFormat1
        b.extend(0u16.to_be_bytes()); // valueFormat2
        let class_def1_offset = cov_offset + coverage.len() as u16;
        let class_def2_offset = class_def1_offset + bad_class_def.len() as u16;
        b.extend(class_def1_offset.to_be_bytes());
        b.extend(class_def2_offset.to_be_bytes());
        b.extend(0u16.to_be_bytes()); // class1Count
        b.extend(0u16.to_be_bytes()); // class2Count
        b.extend(coverage);
        b.extend(bad_class_def);
        b.extend(ok_class_def);
        b
    };
    let gpos = {
        let lookup_list = {
            let mut b = Vec::new();
            b.extend(1u16.to_be_bytes());
            b.extend(4u16.to_be_bytes());
            b.extend(common::lookup(2, subtable));
            b
        };
        let feature = {
            let mut b = Vec::new();
            b.extend(0u16.to_be_bytes());
            b.extend(1u16.to_be_bytes());
            b.extend(0u16.to_be_bytes());
            b
        };
        let feature_list = {
            let mut b = Vec::new();
            b.extend(1u16.to_be_bytes());
            b.extend(*b"kern");
            b.extend(8u16.to_be_bytes());
            b.extend(feature);
            b
        };
        let default_lang_sys = {
            let mut b = Vec::new();
            b.extend(0u16.to_be_bytes());
            b.extend(0xFFFFu16.to_be_bytes());
            b.extend(1u16.to_be_bytes());
            b.extend(0u16.to_be_bytes());
            b
        };
        let script = {
            let mut b = Vec::new();
            b.extend(4u16.to_be_bytes());
            b.extend(0u16.to_be_bytes());
            b.extend(default_lang_sys);
            b
        };
        let script_list = {
            let mut b = Vec::new();
            b.extend(1u16.to_be_bytes());
            b.extend(*b"DFLT");
            b.extend(8u16.to_be_bytes());
            b.extend(script);
            b
        };
        let mut table = Vec::new();
        table.extend(0x0001_0000u32.to_be_bytes());
        let script_list_offset = 10u16;
        let feature_list_offset = script_list_offset + script_list.len() as u16;
        let lookup_list_offset = feature_list_offset + feature_list.len() as u16;
        table.extend(script_list_offset.to_be_bytes());
        table.extend(feature_list_offset.to_be_bytes());
        table.extend(lookup_list_offset.to_be_bytes());
        table.extend(script_list);
        table.extend(feature_list);
        table.extend(lookup_list);
        table
    };
    let cmap = common::cmap_format12(&[('a' as u32, 2), ('b' as u32, 3)]);
    let font_bytes = common::build_sfnt(&[
        (b"cmap", cmap),
        (b"hhea", common::hhea(4)),
        (b"hmtx", common::hmtx(&[500, 500, 600, 400])),
        (b"GPOS", gpos),
    ]);

    let mut font = Font::parse(&font_bytes).unwrap();
    let request = ShapeRequest {
        codepoints: &['a' as u32, 'b' as u32],
        script: Tag::new(b"latn"),
        chosen_script: Tag::new(b"latn"),
        direction: Direction::LeftToRight,
        normalization: ot_shape::NormalizationMode::Default,
        user_features: &[],
        target_width: None,
    };
    let mut sink = VecSink::default();
    shape(&mut font, &request, &mut sink).unwrap();
    assert_eq!(sink.0.len(), 2);
    assert_eq!(sink.0[0].1.x_advance, 600);
    assert_eq!(sink.0[1].1.x_advance, 400);
    assert!(!font.errors().is_empty(), "the bad classDef format should surface as a recorded font error");
}

#[test]
fn gsub_chain_context_dispatches_nested_single_subst() {
    // Lookup 0: ChainContext format 1, matching glyph 2 in isolation (no
    // backtrack/lookahead), dispatching lookup 1 at the matched position.
    // Lookup 1: Single format 1, glyph 2 -> glyph 9 via a +7 delta.
    let coverage = common::coverage_format1(&[2]);
    let chain_rule = {
        let mut b = Vec::new();
        b.extend(0u16.to_be_bytes()); // backtrackGlyphCount
        b.extend(1u16.to_be_bytes()); // inputGlyphCount (first glyph implied by coverage)
        b.extend(0u16.to_be_bytes()); // lookaheadGlyphCount
        b.extend(1u16.to_be_bytes()); // lookupCount
        b.extend(0u16.to_be_bytes()); // sequenceIndex
        b.extend(1u16.to_be_bytes()); // lookupListIndex
        b
    };
    let rule_set = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // chainRuleCount
        b.extend(4u16.to_be_bytes()); // offset to the one rule, relative to this rule set
        b.extend(chain_rule);
        b
    };
    let chain_context_subtable = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // format
        let cov_offset = 8u16;
        let rule_set_offset = cov_offset + coverage.len() as u16;
        b.extend(cov_offset.to_be_bytes());
        b.extend(1u16.to_be_bytes()); // chainRuleSetCount
        b.extend(rule_set_offset.to_be_bytes());
        b.extend(coverage.clone());
        b.extend(rule_set);
        b
    };
    let single_subst_subtable = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // format
        b.extend(6u16.to_be_bytes()); // coverage offset
        b.extend(7i16.to_be_bytes()); // delta: 2 -> 9
        b.extend(coverage);
        b
    };

    let lookup0 = common::lookup(6, chain_context_subtable);
    let lookup1 = common::lookup(1, single_subst_subtable);
    let lookup_list = {
        let mut b = Vec::new();
        b.extend(2u16.to_be_bytes()); // lookupCount
        let lookup0_offset = 6u16;
        let lookup1_offset = lookup0_offset + lookup0.len() as u16;
        b.extend(lookup0_offset.to_be_bytes());
        b.extend(lookup1_offset.to_be_bytes());
        b.extend(lookup0);
        b.extend(lookup1);
        b
    };
    let feature = {
        let mut b = Vec::new();
        b.extend(0u16.to_be_bytes()); // featureParams
        b.extend(1u16.to_be_bytes()); // lookupIndexCount
        b.extend(0u16.to_be_bytes()); // lookupIndex[0]: the chain context lookup only
        b
    };
    let feature_list = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes());
        b.extend(*b"liga");
        b.extend(8u16.to_be_bytes());
        b.extend(feature);
        b
    };
    let default_lang_sys = {
        let mut b = Vec::new();
        b.extend(0u16.to_be_bytes());
        b.extend(0xFFFFu16.to_be_bytes());
        b.extend(1u16.to_be_bytes());
        b.extend(0u16.to_be_bytes());
        b
    };
    let script = {
        let mut b = Vec::new();
        b.extend(4u16.to_be_bytes());
        b.extend(0u16.to_be_bytes());
        b.extend(default_lang_sys);
        b
    };
    let script_list = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes());
        b.extend(*b"DFLT");
        b.extend(8u16.to_be_bytes());
        b.extend(script);
        b
    };
    let gsub = {
        let mut table = Vec::new();
        table.extend(0x0001_0000u32.to_be_bytes());
        let script_list_offset = 10u16;
        let feature_list_offset = script_list_offset + script_list.len() as u16;
        let lookup_list_offset = feature_list_offset + feature_list.len() as u16;
        table.extend(script_list_offset.to_be_bytes());
        table.extend(feature_list_offset.to_be_bytes());
        table.extend(lookup_list_offset.to_be_bytes());
        table.extend(script_list);
        table.extend(feature_list);
        table.extend(lookup_list);
        table
    };
    let cmap = common::cmap_format12(&[('f' as u32, 2)]);
    let font_bytes = common::build_sfnt(&[
        (b"cmap", cmap),
        (b"hhea", common::hhea(10)),
        (b"hmtx", common::hmtx(&[500; 10])),
        (b"GSUB", gsub),
    ]);

    let glyphs = shape_codepoints(&font_bytes, &['f' as u32], Tag::new(b"latn"), Direction::LeftToRight);
    assert_eq!(glyphs, vec![GlyphId::new(9)]);
}

#[test]
fn user_features_can_disable_a_globally_registered_feature() {
    let ligature_table = {
        let mut b = Vec::new();
        b.extend(4u16.to_be_bytes());
        b.extend(2u16.to_be_bytes());
        b.extend(3u16.to_be_bytes());
        b
    };
    let ligature_set = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes());
        b.extend(4u16.to_be_bytes());
        b.extend(ligature_table);
        b
    };
    let coverage = common::coverage_format1(&[2]);
    let subtable = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes());
        let cov_offset = 8u16;
        let lig_set_offset = cov_offset + coverage.len() as u16;
        b.extend(cov_offset.to_be_bytes());
        b.extend(1u16.to_be_bytes());
        b.extend(lig_set_offset.to_be_bytes());
        b.extend(coverage);
        b.extend(ligature_set);
        b
    };
    let gsub = common::build_layout_table(b"liga", common::lookup(4, subtable));
    let cmap = common::cmap_format12(&[('f' as u32, 2), ('i' as u32, 3)]);
    let font_bytes = common::build_sfnt(&[
        (b"cmap", cmap),
        (b"hhea", common::hhea(5)),
        (b"hmtx", common::hmtx(&[500, 500, 600, 300, 700])),
        (b"GSUB", gsub),
    ]);

    let mut font = Font::parse(&font_bytes).unwrap();
    let request = ShapeRequest {
        codepoints: &['f' as u32, 'i' as u32],
        script: Tag::new(b"latn"),
        chosen_script: Tag::new(b"latn"),
        direction: Direction::LeftToRight,
        normalization: ot_shape::NormalizationMode::Default,
        user_features: &[(Tag::new(b"liga"), false)],
        target_width: None,
    };
    let mut sink = VecSink::default();
    shape(&mut font, &request, &mut sink).unwrap();
    let glyphs: Vec<_> = sink.0.into_iter().map(|(g, _, _)| g).collect();
    assert_eq!(glyphs, vec![GlyphId::new(2), GlyphId::new(3)], "disabling liga should leave 'f' and 'i' unmerged");
}
