//! Hand-built minimal SFNT fixtures for the conformance tests: just enough
//! of the table directory, cmap, hhea/hmtx and GSUB/GPOS graph for the
//! driver to exercise a specific lookup type end to end.

pub fn build_sfnt(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let header_len = 12 + tables.len() * 16;
    let mut offset = header_len;
    let mut records = Vec::new();
    let mut blob = Vec::new();
    for (tag, data) in tables {
        records.push((*tag, offset, data.len()));
        blob.extend_from_slice(data);
        offset += data.len();
    }
    let mut file = Vec::new();
    file.extend(0x0001_0000u32.to_be_bytes());
    file.extend((tables.len() as u16).to_be_bytes());
    file.extend(0u16.to_be_bytes());
    file.extend(0u16.to_be_bytes());
    file.extend(0u16.to_be_bytes());
    for (tag, off, len) in &records {
        file.extend(tag.iter());
        file.extend(0u32.to_be_bytes()); // checksum, unchecked by the reader
        file.extend((*off as u32).to_be_bytes());
        file.extend((*len as u32).to_be_bytes());
    }
    file.extend(blob);
    file
}

pub fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend(1u16.to_be_bytes());
    b.extend((glyphs.len() as u16).to_be_bytes());
    for &g in glyphs {
        b.extend(g.to_be_bytes());
    }
    b
}

/// A one-script, one-feature, one-lookup GSUB/GPOS graph: `script` activates
/// `feature_tag` by default, which runs `lookup_bytes` (a single lookup's
/// full encoded body, starting at its type field).
pub fn build_layout_table(feature_tag: &[u8; 4], lookup_bytes: Vec<u8>) -> Vec<u8> {
    let lookup_list = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // lookup count
        b.extend(4u16.to_be_bytes()); // offset to lookup 0
        b.extend(lookup_bytes);
        b
    };
    let feature = {
        let mut b = Vec::new();
        b.extend(0u16.to_be_bytes()); // featureParams
        b.extend(1u16.to_be_bytes()); // lookupIndexCount
        b.extend(0u16.to_be_bytes()); // lookupIndex[0]
        b
    };
    let feature_list = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // count
        b.extend(feature_tag.iter());
        b.extend(8u16.to_be_bytes()); // offset to feature
        b.extend(feature);
        b
    };
    let default_lang_sys = {
        let mut b = Vec::new();
        b.extend(0u16.to_be_bytes()); // lookupOrder
        b.extend(0xFFFFu16.to_be_bytes()); // requiredFeatureIndex
        b.extend(1u16.to_be_bytes()); // featureIndexCount
        b.extend(0u16.to_be_bytes()); // featureIndex[0]
        b
    };
    let script = {
        let mut b = Vec::new();
        b.extend(4u16.to_be_bytes()); // defaultLangSysOffset
        b.extend(0u16.to_be_bytes()); // langSysCount
        b.extend(default_lang_sys);
        b
    };
    let script_list = {
        let mut b = Vec::new();
        b.extend(1u16.to_be_bytes()); // count
        b.extend(*b"DFLT");
        b.extend(8u16.to_be_bytes()); // offset to script
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
}

pub fn lookup(lookup_type: u16, subtable: Vec<u8>) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend(lookup_type.to_be_bytes());
    b.extend(0u16.to_be_bytes()); // flags
    b.extend(1u16.to_be_bytes()); // subtable count
    b.extend(8u16.to_be_bytes()); // offset to subtable
    b.extend(subtable);
    b
}

pub fn cmap_format12(entries: &[(u32, u32)]) -> Vec<u8> {
    let mut sub = Vec::new();
    sub.extend(12u16.to_be_bytes());
    sub.extend(0u16.to_be_bytes());
    sub.extend(0u32.to_be_bytes());
    sub.extend(0u32.to_be_bytes());
    sub.extend((entries.len() as u32).to_be_bytes());
    for &(codepoint, glyph) in entries {
        sub.extend(codepoint.to_be_bytes());
        sub.extend(codepoint.to_be_bytes());
        sub.extend(glyph.to_be_bytes());
    }
    let mut table = Vec::new();
    table.extend(0u16.to_be_bytes()); // version
    table.extend(1u16.to_be_bytes()); // numTables
    table.extend(3u16.to_be_bytes()); // platformID
    table.extend(10u16.to_be_bytes()); // encodingID
    table.extend(12u32.to_be_bytes()); // offset to subtable
    table.extend(sub);
    table
}

pub fn hhea(number_of_h_metrics: u16) -> Vec<u8> {
    let mut b = vec![0u8; 36];
    b[34..36].copy_from_slice(&number_of_h_metrics.to_be_bytes());
    b
}

pub fn hmtx(advances: &[u16]) -> Vec<u8> {
    let mut b = Vec::new();
    for &w in advances {
        b.extend(w.to_be_bytes());
        b.extend(0i16.to_be_bytes());
    }
    b
}
