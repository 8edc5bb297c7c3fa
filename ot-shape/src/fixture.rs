//! JSON conformance-fixture format, gated behind the `fixtures` feature so
//! the serde dependency stays optional for library consumers that only
//! need the shaping pipeline itself.

use font_types::Tag;
use serde::{Deserialize, Serialize};

use crate::buffer::Direction;
use crate::normalize::NormalizationMode;

#[derive(Debug, Serialize, Deserialize)]
pub struct Fixture {
    pub schema_version: u32,
    pub context: FixtureContext,
    pub input: Vec<u32>,
    pub output: Vec<ExpectedGlyph>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixtureContext {
    pub font: String,
    pub script: String,
    pub language: Option<String>,
    pub dir: FixtureDirection,
    #[serde(default)]
    pub normalization: Option<FixtureNormalization>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub testfont: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureDirection {
    Ltr,
    Rtl,
}

impl From<FixtureDirection> for Direction {
    fn from(dir: FixtureDirection) -> Self {
        match dir {
            FixtureDirection::Ltr => Direction::LeftToRight,
            FixtureDirection::Rtl => Direction::RightToLeft,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureNormalization {
    Default,
    None,
    Composed,
}

impl From<FixtureNormalization> for NormalizationMode {
    fn from(mode: FixtureNormalization) -> Self {
        match mode {
            FixtureNormalization::Default => NormalizationMode::Default,
            FixtureNormalization::None => NormalizationMode::None,
            FixtureNormalization::Composed => NormalizationMode::Composed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpectedGlyph {
    pub g: u16,
    pub cl: u32,
    #[serde(default)]
    pub dx: i32,
    #[serde(default)]
    pub dy: i32,
    pub ax: i32,
    #[serde(default)]
    pub ay: i32,
}

impl FixtureContext {
    pub fn script_tag(&self) -> Tag {
        script_tag_for(&self.script)
    }

    /// Parses `features`' fixture syntax (`+tag`, `-tag`, `tag=0`, `tag=1`,
    /// bare `tag` meaning enabled) into `(tag, enabled)` pairs suitable for
    /// [`crate::driver::ShapeRequest::user_features`]. Entries that aren't
    /// valid four-byte tags are skipped.
    pub fn parsed_features(&self) -> Vec<(Tag, bool)> {
        self.features.iter().filter_map(|f| parse_feature_toggle(f)).collect()
    }
}

fn script_tag_for(script: &str) -> Tag {
    Tag::new(script.as_bytes())
}

fn parse_feature_toggle(spec: &str) -> Option<(Tag, bool)> {
    let (sign_enabled, rest) = match spec.as_bytes().first() {
        Some(b'+') => (true, &spec[1..]),
        Some(b'-') => (false, &spec[1..]),
        _ => (true, spec),
    };
    let mut parts = rest.splitn(2, '=');
    let tag_part = parts.next().unwrap_or(rest);
    let enabled = match parts.next() {
        Some("0") => false,
        Some(_) => true,
        None => sign_enabled,
    };
    Tag::try_new(tag_part.as_bytes()).ok().map(|t| (t, enabled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_fixture() {
        let json = r#"{
            "schema_version": 1,
            "context": {"font": "NotoSansArabic.ttf", "script": "arab", "language": null, "dir": "rtl"},
            "input": [1576, 1610, 1578],
            "output": [{"g": 5, "cl": 0, "ax": 600}]
        }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.input.len(), 3);
        assert_eq!(fixture.context.script_tag(), Tag::new(b"arab"));
    }

    #[test]
    fn parses_feature_toggle_syntax() {
        let ctx = FixtureContext {
            font: "f.ttf".into(),
            script: "latn".into(),
            language: None,
            dir: FixtureDirection::Ltr,
            normalization: None,
            features: vec!["+liga".into(), "-kern".into(), "calt".into(), "dlig=0".into()],
            testfont: None,
        };
        let parsed = ctx.parsed_features();
        assert_eq!(
            parsed,
            vec![
                (Tag::new(b"liga"), true),
                (Tag::new(b"kern"), false),
                (Tag::new(b"calt"), true),
                (Tag::new(b"dlig"), false),
            ]
        );
    }
}
