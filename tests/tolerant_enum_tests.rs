//! Tolerant enum decoding tests.
//!
//! Covers fallback selection, scalar and nullable fields, collections, and
//! encoding back to declared names.

use sbom_manifest::codec::{self, TolerantEnum};
use sbom_manifest::tolerant_enum;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

// ============================================================================
// Test Enums
// ============================================================================

tolerant_enum! {
    /// `Unknown` wins even when it is neither -1 nor 0.
    pub enum NamedUnknown {
        Zero = 0 => "Zero",
        MinusOne = -1 => "MinusOne",
        Unknown = 7 => "Unknown",
    }
}

tolerant_enum! {
    pub enum MinusOneFallback {
        First = 3 => "First",
        Zero = 0 => "Zero",
        NotSet = -1 => "NotSet",
    }
}

tolerant_enum! {
    pub enum ZeroFallback {
        First = 3 => "First",
        Empty = 0 => "Empty",
        Other = 5 => "Other",
    }
}

tolerant_enum! {
    pub enum FirstFallback {
        Alpha = 10 => "Alpha",
        Beta = 20 => "Beta",
    }
}

tolerant_enum! {
    pub enum Color {
        Unknown = -1 => "Unknown",
        Red = 0 => "Red",
        Green = 1 => "Green",
        Blue = 2 => "Blue",
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Envelope {
    color: Color,
    #[serde(with = "sbom_manifest::codec::nullable")]
    maybe: Option<Color>,
    list: Vec<Color>,
    set: HashSet<Color>,
    ordered: Vec<FirstFallback>,
}

/// A collection type exposing only `FromIterator`.
#[derive(Debug, Default)]
struct Palette(Vec<Color>);

impl FromIterator<Color> for Palette {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn palette<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Palette, D::Error> {
    codec::collection::deserialize::<D, Color, Palette>(deserializer)
}

fn queue<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<VecDeque<Color>, D::Error> {
    codec::collection::deserialize::<D, Color, _>(deserializer)
}

#[derive(Debug, Deserialize)]
struct PaletteHolder {
    #[serde(deserialize_with = "palette", default)]
    palette: Palette,
    #[serde(deserialize_with = "queue", default)]
    queue: VecDeque<Color>,
}

fn decode<T: serde::de::DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).unwrap()
}

// ============================================================================
// Fallback Selection Tests
// ============================================================================

mod fallback {
    use super::*;

    #[test]
    fn test_fallback_priority() {
        assert_eq!(NamedUnknown::fallback(), NamedUnknown::Unknown);
        assert_eq!(MinusOneFallback::fallback(), MinusOneFallback::NotSet);
        assert_eq!(ZeroFallback::fallback(), ZeroFallback::Empty);
        assert_eq!(FirstFallback::fallback(), FirstFallback::Alpha);
    }

    #[test]
    fn test_default_is_fallback() {
        assert_eq!(Color::default(), Color::Unknown);
        assert_eq!(FirstFallback::default(), FirstFallback::Alpha);
    }

    #[test]
    fn test_compute_fallback_matches_cached() {
        assert_eq!(codec::compute_fallback::<ZeroFallback>(), ZeroFallback::fallback());
    }
}

// ============================================================================
// Scalar Decoding Tests
// ============================================================================

mod scalar {
    use super::*;

    #[test]
    fn test_every_member_decodes_by_name_and_value() {
        for member in Color::MEMBERS {
            let by_name: Color = decode(&format!("\"{}\"", member.name()));
            assert_eq!(by_name, *member);
            let by_value: Color = decode(&member.value().to_string());
            assert_eq!(by_value, *member);
        }
    }

    #[test]
    fn test_name_is_case_insensitive() {
        assert_eq!(decode::<Color>("\"gReEn\""), Color::Green);
        assert_eq!(decode::<Color>("\"BLUE\""), Color::Blue);
    }

    #[test]
    fn test_numeric_string_decodes_by_value() {
        assert_eq!(decode::<Color>("\"2\""), Color::Blue);
    }

    #[test]
    fn test_unknown_tokens_fall_back() {
        assert_eq!(decode::<Color>("\"Purple\""), Color::Unknown);
        assert_eq!(decode::<Color>("999"), Color::Unknown);
        assert_eq!(decode::<Color>("true"), Color::Unknown);
        assert_eq!(decode::<Color>("1.5"), Color::Unknown);
        assert_eq!(decode::<Color>("null"), Color::Unknown);
        assert_eq!(decode::<Color>("\"\""), Color::Unknown);
        assert_eq!(decode::<Color>("[1, 2]"), Color::Unknown);
        assert_eq!(decode::<FirstFallback>("\"Gamma\""), FirstFallback::Alpha);
    }

    #[test]
    fn test_malformed_json_still_fails() {
        assert!(serde_json::from_str::<Color>("\"unterminated").is_err());
    }

    #[test]
    fn test_from_str_never_fails() {
        assert_eq!("red".parse::<Color>(), Ok(Color::Red));
        assert_eq!("no such".parse::<Color>(), Ok(Color::Unknown));
    }

    #[test]
    fn test_encoding_emits_declared_name() {
        assert_eq!(serde_json::to_string(&Color::Green).unwrap(), "\"Green\"");
        let round: Color = decode(&serde_json::to_string(&Color::Blue).unwrap());
        assert_eq!(round, Color::Blue);
        assert_eq!(Color::Red.to_string(), "Red");
    }
}

// ============================================================================
// Nullable Field Tests
// ============================================================================

mod nullable {
    use super::*;

    #[test]
    fn test_null_and_empty_decode_to_none() {
        let envelope: Envelope = decode(r#"{"maybe": null}"#);
        assert_eq!(envelope.maybe, None);
        let envelope: Envelope = decode(r#"{"maybe": ""}"#);
        assert_eq!(envelope.maybe, None);
        let envelope: Envelope = decode("{}");
        assert_eq!(envelope.maybe, None);
    }

    #[test]
    fn test_present_values_decode() {
        let envelope: Envelope = decode(r#"{"maybe": "blue"}"#);
        assert_eq!(envelope.maybe, Some(Color::Blue));
        let envelope: Envelope = decode(r#"{"maybe": "Mauve"}"#);
        assert_eq!(envelope.maybe, Some(Color::Unknown));
        let envelope: Envelope = decode(r#"{"maybe": 0}"#);
        assert_eq!(envelope.maybe, Some(Color::Red));
    }

    #[test]
    fn test_none_encodes_as_null() {
        let json = serde_json::to_value(Envelope::default()).unwrap();
        assert!(json["maybe"].is_null());
        let json = serde_json::to_value(Envelope {
            maybe: Some(Color::Green),
            ..Envelope::default()
        })
        .unwrap();
        assert_eq!(json["maybe"], "Green");
    }
}

// ============================================================================
// Collection Tests
// ============================================================================

mod collections {
    use super::*;

    #[test]
    fn test_standard_collections_decode_element_wise() {
        let envelope: Envelope = decode(
            r#"{
                "color": "red",
                "list": ["Red", "nope", 2, null],
                "set": ["green", "GREEN", 42],
                "ordered": ["Beta", "x"]
            }"#,
        );
        assert_eq!(envelope.color, Color::Red);
        assert_eq!(
            envelope.list,
            vec![Color::Red, Color::Unknown, Color::Blue, Color::Unknown]
        );
        assert_eq!(
            envelope.set,
            [Color::Green, Color::Unknown].into_iter().collect()
        );
        assert_eq!(envelope.ordered, vec![FirstFallback::Beta, FirstFallback::Alpha]);
    }

    #[test]
    fn test_custom_from_iterator_collection() {
        let holder: PaletteHolder =
            decode(r#"{"palette": ["Green", "Chartreuse", 0], "queue": ["blue"]}"#);
        assert_eq!(holder.palette.0, vec![Color::Green, Color::Unknown, Color::Red]);
        assert_eq!(holder.queue, VecDeque::from(vec![Color::Blue]));
    }

    #[test]
    fn test_null_collection_is_empty() {
        let holder: PaletteHolder = decode(r#"{"palette": null}"#);
        assert!(holder.palette.0.is_empty());
        assert!(holder.queue.is_empty());
    }

    #[test]
    fn test_collection_encodes_names() {
        let json = serde_json::to_string(&vec![Color::Blue, Color::Unknown]).unwrap();
        assert_eq!(json, r#"["Blue","Unknown"]"#);
    }
}
