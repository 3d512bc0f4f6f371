//! Size descriptors and the options they expand to.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Label shown when a product has no selectable size.
pub const NOT_APPLICABLE: &str = "N/A";

const FIXED_KEYWORD: &str = "s a xl";
const FIXED_LABELS: [&str; 4] = ["S", "M", "L", "XL"];

/// Widest numeric range accepted; anything wider is treated as free text.
pub const MAX_RANGE_WIDTH: u32 = 500;

static NUMERIC_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*a\s*(\d+)").expect("numeric range pattern"));

/// Size field of a product, classified once when the catalog is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SizeDescriptor {
    /// `S a XL` style keyword.
    FixedRange,
    /// `<lo> a <hi>`, inclusive.
    NumericRange { lo: u32, hi: u32 },
    ExplicitList(Vec<String>),
    #[default]
    None,
}

impl SizeDescriptor {
    pub fn parse(text: &str) -> Self {
        if text.to_lowercase().contains(FIXED_KEYWORD) {
            return Self::FixedRange;
        }
        NUMERIC_RANGE
            .captures(text)
            .and_then(|caps| {
                let lo: u32 = caps[1].parse().ok()?;
                let hi: u32 = caps[2].parse().ok()?;
                (hi.saturating_sub(lo) < MAX_RANGE_WIDTH).then_some(Self::NumericRange { lo, hi })
            })
            .unwrap_or(Self::None)
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Array(items) => Self::ExplicitList(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            _ => Self::None,
        }
    }

    /// Selectable options, in display order. Never empty.
    pub fn resolve(&self) -> Vec<String> {
        let options: Vec<String> = match self {
            Self::FixedRange => FIXED_LABELS.iter().map(|s| s.to_string()).collect(),
            Self::NumericRange { lo, hi } => (*lo..=*hi).map(|n| n.to_string()).collect(),
            Self::ExplicitList(labels) => labels.clone(),
            Self::None => Vec::new(),
        };
        if options.is_empty() { vec![NOT_APPLICABLE.to_string()] } else { options }
    }

    /// Text as typed into the admin form.
    pub fn display_text(&self) -> String {
        match self {
            Self::FixedRange => "S a XL".to_string(),
            Self::NumericRange { lo, hi } => format!("{lo} a {hi}"),
            Self::ExplicitList(labels) if !labels.is_empty() => labels.join(", "),
            _ => NOT_APPLICABLE.to_string(),
        }
    }
}

impl Serialize for SizeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ExplicitList(labels) => labels.serialize(serializer),
            Self::None => serializer.serialize_none(),
            other => serializer.serialize_str(&other.display_text()),
        }
    }
}

impl<'de> Deserialize<'de> for SizeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(Self::from_value).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_keyword_any_case() {
        for text in ["S a XL", "s a xl", "Tallas S A XL disponibles"] {
            assert_eq!(SizeDescriptor::parse(text).resolve(), vec!["S", "M", "L", "XL"]);
        }
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let sizes = SizeDescriptor::parse("38 a 42").resolve();
        assert_eq!(sizes, vec!["38", "39", "40", "41", "42"]);
        assert_eq!(SizeDescriptor::parse("1a3").resolve().len(), 3);
        assert_eq!(SizeDescriptor::parse("7 a 7").resolve(), vec!["7"]);
    }

    #[test]
    fn test_range_cardinality() {
        for lo in 0..12u32 {
            for hi in lo..lo + 6 {
                let sizes = SizeDescriptor::parse(&format!("{lo} a {hi}")).resolve();
                assert_eq!(sizes.len() as u32, hi - lo + 1);
                assert_eq!(sizes.first(), Some(&lo.to_string()));
                assert_eq!(sizes.last(), Some(&hi.to_string()));
            }
        }
    }

    #[test]
    fn test_inverted_range_falls_back() {
        assert_eq!(SizeDescriptor::parse("9 a 2"), SizeDescriptor::NumericRange { lo: 9, hi: 2 });
        assert_eq!(SizeDescriptor::parse("9 a 2").resolve(), vec![NOT_APPLICABLE]);
    }

    #[test]
    fn test_oversized_range_is_not_expanded() {
        assert_eq!(SizeDescriptor::parse("0 a 4000000000"), SizeDescriptor::None);
        assert_eq!(SizeDescriptor::parse("1 a 1000"), SizeDescriptor::None);
        assert_eq!(SizeDescriptor::parse("1 a 500").resolve().len(), 500);
    }

    #[test]
    fn test_other_text_is_not_applicable() {
        assert_eq!(SizeDescriptor::parse("única"), SizeDescriptor::None);
        assert_eq!(SizeDescriptor::parse("N/A").resolve(), vec![NOT_APPLICABLE]);
    }

    #[test]
    fn test_from_json_shapes() {
        let list: SizeDescriptor = serde_json::from_value(json!(["Personal", "Familiar"])).unwrap();
        assert_eq!(list.resolve(), vec!["Personal", "Familiar"]);
        let numbers: SizeDescriptor = serde_json::from_value(json!([36, 38])).unwrap();
        assert_eq!(numbers.resolve(), vec!["36", "38"]);
        let empty: SizeDescriptor = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.resolve(), vec![NOT_APPLICABLE]);
        let null: SizeDescriptor = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null, SizeDescriptor::None);
    }
}
