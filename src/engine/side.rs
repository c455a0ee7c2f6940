//! Side (domain) classification for targets and friendly assets.
//!
//! Classification is a pure lookup over a fixed schema: explicit field aliases first,
//! then looser key matches, then annotated text, then a bounded descent into nested
//! records. Nothing here recurses without a depth limit.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::asset::AssetRecord;

/// Operating environment used to route catalog lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Air,
    Land,
    Surface,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Land => "land",
            Self::Surface => "surface",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SURFACE_MARKERS: &[&str] = &["surf", "surface", "sea", "marit", "naval"];

/// Exact target keys (spaces and underscores removed, lowercased), in priority order.
const TARGET_CATEGORY_KEYS: &[&str] = &[
    "trackcat",
    "trackcategory",
    "trackcategoryenemy",
    "entitytrackcategory",
];

/// Deepest nesting level searched inside a structured target.
const MAX_TARGET_DEPTH: usize = 3;

static TRACK_CAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btrack\s*cat\s*:\s*([A-Za-z_()]+)").expect("track category regex")
});

/// Classify a raw category value: `air`, `land`/`ground`, or any surface marker.
pub fn classify_category(raw: &str) -> Option<Side> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if text.contains("air") {
        return Some(Side::Air);
    }
    if text.contains("land") || text.contains("ground") {
        return Some(Side::Land);
    }
    if SURFACE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return Some(Side::Surface);
    }
    None
}

/// Classify free text carrying a `Track Cat: <value>` marker.
pub fn classify_annotated_text(text: &str) -> Option<Side> {
    let captures = TRACK_CAT_RE.captures(text)?;
    classify_category(captures.get(1)?.as_str())
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn classify_record(record: &Map<String, Value>, depth: usize) -> Option<Side> {
    for alias in TARGET_CATEGORY_KEYS {
        let hit = record
            .iter()
            .find(|(key, _)| normalize_key(key) == *alias)
            .and_then(|(_, value)| value.as_str());
        if let Some(side) = hit.and_then(classify_category) {
            return Some(side);
        }
    }

    let loose = record.iter().find_map(|(key, value)| {
        let key = normalize_key(key);
        if key.contains("track") && key.contains("cat") {
            value.as_str().and_then(classify_category)
        } else {
            None
        }
    });
    if loose.is_some() {
        return loose;
    }

    let annotated = record
        .values()
        .filter_map(Value::as_str)
        .find_map(classify_annotated_text);
    if annotated.is_some() {
        return annotated;
    }

    if depth >= MAX_TARGET_DEPTH {
        return None;
    }
    record
        .values()
        .filter(|value| value.is_object() || value.is_array())
        .find_map(|value| classify_value(value, depth + 1))
}

fn classify_value(value: &Value, depth: usize) -> Option<Side> {
    match value {
        Value::Object(record) => classify_record(record, depth),
        Value::Array(items) if depth < MAX_TARGET_DEPTH => items
            .iter()
            .find_map(|item| classify_value(item, depth + 1)),
        Value::String(text) => classify_annotated_text(text),
        _ => None,
    }
}

/// Classify a target given as a record, list of records, or annotated string.
pub fn classify_target(target: &Value) -> Option<Side> {
    classify_value(target, 0)
}

/// Classify a friendly asset: explicit category first, then `aircraft_type` implies air.
pub fn classify_friendly(asset: &AssetRecord) -> Option<Side> {
    if let Some(side) = asset.trackcategory.as_deref().and_then(classify_category) {
        return Some(side);
    }
    match asset.aircraft_type.as_deref() {
        Some(kind) if !kind.trim().is_empty() => Some(Side::Air),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_rules_follow_marker_order() {
        assert_eq!(classify_category("Air"), Some(Side::Air));
        assert_eq!(classify_category("air_to_air"), Some(Side::Air));
        assert_eq!(classify_category("GROUND"), Some(Side::Land));
        assert_eq!(classify_category("land"), Some(Side::Land));
        assert_eq!(classify_category("Maritime"), Some(Side::Surface));
        assert_eq!(classify_category("naval"), Some(Side::Surface));
        assert_eq!(classify_category("Subsurface"), Some(Side::Surface));
        assert_eq!(classify_category("space"), None);
        assert_eq!(classify_category("   "), None);
    }

    #[test]
    fn annotated_track_string_classifies_surface() {
        let text = "43826 (CallSign: None, Track Cat: Surface, Track ID: Hostile)";
        assert_eq!(classify_target(&json!(text)), Some(Side::Surface));
    }

    #[test]
    fn text_without_marker_is_undetermined() {
        assert_eq!(classify_target(&json!("hostile contact bearing 270")), None);
    }

    #[test]
    fn record_aliases_tolerate_spacing_and_case() {
        let target = json!({"id": 43826, "Track Cat": "Surface", "Track ID": "Hostile"});
        assert_eq!(classify_target(&target), Some(Side::Surface));

        let target = json!({"entity_track_category": "Air"});
        assert_eq!(classify_target(&target), Some(Side::Air));
    }

    #[test]
    fn loose_track_category_key_is_accepted() {
        let target = json!({"primary_track_cat_code": "ground"});
        assert_eq!(classify_target(&target), Some(Side::Land));
    }

    #[test]
    fn nested_records_and_lists_are_searched_with_bounded_depth() {
        let target = json!([{"note": "none"}, {"entity": {"trackcategory": "air"}}]);
        assert_eq!(classify_target(&target), Some(Side::Air));

        let too_deep = json!({"a": {"b": {"c": {"d": {"trackcategory": "air"}}}}});
        assert_eq!(classify_target(&too_deep), None);
    }

    #[test]
    fn friendly_with_only_aircraft_type_is_air() {
        let asset = AssetRecord {
            aircraft_type: Some("F-A-22".to_string()),
            ..AssetRecord::default()
        };
        assert_eq!(classify_friendly(&asset), Some(Side::Air));
    }

    #[test]
    fn friendly_explicit_category_wins_over_aircraft_type() {
        let asset = AssetRecord {
            trackcategory: Some("surface".to_string()),
            aircraft_type: Some("MH-60R".to_string()),
            ..AssetRecord::default()
        };
        assert_eq!(classify_friendly(&asset), Some(Side::Surface));
        assert_eq!(classify_friendly(&AssetRecord::default()), None);
    }
}
