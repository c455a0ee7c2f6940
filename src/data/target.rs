//! Hostile target input: structured records or annotated track strings such as
//! `44875 (CallSign: None, Track Cat: Air, Track ID: Hostile, Aircraft Type: None)`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TRACK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\s*\((.*)\)").expect("track line regex"));

static CALLSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CallSign\s*:\s*([^,)\n]+)").expect("callsign regex"));

static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)").expect("leading digits regex"));

static ANY_TRACK_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{5})\b").expect("track number regex"));

/// Key/value pairs of an annotated track string. The leading number is kept as `ID`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub fields: BTreeMap<String, String>,
}

impl TrackInfo {
    /// Parse `"<number> (Key: Value, ...)"`. Segments without a colon are skipped.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = TRACK_LINE_RE.captures(line)?;
        let mut fields: BTreeMap<String, String> = caps[2]
            .split(',')
            .filter_map(|pair| pair.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        fields.insert("ID".to_string(), caps[1].to_string());
        Some(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Structured view for classification.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        )
    }
}

fn present(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(value)
    }
}

/// Display label for a target line: callsign when known, else a five-digit track number.
pub fn target_label_from_text(line: &str) -> Option<String> {
    if let Some(caps) = CALLSIGN_RE.captures(line) {
        if let Some(callsign) = present(&caps[1]) {
            return Some(callsign.to_string());
        }
    }
    if let Some(caps) = LEADING_DIGITS_RE.captures(line) {
        let digits = &caps[1];
        if digits.len() >= 5 {
            return Some(digits[..5].to_string());
        }
    }
    ANY_TRACK_NUMBER_RE
        .captures(line)
        .map(|caps| caps[1].to_string())
}

const LABEL_KEYS: &[&str] = &["callsign", "name", "tracknumber", "id"];

fn label_key(key: &str) -> String {
    key.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Display label for any target input shape.
pub fn target_label(target: &Value) -> Option<String> {
    match target {
        Value::String(text) => target_label_from_text(text),
        Value::Object(record) => LABEL_KEYS.iter().find_map(|wanted| {
            record
                .iter()
                .filter(|(key, _)| label_key(key) == *wanted)
                .find_map(|(_, value)| match value {
                    Value::String(text) => present(text).map(str::to_string),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
        }),
        Value::Array(items) => items.iter().find_map(target_label),
        _ => None,
    }
}

/// Normalized target value: annotated track strings become records, everything else
/// passes through untouched. Free text without a track line stays a string.
pub fn normalize_target(target: &Value) -> Value {
    match target {
        Value::String(text) => TrackInfo::parse(text)
            .map(|info| {
                let mut record = info.to_value();
                if let Value::Object(map) = &mut record {
                    map.insert("raw".to_string(), Value::String(text.clone()));
                }
                record
            })
            .unwrap_or_else(|| target.clone()),
        other => other.clone(),
    }
}
