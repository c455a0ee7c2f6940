//! Friendly asset records and the ingestion adapter that turns loosely shaped input
//! (one record, a list, JSON text, or a bare identifier) into a canonical list.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One friendly asset as provided by the mission-planning pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(
        default,
        alias = "CallSign",
        alias = "call_sign",
        deserialize_with = "deserialize_identifier"
    )]
    pub callsign: Option<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub bc3_jtn: Option<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub merged_tracknumber: Option<String>,
    #[serde(
        default,
        alias = "track_category",
        alias = "category",
        deserialize_with = "deserialize_identifier"
    )]
    pub trackcategory: Option<String>,
    #[serde(default, alias = "aircraftType", deserialize_with = "deserialize_identifier")]
    pub aircraft_type: Option<String>,
    #[serde(
        default,
        alias = "munition_deliverables",
        alias = "weapons",
        deserialize_with = "deserialize_identifier"
    )]
    pub weapon: Option<String>,
    #[serde(
        default,
        alias = "actions",
        alias = "battle_effect",
        deserialize_with = "deserialize_tags"
    )]
    pub matched_actions: BTreeSet<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub ea_deliverables: Option<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub comm_deliverables: Option<String>,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub sensing_deliverables: Option<String>,
}

impl AssetRecord {
    /// Bare-identifier record, used when the caller only names an asset.
    pub fn from_identifier(identifier: &str) -> Self {
        Self {
            id: Some(identifier.trim().to_string()),
            ..Self::default()
        }
    }

    /// Callsign, else id, else a track number, else `UNKNOWN`.
    pub fn identifier(&self) -> &str {
        [
            &self.callsign,
            &self.id,
            &self.bc3_jtn,
            &self.merged_tracknumber,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref().map(str::trim))
        .find(|value| !value.is_empty())
        .unwrap_or("UNKNOWN")
    }

    /// Mission tags, lowercased.
    pub fn tags(&self) -> impl Iterator<Item = String> + '_ {
        self.matched_actions
            .iter()
            .map(|tag| tag.trim().to_lowercase())
    }
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// A tag string or a list of them. Non-string entries are ignored.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(tag)) => vec![tag],
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect())
}

/// Field names and their aliases, canonical name first.
const FIELD_ALIASES: &[&[&str]] = &[
    &["callsign", "CallSign", "call_sign"],
    &["trackcategory", "track_category", "category"],
    &["aircraft_type", "aircraftType"],
    &["weapon", "munition_deliverables", "weapons"],
    &["matched_actions", "actions", "battle_effect"],
];

/// Keep one key per aliased field: the canonical name when present, else the first
/// alias in declaration order.
fn collapse_aliases(mut record: Map<String, Value>) -> Map<String, Value> {
    for names in FIELD_ALIASES {
        let mut present = names.iter().filter(|name| record.contains_key(**name));
        if present.next().is_none() {
            continue;
        }
        let extra: Vec<&str> = present.copied().collect();
        for name in extra {
            record.remove(name);
        }
    }
    record
}

impl AssetRecord {
    /// Resolve a JSON object into a record. Every object yields one, so each asset
    /// keeps its row even when its fields are malformed.
    pub fn from_map(record: Map<String, Value>) -> Self {
        let record = collapse_aliases(record);
        match serde_json::from_value::<Self>(Value::Object(record.clone())) {
            Ok(asset) => asset,
            Err(err) => {
                tracing::warn!(error = %err, "asset record only partially readable");
                Self {
                    callsign: record.get("callsign").and_then(scalar_text),
                    id: record.get("id").and_then(scalar_text),
                    bc3_jtn: record.get("bc3_jtn").and_then(scalar_text),
                    merged_tracknumber: record.get("merged_tracknumber").and_then(scalar_text),
                    ..Self::default()
                }
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Element of a list-shaped asset input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssetItem {
    Record(Map<String, Value>),
    Text(String),
    Other(Value),
}

/// Asset input as received at the boundary. Resolved once by [AssetInput::into_records].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssetInput {
    Many(Vec<AssetItem>),
    One(Map<String, Value>),
    Text(String),
    Other(Value),
}

impl Default for AssetInput {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl AssetInput {
    /// Canonical list of records. Non-record JSON values are dropped.
    pub fn into_records(self) -> Vec<AssetRecord> {
        match self {
            Self::Many(items) => items.into_iter().flat_map(AssetItem::into_records).collect(),
            Self::One(record) => vec![AssetRecord::from_map(record)],
            Self::Text(text) => records_from_text(&text),
            Self::Other(value) => {
                tracing::debug!(?value, "ignoring non-record asset input");
                Vec::new()
            }
        }
    }
}

impl AssetItem {
    fn into_records(self) -> Vec<AssetRecord> {
        match self {
            Self::Record(record) => vec![AssetRecord::from_map(record)],
            Self::Text(text) => records_from_text(&text),
            Self::Other(_) => Vec::new(),
        }
    }
}

/// JSON text yields the records it encodes; anything else is a bare identifier.
fn records_from_text(text: &str) -> Vec<AssetRecord> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(record)) => return vec![AssetRecord::from_map(record)],
            Ok(Value::Array(items)) => {
                return items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(AssetRecord::from_map(record)),
                        _ => None,
                    })
                    .collect();
            }
            _ => {}
        }
    }
    vec![AssetRecord::from_identifier(trimmed)]
}
