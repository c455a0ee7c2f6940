//! Deliverables catalogs: raw tables as fetched, the column schema used to read them,
//! and the normalized [Catalog] the matcher works against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::weapons::{all_base_codes, normalize_name};

/// Table as delivered by a provider. Cells are JSON values so CSV text, workbook
/// numbers, and JSON rows share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Build from row objects; headers are collected in order of first appearance.
    pub fn from_records(records: &[serde_json::Map<String, Value>]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.iter().any(|header| header == key) {
                    headers.push(key.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|header| record.get(header).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column-name synonyms per field, tried in order. Resolved once per fetched table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSchema {
    pub version: u32,
    pub name: &'static [&'static str],
    pub effectiveness: &'static [&'static str],
    pub range: &'static [&'static str],
    pub alt_low: &'static [&'static str],
    pub alt_high: &'static [&'static str],
    pub speed: &'static [&'static str],
    pub dependencies: &'static [&'static str],
}

pub const CATALOG_SCHEMA: CatalogSchema = CatalogSchema {
    version: 1,
    name: &["weapon", "deliverable", "name", "munitions", "title", "deliverable_raw"],
    effectiveness: &["effectiveness_percentage", "effectiveness", "pk"],
    range: &["range", "range_nm"],
    alt_low: &[
        "alt_low_kft",
        "min_alt",
        "min_alt_ft",
        "altitude_min",
        "alt_min",
        "alt(kts)",
        "employment_alt_kft",
        "employment_alt_low_kft",
    ],
    alt_high: &[
        "alt_high_kft",
        "max_alt",
        "max_alt_ft",
        "altitude_max",
        "alt_max",
        "alt(kts)",
        "employment_alt_kft",
        "employment_alt_high_kft",
    ],
    speed: &["speed", "speed_kts", "speed(kts)"],
    dependencies: &["dependencies"],
};

/// Column indices resolved from a table's headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub schema_version: u32,
    pub name: Option<usize>,
    pub effectiveness: Option<usize>,
    pub range: Option<usize>,
    pub alt_low: Option<usize>,
    pub alt_high: Option<usize>,
    pub speed: Option<usize>,
    pub dependencies: Option<usize>,
}

fn pick_column(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms.iter().find_map(|synonym| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(synonym))
    })
}

fn is_textual(value: &Value) -> bool {
    match value {
        Value::String(text) => {
            let text = text.trim();
            !text.is_empty() && text.parse::<f64>().is_err()
        }
        _ => false,
    }
}

/// First column holding non-numeric text, used when no name synonym is present.
fn first_text_column(table: &RawTable) -> Option<usize> {
    (0..table.headers.len()).find(|column| {
        table
            .rows
            .iter()
            .any(|row| row.get(*column).map(is_textual).unwrap_or(false))
    })
}

impl ColumnMapping {
    pub fn resolve(table: &RawTable, schema: &CatalogSchema) -> Self {
        let headers = &table.headers;
        Self {
            schema_version: schema.version,
            name: pick_column(headers, schema.name).or_else(|| first_text_column(table)),
            effectiveness: pick_column(headers, schema.effectiveness),
            range: pick_column(headers, schema.range),
            alt_low: pick_column(headers, schema.alt_low),
            alt_high: pick_column(headers, schema.alt_high),
            speed: pick_column(headers, schema.speed),
            dependencies: pick_column(headers, schema.dependencies),
        }
    }
}

/// One deliverable usable against the routed enemy side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub name_norm: String,
    pub base_codes: BTreeSet<String>,
    /// Per-shot effectiveness as a percentage, 0–100.
    pub effectiveness: Option<f64>,
    pub range: Option<Value>,
    pub alt_low: Option<Value>,
    pub alt_high: Option<Value>,
    pub speed: Option<Value>,
    pub dependencies: Option<String>,
}

impl CatalogEntry {
    /// Per-shot probability in 0–1.
    pub fn probability(&self) -> Option<f64> {
        self.effectiveness.map(|percent| percent / 100.0)
    }
}

/// Parse `40`, `"40"`, `"40%"`, or `"40.5 %"` into a clamped percentage.
pub fn parse_percentage(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| raw.clamp(0.0, 100.0))
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn cell_attribute(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(Value::String(text.trim().to_string())),
        other => Some(other.clone()),
    }
}

/// Normalized, read-only catalog for one (friendly, enemy) pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub mapping: ColumnMapping,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_table(table: &RawTable) -> Self {
        Self::with_schema(table, &CATALOG_SCHEMA)
    }

    pub fn with_schema(table: &RawTable, schema: &CatalogSchema) -> Self {
        let mapping = ColumnMapping::resolve(table, schema);
        let Some(name_column) = mapping.name else {
            tracing::warn!(headers = ?table.headers, "catalog has no deliverable name column");
            return Self {
                mapping,
                entries: Vec::new(),
            };
        };

        let field = |row: usize, column: Option<usize>| column.and_then(|c| table.cell(row, c));

        let entries = (0..table.rows.len())
            .filter_map(|row| {
                let Some(name) = table.cell(row, name_column).and_then(cell_text) else {
                    tracing::debug!(row, "skipping catalog row without a deliverable name");
                    return None;
                };
                Some(CatalogEntry {
                    name_norm: normalize_name(&name),
                    base_codes: all_base_codes(&name),
                    effectiveness: field(row, mapping.effectiveness).and_then(parse_percentage),
                    range: field(row, mapping.range).and_then(cell_attribute),
                    alt_low: field(row, mapping.alt_low).and_then(cell_attribute),
                    alt_high: field(row, mapping.alt_high).and_then(cell_attribute),
                    speed: field(row, mapping.speed).and_then(cell_attribute),
                    dependencies: field(row, mapping.dependencies).and_then(cell_text),
                    name,
                })
            })
            .collect();

        Self { mapping, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(headers: &[&str], rows: Vec<Vec<Value>>) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn mapping_uses_first_synonym_present() {
        let t = table(
            &["Weapon", "range_nm", "Range", "effectiveness_percentage", "speed_kts"],
            vec![],
        );
        let mapping = ColumnMapping::resolve(&t, &CATALOG_SCHEMA);
        assert_eq!(mapping.name, Some(0));
        assert_eq!(mapping.range, Some(2));
        assert_eq!(mapping.effectiveness, Some(3));
        assert_eq!(mapping.speed, Some(4));
        assert_eq!(mapping.dependencies, None);
        assert_eq!(mapping.schema_version, 1);
    }

    #[test]
    fn name_falls_back_to_first_text_column() {
        let t = table(
            &["id", "label", "effectiveness_percentage"],
            vec![vec![json!("7"), json!("AIM-120C AMRAAM"), json!("40")]],
        );
        let catalog = Catalog::from_table(&t);
        assert_eq!(catalog.mapping.name, Some(1));
        assert_eq!(catalog.entries[0].name, "AIM-120C AMRAAM");
        assert!(catalog.entries[0].base_codes.contains("AIM-120"));
        assert_eq!(catalog.entries[0].effectiveness, Some(40.0));
    }

    #[test]
    fn percentages_accept_text_and_clamp() {
        assert_eq!(parse_percentage(&json!("40%")), Some(40.0));
        assert_eq!(parse_percentage(&json!(" 87.5 % ")), Some(87.5));
        assert_eq!(parse_percentage(&json!(140)), Some(100.0));
        assert_eq!(parse_percentage(&json!(-3)), Some(0.0));
        assert_eq!(parse_percentage(&json!("high")), None);
        assert_eq!(parse_percentage(&Value::Null), None);
    }

    #[test]
    fn rows_without_names_are_skipped() {
        let t = table(
            &["weapon", "effectiveness_percentage", "dependencies"],
            vec![
                vec![json!(""), json!(50), json!("GPS")],
                vec![json!("GBU-53/B StormBreaker"), json!(65), json!(" Link-16 ")],
            ],
        );
        let catalog = Catalog::from_table(&t);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries[0].name_norm, "GBU-53-B STORMBREAKER");
        assert_eq!(catalog.entries[0].dependencies.as_deref(), Some("Link-16"));
    }

    #[test]
    fn table_without_text_has_no_entries() {
        let t = table(&["a", "b"], vec![vec![json!(1), json!(2)]]);
        assert!(Catalog::from_table(&t).is_empty());
    }
}
