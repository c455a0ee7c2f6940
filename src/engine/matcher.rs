//! Binds parsed weapon tokens to catalog entries.
//!
//! Base-code membership is tried first, then a substring match on normalized names.
//! When several entries qualify the winner is the highest effectiveness, then the
//! lexically smallest normalized name, then the earliest row.

use std::cmp::Ordering;

use serde::Serialize;

use crate::data::catalog::{Catalog, CatalogEntry};
use crate::engine::weapons::WeaponToken;

/// How a token found its catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    BaseCode,
    Substring,
}

/// One token and the entry it bound to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub token: WeaponToken,
    pub entry: Option<CatalogEntry>,
    pub kind: Option<MatchKind>,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        self.entry.is_some()
    }

    /// Per-shot probability of the bound entry, 0–1.
    pub fn probability(&self) -> Option<f64> {
        self.entry.as_ref().and_then(CatalogEntry::probability)
    }
}

fn effectiveness_key(entry: &CatalogEntry) -> f64 {
    entry.effectiveness.unwrap_or(f64::NEG_INFINITY)
}

/// `Less` means `a` wins.
fn preference(a: (usize, &CatalogEntry), b: (usize, &CatalogEntry)) -> Ordering {
    effectiveness_key(b.1)
        .total_cmp(&effectiveness_key(a.1))
        .then_with(|| a.1.name_norm.cmp(&b.1.name_norm))
        .then_with(|| a.0.cmp(&b.0))
}

fn best_of<'c>(
    candidates: impl Iterator<Item = (usize, &'c CatalogEntry)>,
) -> Option<&'c CatalogEntry> {
    candidates.min_by(|a, b| preference(*a, *b)).map(|(_, entry)| entry)
}

/// Best entry for one token, with the rule that selected it.
pub fn find_entry<'c>(
    token: &WeaponToken,
    catalog: &'c Catalog,
    min_substring_len: usize,
) -> Option<(&'c CatalogEntry, MatchKind)> {
    if let Some(base) = token.base_code.as_deref() {
        let hit = best_of(
            catalog
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.base_codes.contains(base)),
        );
        if let Some(entry) = hit {
            return Some((entry, MatchKind::BaseCode));
        }
    }

    let needle = token.name_norm.as_str();
    if needle.chars().count() < min_substring_len {
        return None;
    }
    best_of(
        catalog
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.name_norm.contains(needle)),
    )
    .map(|entry| (entry, MatchKind::Substring))
}

/// Match every token in order. Unmatched tokens are kept with no entry.
pub fn match_tokens(
    tokens: &[WeaponToken],
    catalog: &Catalog,
    min_substring_len: usize,
) -> Vec<MatchResult> {
    tokens
        .iter()
        .map(|token| match find_entry(token, catalog, min_substring_len) {
            Some((entry, kind)) => MatchResult {
                token: token.clone(),
                entry: Some(entry.clone()),
                kind: Some(kind),
            },
            None => {
                tracing::debug!(weapon = %token.name_norm, "no catalog entry for weapon");
                MatchResult {
                    token: token.clone(),
                    entry: None,
                    kind: None,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::RawTable;
    use crate::engine::weapons::parse_loadout;
    use serde_json::json;

    fn catalog(rows: &[(&str, Option<f64>)]) -> Catalog {
        let records: Vec<_> = rows
            .iter()
            .map(|(name, pk)| {
                let mut record = serde_json::Map::new();
                record.insert("weapon".to_string(), json!(name));
                record.insert(
                    "effectiveness_percentage".to_string(),
                    pk.map(|value| json!(value)).unwrap_or(serde_json::Value::Null),
                );
                record
            })
            .collect();
        Catalog::from_table(&RawTable::from_records(&records))
    }

    fn token(text: &str) -> WeaponToken {
        parse_loadout(text, 999).remove(0)
    }

    #[test]
    fn base_code_hits_pick_highest_effectiveness() {
        let catalog = catalog(&[("AIM-120 TRAINER", Some(10.0)), ("AIM-120C AMRAAM", Some(40.0))]);
        let (entry, kind) = find_entry(&token("4XAIM-120"), &catalog, 3).expect("match");
        assert_eq!(kind, MatchKind::BaseCode);
        assert_eq!(entry.name, "AIM-120C AMRAAM");
    }

    #[test]
    fn tie_break_prefers_effectiveness_then_name() {
        let catalog = catalog(&[
            ("GBU-53 ZULU", Some(60.0)),
            ("GBU-53 ALPHA", Some(60.0)),
            ("GBU-53/B", Some(55.0)),
        ]);
        let (entry, _) = find_entry(&token("GBU-53"), &catalog, 3).expect("match");
        assert_eq!(entry.name, "GBU-53 ALPHA");
    }

    #[test]
    fn tie_break_is_independent_of_row_order() {
        let forward = catalog(&[("AIM-9X", Some(50.0)), ("AIM-9M", Some(50.0))]);
        let reverse = catalog(&[("AIM-9M", Some(50.0)), ("AIM-9X", Some(50.0))]);
        let a = find_entry(&token("AIM-9"), &forward, 3).map(|(e, _)| e.name.clone());
        let b = find_entry(&token("AIM-9"), &reverse, 3).map(|(e, _)| e.name.clone());
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("AIM-9M"));
    }

    #[test]
    fn missing_effectiveness_ranks_last() {
        let catalog = catalog(&[("MK-84 LDGP", None), ("MK-84 AIR", Some(20.0))]);
        let (entry, _) = find_entry(&token("MK-84"), &catalog, 3).expect("match");
        assert_eq!(entry.name, "MK-84 AIR");
    }

    #[test]
    fn substring_fallback_respects_minimum_length() {
        let catalog = catalog(&[("HARPOON BLOCK II", Some(70.0)), ("GUN", Some(5.0))]);
        let (entry, kind) = find_entry(&token("2XHarpoon"), &catalog, 3).expect("match");
        assert_eq!(kind, MatchKind::Substring);
        assert_eq!(entry.name, "HARPOON BLOCK II");
        assert!(find_entry(&token("GU"), &catalog, 3).is_none());
    }

    #[test]
    fn unmatched_tokens_are_kept_in_order() {
        let catalog = catalog(&[("AIM-120C", Some(40.0))]);
        let tokens = parse_loadout("2XAIM-9, 4XAIM-120", 999);
        let results = match_tokens(&tokens, &catalog, 3);
        assert_eq!(results.len(), 2);
        assert!(!results[0].is_matched());
        assert!(results[1].is_matched());
        assert_eq!(results[1].probability(), Some(0.4));
    }
}
