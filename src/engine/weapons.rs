//! Loadout parsing: `"2XAIM-9, 4XAIM-120, 4XGBU-53 SD"` into quantity/name/base-code tokens.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static SEGMENT_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,/]+").expect("segment split regex"));

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\s*[xX]\s*(.+?)\s*$").expect("quantity regex"));

static BASE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]{2,4})[-\s]?([0-9]{1,3})").expect("base code regex"));

/// One weapon entry of a loadout string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponToken {
    pub quantity: u32,
    pub name: String,
    pub name_norm: String,
    pub base_code: Option<String>,
}

/// Trim, collapse whitespace, uppercase, and read `/` as a hyphen.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .replace('/', "-")
}

/// Base codes in normalized text. A number running into a fourth digit is not a code,
/// so `AIM-1200` yields nothing rather than `AIM-120`.
fn base_codes_in(normalized: &str) -> impl Iterator<Item = String> + '_ {
    BASE_CODE_RE.captures_iter(normalized).filter_map(|caps| {
        let end = caps.get(0)?.end();
        if normalized[end..].starts_with(|ch: char| ch.is_ascii_digit()) {
            return None;
        }
        Some(format!("{}-{}", &caps[1], &caps[2]))
    })
}

/// First base code in the text, rendered `PREFIX-NUMBER`.
pub fn base_code(text: &str) -> Option<String> {
    base_codes_in(&normalize_name(text)).next()
}

/// Every base code found in a catalog deliverable name.
pub fn all_base_codes(text: &str) -> BTreeSet<String> {
    base_codes_in(&normalize_name(text)).collect()
}

/// Split a loadout into tokens. Missing, zero, or unparseable quantities become 1;
/// quantities above `max_quantity` are clamped.
pub fn parse_loadout(loadout: &str, max_quantity: u32) -> Vec<WeaponToken> {
    let max_quantity = max_quantity.max(1);
    SEGMENT_SPLIT_RE
        .split(loadout)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (quantity, name) = match QUANTITY_RE.captures(segment) {
                Some(caps) => {
                    let quantity = caps[1].parse::<u32>().unwrap_or(max_quantity);
                    (quantity, caps[2].trim().to_string())
                }
                None => (1, segment.to_string()),
            };
            if quantity > max_quantity {
                tracing::warn!(segment, quantity, max_quantity, "clamping weapon quantity");
            }
            let name_norm = normalize_name(&name);
            let base_code = base_code(&name_norm);
            WeaponToken {
                quantity: quantity.clamp(1, max_quantity),
                name,
                name_norm,
                base_code,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(quantity: u32, name: &str, base: Option<&str>) -> WeaponToken {
        WeaponToken {
            quantity,
            name: name.to_string(),
            name_norm: normalize_name(name),
            base_code: base.map(str::to_string),
        }
    }

    #[test]
    fn parses_reference_loadout_into_three_tokens() {
        let tokens = parse_loadout("2XAIM-9, 4XAIM-120, 4XGBU-53 SD", 999);
        assert_eq!(
            tokens,
            vec![
                token(2, "AIM-9", Some("AIM-9")),
                token(4, "AIM-120", Some("AIM-120")),
                token(4, "GBU-53 SD", Some("GBU-53")),
            ]
        );
    }

    #[test]
    fn base_code_is_separator_insensitive() {
        for text in ["GBU-53/B", "GBU 53 B", "GBU53B", "gbu-53"] {
            assert_eq!(base_code(text).as_deref(), Some("GBU-53"), "{text}");
        }
        assert_eq!(base_code("JDAM-BLU-109").as_deref(), Some("BLU-109"));
        assert_eq!(base_code("Harpoon"), None);
    }

    #[test]
    fn four_digit_numbers_are_not_base_codes() {
        assert_eq!(base_code("AIM-1200"), None);
        assert_eq!(base_code("XM-1200 / AIM-120D").as_deref(), Some("AIM-120"));
        assert!(all_base_codes("AIM-1200 Prototype").is_empty());
    }

    #[test]
    fn non_ascii_digits_do_not_count_as_quantities() {
        let tokens = parse_loadout("٤XAIM-120", 999);
        assert_eq!(tokens[0].quantity, 1);
        assert_eq!(tokens[0].name, "٤XAIM-120");
    }

    #[test]
    fn quantity_defaults_and_lowercase_x() {
        let tokens = parse_loadout("AGM-158; 8xMK-84 / 0XAIM-9", 999);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].quantity, 1);
        assert_eq!(tokens[1].quantity, 8);
        assert_eq!(tokens[1].name, "MK-84");
        assert_eq!(tokens[2].quantity, 1);
    }

    #[test]
    fn quantities_are_clamped_to_ceiling() {
        let tokens = parse_loadout("50000XAIM-120", 999);
        assert_eq!(tokens[0].quantity, 999);
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert!(parse_loadout(" ; , / ", 999).is_empty());
        assert!(parse_loadout("", 999).is_empty());
    }

    #[test]
    fn catalog_names_yield_every_base_code() {
        let codes = all_base_codes("AIM-120C / AIM-9X Sidewinder");
        assert!(codes.contains("AIM-120"));
        assert!(codes.contains("AIM-9"));
        assert_eq!(codes.len(), 2);
    }

    #[test]
    fn normalization_collapses_whitespace() {
        assert_eq!(normalize_name("  gbu-53   sd "), "GBU-53 SD");
        assert_eq!(normalize_name("GBU-53/B"), "GBU-53-B");
    }
}
