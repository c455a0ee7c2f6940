//! Engine output: one authorization code plus evidence rows.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::engine::authorization::AuthorizationCode;
use crate::engine::side::Side;

/// Which kind of plan a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    Single,
    Combined,
    CombinedInsufficient,
    Override,
    Note,
}

/// One evidence row. Percentages are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub friendly_id: String,
    pub domain: Option<String>,
    pub outcome: RowOutcome,
    pub weapon: Option<String>,
    /// Catalog deliverable the weapon matched.
    pub deliverable: Option<String>,
    pub weapon_base_code: Option<String>,
    pub qty: Option<u32>,
    pub effectiveness: Option<f64>,
    pub range: Option<Value>,
    pub alt_low: Option<Value>,
    pub alt_high: Option<Value>,
    pub speed: Option<Value>,
    pub dependencies: Option<String>,
    pub cumulative_effectiveness_percent: Option<f64>,
    /// `P(1)..P(k)` up to the reported shot count.
    pub cumulative_curve_percent: Vec<f64>,
    pub shots_needed_for_threshold: Option<u32>,
    pub needs_more_note: Option<String>,
    pub note: Option<String>,
    pub combined_effectiveness_percent: Option<f64>,
    pub shots_used_in_combined_plan: Option<u32>,
}

impl ResultRow {
    /// Row with only an identifier and an outcome; callers fill the rest.
    pub fn blank(friendly_id: impl Into<String>, outcome: RowOutcome) -> Self {
        Self {
            friendly_id: friendly_id.into(),
            domain: None,
            outcome,
            weapon: None,
            deliverable: None,
            weapon_base_code: None,
            qty: None,
            effectiveness: None,
            range: None,
            alt_low: None,
            alt_high: None,
            speed: None,
            dependencies: None,
            cumulative_effectiveness_percent: None,
            cumulative_curve_percent: Vec::new(),
            shots_needed_for_threshold: None,
            needs_more_note: None,
            note: None,
            combined_effectiveness_percent: None,
            shots_used_in_combined_plan: None,
        }
    }

    pub fn note(friendly_id: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::blank(friendly_id, RowOutcome::Note)
        }
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }
}

fn serialize_code<S: Serializer>(code: &AuthorizationCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(code.value())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOutput {
    #[serde(serialize_with = "serialize_code")]
    pub authorization_code: AuthorizationCode,
    pub authorization_label: &'static str,
    pub enemy_side: Option<Side>,
    pub target: Option<String>,
    pub results: Vec<ResultRow>,
}

impl EngineOutput {
    pub fn new(
        code: AuthorizationCode,
        enemy_side: Option<Side>,
        target: Option<String>,
        results: Vec<ResultRow>,
    ) -> Self {
        Self {
            authorization_code: code,
            authorization_label: code.label(),
            enemy_side,
            target,
            results,
        }
    }

    pub fn rows_for<'a>(&'a self, friendly_id: &'a str) -> impl Iterator<Item = &'a ResultRow> {
        self.results
            .iter()
            .filter(move |row| row.friendly_id == friendly_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_serializes_as_integer() {
        let output = EngineOutput::new(
            AuthorizationCode::Authorized,
            Some(Side::Air),
            Some("44875".to_string()),
            vec![ResultRow::note("VIPER 11", "no parseable weapons provided")],
        );
        let value = serde_json::to_value(&output).expect("serialize");
        assert_eq!(value["authorization_code"], 4);
        assert_eq!(value["enemy_side"], "air");
        assert_eq!(value["results"][0]["outcome"], "note");
        assert!(value["results"][0]["weapon"].is_null());
    }
}
