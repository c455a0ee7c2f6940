//! Engagement feasibility and authorization.
//!
//! One call to [Engine::evaluate] is one invocation: it classifies the target, walks
//! every friendly asset through override resolution or catalog matching, reduces each
//! asset to a single plan, and derives the authorization code. The catalog cache lives
//! only for the duration of that call.

pub mod authorization;
pub mod matcher;
pub mod mission;
pub mod output;
pub mod probability;
pub mod reducer;
pub mod router;
pub mod side;
pub mod weapons;

use serde_json::Value;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::data::asset::AssetRecord;
use crate::data::source::CatalogProvider;
use crate::data::target::{normalize_target, target_label};
use crate::error::{AssetError, EngineError};

use authorization::{decide, AssetSummary, AuthorizationCode, Tally};
use output::{EngineOutput, ResultRow};
use reducer::EngagementPlan;
use router::CatalogCache;
use side::{classify_friendly, classify_target, Side};

/// Identifier used for the explanatory row when the target cannot be classified.
pub const TARGET_ROW_ID: &str = "TARGET";

/// Evaluates assets against one target. Borrows its configuration and catalog
/// provider, so constructing one per request is free.
pub struct Engine<'a, P: CatalogProvider + ?Sized> {
    config: &'a EngineConfig,
    provider: &'a P,
}

/// Plan plus the bookkeeping the authorization step needs.
struct AssetEvaluation {
    identifier: String,
    domain: Option<String>,
    friendly_classified: bool,
    plan: EngagementPlan,
    /// Loadout weapons with no catalog entry.
    unmatched: Vec<String>,
}

impl AssetEvaluation {
    fn into_rows(self) -> Vec<ResultRow> {
        let annotate = self.plan.has_matches() && !self.unmatched.is_empty();
        let mut rows = self.plan.into_rows(&self.identifier, self.domain);
        if annotate {
            let unmatched = format!("no catalog match for: {}", self.unmatched.join(", "));
            for row in &mut rows {
                row.note = Some(match row.note.take() {
                    Some(note) => format!("{note}; {unmatched}"),
                    None => unmatched.clone(),
                });
            }
        }
        rows
    }

    fn summary(&self) -> AssetSummary {
        AssetSummary {
            friendly_classified: self.friendly_classified,
            override_outcome: self.plan.override_outcome(),
            has_matches: self.plan.has_matches(),
            reaches_threshold: self.plan.reaches_threshold(),
        }
    }
}

impl<'a, P: CatalogProvider + ?Sized> Engine<'a, P> {
    pub fn new(config: &'a EngineConfig, provider: &'a P) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn evaluate(&self, assets: &[AssetRecord], target: &Value) -> EngineOutput {
        self.evaluate_with_id(Uuid::new_v4(), assets, target)
    }

    pub fn evaluate_with_id(
        &self,
        evaluation_id: Uuid,
        assets: &[AssetRecord],
        target: &Value,
    ) -> EngineOutput {
        let span = tracing::info_span!("evaluate", %evaluation_id, assets = assets.len());
        let _guard = span.enter();

        let label = target_label(target);
        let enemy = match classify_target(&normalize_target(target)) {
            Some(side) => side,
            None => {
                let err = EngineError::UndeterminedEnemySide;
                tracing::warn!(target_label = ?label, "{err}");
                return EngineOutput::new(
                    AuthorizationCode::Undetermined,
                    None,
                    label,
                    vec![ResultRow::note(TARGET_ROW_ID, err.to_string())],
                );
            }
        };
        tracing::debug!(enemy_side = %enemy, target_label = ?label, "target classified");

        let mut cache = CatalogCache::new();
        let evaluations: Vec<AssetEvaluation> = assets
            .iter()
            .map(|asset| self.evaluate_asset(asset, enemy, &mut cache))
            .collect();

        let summaries: Vec<AssetSummary> = evaluations.iter().map(AssetEvaluation::summary).collect();
        let code = decide(&Tally::from_summaries(&summaries));
        tracing::info!(
            code = code.value(),
            enemy_side = %enemy,
            catalogs = cache.len(),
            "authorization decided"
        );

        let results = evaluations
            .into_iter()
            .flat_map(AssetEvaluation::into_rows)
            .collect();
        EngineOutput::new(code, Some(enemy), label, results)
    }

    fn evaluate_asset(
        &self,
        asset: &AssetRecord,
        enemy: Side,
        cache: &mut CatalogCache,
    ) -> AssetEvaluation {
        let identifier = asset.identifier().to_string();
        let friendly = classify_friendly(asset);
        let mut evaluation = AssetEvaluation {
            identifier,
            domain: None,
            friendly_classified: friendly.is_some(),
            plan: EngagementPlan::Note(AssetError::UndeterminedFriendlySide),
            unmatched: Vec::new(),
        };

        if let Some(decision) = mission::resolve_override(asset, self.config) {
            evaluation.plan = EngagementPlan::Override(decision);
            return evaluation;
        }

        let Some(friendly) = friendly else {
            tracing::debug!(asset = %evaluation.identifier, "friendly side undetermined");
            return evaluation;
        };

        let catalog = match cache.get_or_fetch(self.provider, friendly, enemy) {
            Ok((route, catalog)) => {
                evaluation.domain = Some(route.domain_label());
                catalog
            }
            Err(err) => {
                tracing::debug!(asset = %evaluation.identifier, error = %err, "no catalog for asset");
                evaluation.plan = EngagementPlan::Note(err);
                return evaluation;
            }
        };

        let tokens = weapons::parse_loadout(
            asset.weapon.as_deref().unwrap_or_default(),
            self.config.max_quantity,
        );
        if tokens.is_empty() {
            evaluation.plan = EngagementPlan::Note(AssetError::UnparseableLoadout);
            return evaluation;
        }

        let matches = matcher::match_tokens(&tokens, catalog, self.config.min_substring_len);
        evaluation.unmatched = matches
            .iter()
            .filter(|result| !result.is_matched())
            .map(|result| result.token.name.clone())
            .collect();
        evaluation.plan = reducer::reduce(matches, self.config.threshold);
        tracing::debug!(
            asset = %evaluation.identifier,
            friendly_side = %friendly,
            enemy_side = %enemy,
            reached = evaluation.plan.reaches_threshold(),
            "asset reduced"
        );
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::RawTable;
    use crate::data::source::InMemoryCatalogProvider;
    use serde_json::json;

    fn provider() -> InMemoryCatalogProvider {
        let air = RawTable::from_records(&[
            json!({"weapon": "AIM-120C AMRAAM", "effectiveness_percentage": "40%", "range_nm": 57})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        ]);
        InMemoryCatalogProvider::new().with_table("red_air_deliverables_air_to_air", air)
    }

    fn asset(value: Value) -> AssetRecord {
        serde_json::from_value(value).expect("asset record")
    }

    #[test]
    fn unknown_target_short_circuits_to_code_one() {
        let config = EngineConfig::default();
        let provider = provider();
        let engine = Engine::new(&config, &provider);
        let output = engine.evaluate(
            &[asset(json!({"callsign": "VIPER 11", "trackcategory": "air", "weapon": "4XAIM-120"}))],
            &json!("contact bearing 270"),
        );
        assert_eq!(output.authorization_code, AuthorizationCode::Undetermined);
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].friendly_id, TARGET_ROW_ID);
    }

    #[test]
    fn every_asset_gets_a_row_even_on_failure() {
        let config = EngineConfig::default();
        let provider = provider();
        let engine = Engine::new(&config, &provider);
        let output = engine.evaluate(
            &[
                asset(json!({"callsign": "VIPER 11", "trackcategory": "air", "weapon": "4XAIM-120"})),
                asset(json!({"callsign": "GHOST 1"})),
                asset(json!({"callsign": "TRUCK 3", "trackcategory": "land", "weapon": "4XAIM-120"})),
                asset(json!({"callsign": "VIPER 12", "trackcategory": "air", "weapon": " ; "})),
            ],
            &json!({"Track Cat": "Air", "CallSign": "BANDIT 1"}),
        );
        let ids: Vec<_> = output.results.iter().map(|row| row.friendly_id.as_str()).collect();
        assert_eq!(ids, vec!["VIPER 11", "GHOST 1", "TRUCK 3", "VIPER 12"]);
        assert_eq!(output.results[1].note.as_deref(), Some("friendly side could not be determined"));
        assert!(output.results[2]
            .note
            .as_deref()
            .is_some_and(|note| note.starts_with("no deliverables catalog")));
        assert_eq!(output.results[3].note.as_deref(), Some("no parseable weapons provided"));
        assert_eq!(output.results[0].domain.as_deref(), Some("air_to_air"));
        assert_eq!(output.target.as_deref(), Some("BANDIT 1"));
        assert_eq!(output.authorization_code, AuthorizationCode::BelowThreshold);
    }

    #[test]
    fn unmatched_weapons_are_named_on_the_plan_row() {
        let config = EngineConfig::default();
        let provider = provider();
        let engine = Engine::new(&config, &provider);
        let output = engine.evaluate(
            &[asset(json!({"callsign": "VIPER 11", "trackcategory": "air", "weapon": "2XR-73, 4XAIM-120, 1XPL-12"}))],
            &json!({"Track Cat": "Air"}),
        );
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].weapon.as_deref(), Some("AIM-120"));
        assert_eq!(
            output.results[0].note.as_deref(),
            Some("no catalog match for: R-73, PL-12")
        );
    }
}
