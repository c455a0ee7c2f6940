//! Collapses an asset's weapon matches into exactly one engagement plan.
//!
//! Priority: a single weapon type that reaches the threshold on its own (fewest shots,
//! then highest probability, then loadout order); otherwise a combined plan when two
//! or more matched types carry a probability; otherwise the best lone match, flagged
//! as needing more units.

use std::cmp::Ordering;

use crate::engine::matcher::MatchResult;
use crate::engine::mission::OverrideDecision;
use crate::engine::output::{ResultRow, RowOutcome};
use crate::engine::probability::{
    combined_plan, single_weapon, to_percent, CombinedPlan, PlanCandidate, ShotOutcome,
};
use crate::error::AssetError;

/// A catalog-bound match with its single-weapon outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Position among the asset's matched weapons.
    pub index: usize,
    pub result: MatchResult,
    pub outcome: ShotOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngagementPlan {
    Single(ScoredMatch),
    Combined {
        members: Vec<ScoredMatch>,
        plan: CombinedPlan,
    },
    Override(OverrideDecision),
    Note(AssetError),
}

impl EngagementPlan {
    pub fn has_matches(&self) -> bool {
        matches!(self, Self::Single(_) | Self::Combined { .. })
    }

    pub fn reaches_threshold(&self) -> bool {
        match self {
            Self::Single(scored) => scored.outcome.reached,
            Self::Combined { plan, .. } => plan.reached,
            Self::Override(_) | Self::Note(_) => false,
        }
    }

    /// Override outcome, when one fired.
    pub fn override_outcome(&self) -> Option<bool> {
        match self {
            Self::Override(decision) => Some(decision.authorized()),
            _ => None,
        }
    }

    pub fn into_rows(self, friendly_id: &str, domain: Option<String>) -> Vec<ResultRow> {
        match self {
            Self::Single(scored) => vec![single_row(friendly_id, domain, &scored)],
            Self::Combined { members, plan } => members
                .iter()
                .map(|scored| combined_row(friendly_id, domain.clone(), scored, &plan))
                .collect(),
            Self::Override(decision) => {
                let mut row = ResultRow::note(friendly_id, decision.note());
                if decision.authorized() {
                    row.outcome = RowOutcome::Override;
                }
                vec![row]
            }
            Self::Note(err) => vec![ResultRow::note(friendly_id, err.to_string()).with_domain(domain)],
        }
    }
}

fn score(matches: Vec<MatchResult>, threshold: f64) -> Vec<ScoredMatch> {
    matches
        .into_iter()
        .filter(MatchResult::is_matched)
        .enumerate()
        .map(|(index, result)| {
            let outcome = single_weapon(
                result.probability().unwrap_or(0.0),
                result.token.quantity,
                threshold,
            );
            ScoredMatch {
                index,
                result,
                outcome,
            }
        })
        .collect()
}

fn fewest_shots(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
    a.outcome
        .shots
        .cmp(&b.outcome.shots)
        .then_with(|| b.outcome.probability.total_cmp(&a.outcome.probability))
        .then_with(|| a.index.cmp(&b.index))
}

fn most_probable(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
    b.outcome
        .probability
        .total_cmp(&a.outcome.probability)
        .then_with(|| a.index.cmp(&b.index))
}

/// Reduce one asset's matches. Unmatched tokens never produce rows here.
pub fn reduce(matches: Vec<MatchResult>, threshold: f64) -> EngagementPlan {
    let scored = score(matches, threshold);
    if scored.is_empty() {
        return EngagementPlan::Note(AssetError::NoCatalogMatch);
    }

    if let Some(best) = scored
        .iter()
        .filter(|scored| scored.outcome.reached)
        .min_by(|a, b| fewest_shots(a, b))
    {
        return EngagementPlan::Single(best.clone());
    }

    let eligible: Vec<&ScoredMatch> = scored
        .iter()
        .filter(|scored| scored.outcome.per_shot > 0.0)
        .collect();
    if eligible.len() >= 2 {
        let candidates: Vec<PlanCandidate> = eligible
            .iter()
            .map(|scored| PlanCandidate {
                key: scored.index,
                per_shot: scored.outcome.per_shot,
                quantity: scored.result.token.quantity,
            })
            .collect();
        let plan = combined_plan(&candidates, threshold);
        let members = plan
            .allocations
            .iter()
            .filter_map(|allocation| scored.iter().find(|s| s.index == allocation.key))
            .cloned()
            .collect();
        return EngagementPlan::Combined { members, plan };
    }

    match scored.iter().min_by(|a, b| most_probable(a, b)) {
        Some(best) => EngagementPlan::Single(best.clone()),
        None => EngagementPlan::Note(AssetError::NoCatalogMatch),
    }
}

fn base_row(
    friendly_id: &str,
    domain: Option<String>,
    outcome: RowOutcome,
    scored: &ScoredMatch,
) -> ResultRow {
    let token = &scored.result.token;
    let mut row = ResultRow::blank(friendly_id, outcome).with_domain(domain);
    row.weapon = Some(token.name.clone());
    row.weapon_base_code = token.base_code.clone();
    row.qty = Some(token.quantity);
    if let Some(entry) = &scored.result.entry {
        row.deliverable = Some(entry.name.clone());
        row.effectiveness = entry.effectiveness;
        row.range = entry.range.clone();
        row.alt_low = entry.alt_low.clone();
        row.alt_high = entry.alt_high.clone();
        row.speed = entry.speed.clone();
        row.dependencies = entry.dependencies.clone();
    }
    row.cumulative_effectiveness_percent = Some(to_percent(scored.outcome.probability));
    row.cumulative_curve_percent = scored.outcome.curve.iter().copied().map(to_percent).collect();
    row.shots_needed_for_threshold = scored.outcome.shots_needed();
    row
}

fn single_row(friendly_id: &str, domain: Option<String>, scored: &ScoredMatch) -> ResultRow {
    let mut row = base_row(friendly_id, domain, RowOutcome::Single, scored);
    if !scored.outcome.reached {
        row.needs_more_note = Some(format!(
            "needs more than {} units",
            scored.result.token.quantity
        ));
    }
    row
}

fn combined_row(
    friendly_id: &str,
    domain: Option<String>,
    scored: &ScoredMatch,
    plan: &CombinedPlan,
) -> ResultRow {
    let outcome = if plan.reached {
        RowOutcome::Combined
    } else {
        RowOutcome::CombinedInsufficient
    };
    let mut row = base_row(friendly_id, domain, outcome, scored);
    row.combined_effectiveness_percent = Some(to_percent(plan.probability));
    row.shots_used_in_combined_plan = Some(plan.shots_for(scored.index));
    if plan.reached {
        row.note = Some(format!(
            "combined plan reaches threshold with {} shots",
            plan.total_shots()
        ));
    } else {
        row.needs_more_note = Some(format!(
            "combined plan needs more than {} units",
            plan.total_shots()
        ));
    }
    row
}
