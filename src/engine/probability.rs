//! Kill-probability math: repeated shots of one weapon type, and the greedy
//! multi-type plan used when no single type reaches the threshold.

use serde::Serialize;

/// Tolerance for threshold comparisons, so `1 - 0.1^1` counts as reaching 0.90.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

pub fn meets_threshold(probability: f64, threshold: f64) -> bool {
    probability + PROBABILITY_EPSILON >= threshold
}

/// `P(k) = 1 - (1 - p)^k`.
pub fn cumulative(per_shot: f64, shots: u32) -> f64 {
    let per_shot = per_shot.clamp(0.0, 1.0);
    1.0 - (1.0 - per_shot).powi(shots.min(i32::MAX as u32) as i32)
}

/// Result of firing up to `quantity` shots of one weapon type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotOutcome {
    pub per_shot: f64,
    pub quantity: u32,
    /// `P(1)..=P(shots)`.
    pub curve: Vec<f64>,
    pub shots: u32,
    pub probability: f64,
    pub reached: bool,
}

impl ShotOutcome {
    /// Shots needed for the threshold, when it was reached.
    pub fn shots_needed(&self) -> Option<u32> {
        self.reached.then_some(self.shots)
    }
}

/// Walk `k = 1..=quantity` and stop at the first `k` meeting the threshold. When it is
/// never met the outcome reports `k = quantity`.
pub fn single_weapon(per_shot: f64, quantity: u32, threshold: f64) -> ShotOutcome {
    let quantity = quantity.max(1);
    let mut curve = Vec::new();
    let mut reached = false;
    for k in 1..=quantity {
        let probability = cumulative(per_shot, k);
        curve.push(probability);
        if meets_threshold(probability, threshold) {
            reached = true;
            break;
        }
    }
    let shots = curve.len() as u32;
    let probability = curve.last().copied().unwrap_or(0.0);
    ShotOutcome {
        per_shot,
        quantity,
        curve,
        shots,
        probability,
        reached,
    }
}

/// A weapon type offered to the combined planner. `key` identifies it to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanCandidate {
    pub key: usize,
    pub per_shot: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShotAllocation {
    pub key: usize,
    pub shots: u32,
}

/// Greedy allocation across weapon types, highest per-shot probability first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPlan {
    /// Types that fired at least once, in firing order.
    pub allocations: Vec<ShotAllocation>,
    pub probability: f64,
    pub reached: bool,
}

impl CombinedPlan {
    pub fn shots_for(&self, key: usize) -> u32 {
        self.allocations
            .iter()
            .find(|allocation| allocation.key == key)
            .map(|allocation| allocation.shots)
            .unwrap_or(0)
    }

    pub fn total_shots(&self) -> u32 {
        self.allocations.iter().map(|allocation| allocation.shots).sum()
    }
}

/// Consume shots one at a time from the best remaining type, tracking the running
/// failure probability, until the threshold is met or every quantity is spent.
/// Ties on probability keep the caller's order.
pub fn combined_plan(candidates: &[PlanCandidate], threshold: f64) -> CombinedPlan {
    let mut ordered: Vec<&PlanCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.per_shot > 0.0 && candidate.quantity > 0)
        .collect();
    ordered.sort_by(|a, b| b.per_shot.total_cmp(&a.per_shot));

    let mut failure = 1.0_f64;
    let mut allocations = Vec::new();
    let mut reached = false;

    'types: for candidate in ordered {
        let per_shot = candidate.per_shot.clamp(0.0, 1.0);
        let mut shots = 0;
        while shots < candidate.quantity {
            failure *= 1.0 - per_shot;
            shots += 1;
            if meets_threshold(1.0 - failure, threshold) {
                reached = true;
                allocations.push(ShotAllocation {
                    key: candidate.key,
                    shots,
                });
                break 'types;
            }
        }
        allocations.push(ShotAllocation {
            key: candidate.key,
            shots,
        });
    }

    CombinedPlan {
        allocations,
        probability: 1.0 - failure,
        reached,
    }
}

/// Percentage rounded to two decimals for display.
pub fn to_percent(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 100.0
}
