//! Mission-level authorization code.
//!
//! Evaluated in fixed order, first match wins: 1, 2, 4, 3.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationCode {
    /// Enemy side unknown, or nothing in the batch could be classified.
    Undetermined,
    /// No viable option.
    NoViableOption,
    /// Matches exist but none reach the threshold.
    BelowThreshold,
    Authorized,
}

impl AuthorizationCode {
    pub fn value(self) -> u8 {
        match self {
            Self::Undetermined => 1,
            Self::NoViableOption => 2,
            Self::BelowThreshold => 3,
            Self::Authorized => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Undetermined => "undetermined input",
            Self::NoViableOption => "no viable option",
            Self::BelowThreshold => "viable but below threshold",
            Self::Authorized => "authorized",
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Undetermined),
            2 => Some(Self::NoViableOption),
            3 => Some(Self::BelowThreshold),
            4 => Some(Self::Authorized),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

/// What one asset contributed after reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetSummary {
    pub friendly_classified: bool,
    /// `Some(true)` authorized override, `Some(false)` failed override.
    pub override_outcome: Option<bool>,
    pub has_matches: bool,
    pub reaches_threshold: bool,
}

/// Batch totals consumed by [decide].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub classified_friendlies: usize,
    pub overrides_ok: usize,
    pub overrides_failed: usize,
    pub assets_with_matches: usize,
    pub assets_reaching_threshold: usize,
}

impl Tally {
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a AssetSummary>) -> Self {
        summaries.into_iter().fold(Self::default(), |mut tally, summary| {
            tally.classified_friendlies += usize::from(summary.friendly_classified);
            match summary.override_outcome {
                Some(true) => tally.overrides_ok += 1,
                Some(false) => tally.overrides_failed += 1,
                None => {}
            }
            tally.assets_with_matches += usize::from(summary.has_matches);
            tally.assets_reaching_threshold += usize::from(summary.reaches_threshold);
            tally
        })
    }

    fn overrides_fired(&self) -> usize {
        self.overrides_ok + self.overrides_failed
    }
}

/// Decide the code for a batch whose enemy side was determined.
pub fn decide(tally: &Tally) -> AuthorizationCode {
    if tally.classified_friendlies == 0 && tally.overrides_fired() == 0 {
        return AuthorizationCode::Undetermined;
    }
    if tally.overrides_ok == 0
        && (tally.overrides_failed > 0 || tally.assets_with_matches == 0)
    {
        return AuthorizationCode::NoViableOption;
    }
    if tally.overrides_ok > 0 || tally.assets_reaching_threshold > 0 {
        return AuthorizationCode::Authorized;
    }
    AuthorizationCode::BelowThreshold
}
