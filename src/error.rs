//! Error taxonomy for an engagement evaluation.
//!
//! Only [EngineError] aborts an invocation. Every [AssetError] degrades to a note
//! row for the affected asset while the rest of the batch keeps evaluating.

use thiserror::Error;

use crate::engine::mission::MissionKind;
use crate::engine::side::Side;

/// Invocation-fatal conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("enemy side could not be determined from target input")]
    UndeterminedEnemySide,
}

/// Recoverable per-asset failures. The `Display` text is written to the row's note.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("friendly side could not be determined")]
    UndeterminedFriendlySide,

    #[error("no deliverables catalog for friendly '{friendly}' vs enemy '{enemy}'")]
    UnroutableSidePair { friendly: Side, enemy: Side },

    #[error("deliverables catalog '{dataset}' unavailable: {reason}")]
    CatalogUnavailable { dataset: String, reason: String },

    #[error("no parseable weapons provided")]
    UnparseableLoadout,

    #[error("no armaments meet engagement criteria")]
    NoCatalogMatch,

    #[error("{}", mission_failure_note(.mission, .requirement))]
    MissionPrerequisiteMissing {
        mission: MissionKind,
        requirement: &'static str,
    },
}

fn mission_failure_note(mission: &MissionKind, requirement: &str) -> String {
    match mission {
        MissionKind::Rescue => format!("cannot accomplish this mission: {requirement}"),
        MissionKind::Degrade | MissionKind::Investigate => {
            format!("missing required deliverables: {requirement}")
        }
    }
}

/// Failures raised by catalog providers while loading a deliverables table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("dataset '{0}' not found")]
    NotFound(String),

    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read catalog workbook: {0}")]
    Workbook(String),

    #[error("unsupported catalog format '{0}'")]
    UnsupportedFormat(String),
}

/// Scenario input rejected before evaluation.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario has no target")]
    MissingTarget,

    #[error("scenario has no assets")]
    NoAssets,

    #[error("invalid inline catalogs: {0}")]
    Catalogs(#[from] CatalogError),
}

/// Failures while loading [crate::config::EngineConfig].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_notes_name_the_missing_capability() {
        let rescue = AssetError::MissionPrerequisiteMissing {
            mission: MissionKind::Rescue,
            requirement: "callsign is not an approved rescue asset",
        };
        assert!(rescue.to_string().starts_with("cannot accomplish this mission"));

        let degrade = AssetError::MissionPrerequisiteMissing {
            mission: MissionKind::Degrade,
            requirement: "electronic attack",
        };
        assert_eq!(
            degrade.to_string(),
            "missing required deliverables: electronic attack"
        );
    }

    #[test]
    fn unroutable_pair_names_both_sides() {
        let err = AssetError::UnroutableSidePair {
            friendly: Side::Land,
            enemy: Side::Air,
        };
        assert_eq!(
            err.to_string(),
            "no deliverables catalog for friendly 'land' vs enemy 'air'"
        );
    }
}
