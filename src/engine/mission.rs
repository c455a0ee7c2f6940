//! Mission overrides. A `rescue`, `degrade`, or `investigate` tag replaces weapon
//! matching with a capability check on the asset itself.

use std::fmt;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::asset::AssetRecord;
use crate::error::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Rescue,
    Degrade,
    Investigate,
}

impl MissionKind {
    /// Highest priority first.
    pub const ALL: [MissionKind; 3] = [Self::Rescue, Self::Degrade, Self::Investigate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rescue => "rescue",
            Self::Degrade => "degrade",
            Self::Investigate => "investigate",
        }
    }

    fn requirement(self) -> &'static str {
        match self {
            Self::Rescue => "callsign is not an approved rescue asset",
            Self::Degrade => "electronic attack",
            Self::Investigate => "sensing or communications",
        }
    }

    fn capability(self) -> &'static str {
        match self {
            Self::Rescue => "approved rescue callsign",
            Self::Degrade => "electronic attack available",
            Self::Investigate => "sensing or communications available",
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Override mission declared on the asset. `destroy`, `attack`, and unknown tags
/// leave the asset on the weapon path.
pub fn declared_mission(asset: &AssetRecord) -> Option<MissionKind> {
    let tags: Vec<String> = asset.tags().collect();
    MissionKind::ALL
        .into_iter()
        .find(|mission| tags.iter().any(|tag| tag == mission.as_str()))
}

/// An override that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDecision {
    pub mission: MissionKind,
    pub result: Result<(), AssetError>,
}

impl OverrideDecision {
    pub fn authorized(&self) -> bool {
        self.result.is_ok()
    }

    /// Row note for an authorized override.
    pub fn note(&self) -> String {
        match &self.result {
            Ok(()) => format!(
                "{} mission authorized: {}",
                self.mission,
                self.mission.capability()
            ),
            Err(err) => err.to_string(),
        }
    }
}

fn has_deliverable(value: Option<&str>, config: &EngineConfig) -> bool {
    value.map(|text| !config.is_placeholder(text)).unwrap_or(false)
}

/// Resolve the asset's override, or `None` when it should go through weapon matching.
pub fn resolve_override(asset: &AssetRecord, config: &EngineConfig) -> Option<OverrideDecision> {
    let mission = declared_mission(asset)?;
    let satisfied = match mission {
        MissionKind::Rescue => config.is_rescue_callsign(asset.identifier()),
        MissionKind::Degrade => has_deliverable(asset.ea_deliverables.as_deref(), config),
        MissionKind::Investigate => {
            has_deliverable(asset.sensing_deliverables.as_deref(), config)
                || has_deliverable(asset.comm_deliverables.as_deref(), config)
        }
    };
    let result = if satisfied {
        Ok(())
    } else {
        Err(AssetError::MissionPrerequisiteMissing {
            mission,
            requirement: mission.requirement(),
        })
    };
    tracing::debug!(
        asset = asset.identifier(),
        %mission,
        authorized = satisfied,
        "mission override resolved"
    );
    Some(OverrideDecision { mission, result })
}
