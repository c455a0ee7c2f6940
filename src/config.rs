//! Engine configuration: YAML file plus environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "ENGAGEMENT_CONFIG";
pub const CATALOG_DIR_ENV: &str = "ENGAGEMENT_CATALOG_DIR";
pub const THRESHOLD_ENV: &str = "ENGAGEMENT_THRESHOLD";
pub const BIND_ENV: &str = "ENGAGEMENT_BIND";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

pub const DEFAULT_THRESHOLD: f64 = 0.90;
pub const DEFAULT_MAX_QUANTITY: u32 = 999;
pub const DEFAULT_MIN_SUBSTRING_LEN: usize = 3;
pub const DEFAULT_CATALOG_DIR: &str = "data/catalogs";

fn default_rescue_prefixes() -> Vec<String> {
    ["PEDRO", "JOLLY", "SANDY", "KING", "DUSTOFF"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_placeholders() -> Vec<String> {
    ["-", "--", "none", "n/a", "na", "null", "nil"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Success probability an asset must reach, 0–1.
    pub threshold: f64,
    pub rescue_callsign_prefixes: Vec<String>,
    /// Deliverable strings treated as absent (compared case-insensitively).
    pub placeholder_values: Vec<String>,
    pub min_substring_len: usize,
    pub max_quantity: u32,
    pub catalog_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            rescue_callsign_prefixes: default_rescue_prefixes(),
            placeholder_values: default_placeholders(),
            min_substring_len: DEFAULT_MIN_SUBSTRING_LEN,
            max_quantity: DEFAULT_MAX_QUANTITY,
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
        }
    }
}

impl EngineConfig {
    /// Read a YAML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the file named by `ENGAGEMENT_CONFIG`, then env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ENGAGEMENT_CATALOG_DIR` / `ENGAGEMENT_THRESHOLD` from a lookup function.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(CATALOG_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            self.catalog_dir = PathBuf::from(dir.trim());
        }
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            self.threshold = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{THRESHOLD_ENV} must be a number, got '{raw}'"))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.max_quantity == 0 {
            return Err(ConfigError::Invalid(
                "max_quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_placeholder(&self, value: &str) -> bool {
        let value = value.trim();
        value.is_empty()
            || self
                .placeholder_values
                .iter()
                .any(|placeholder| placeholder.eq_ignore_ascii_case(value))
    }

    pub fn is_rescue_callsign(&self, identifier: &str) -> bool {
        let identifier = identifier.trim().to_uppercase();
        !identifier.is_empty()
            && self
                .rescue_callsign_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && identifier.starts_with(&prefix.to_uppercase()))
    }
}

/// HTTP bind address from `ENGAGEMENT_BIND`.
pub fn bind_address() -> String {
    env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string())
}
