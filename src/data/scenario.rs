//! A scenario file or request body: assets, one target, optional inline catalogs.

use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::data::asset::{AssetInput, AssetRecord};
use crate::data::source::{CatalogProvider, InMemoryCatalogProvider};
use crate::engine::output::EngineOutput;
use crate::engine::Engine;
use crate::error::ScenarioError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub assets: AssetInput,
    #[serde(default)]
    pub target: Value,
    /// `{ "<dataset>": [ {row}, ... ] }`, used instead of the fallback provider.
    #[serde(default)]
    pub catalogs: Option<Map<String, Value>>,
}

impl Scenario {
    pub fn records(&self) -> Vec<AssetRecord> {
        self.assets.clone().into_records()
    }

    /// Reject input that cannot be evaluated at all.
    pub fn validate(&self) -> Result<Vec<AssetRecord>, ScenarioError> {
        let target_missing = match &self.target {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            Value::Object(record) => record.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if target_missing {
            return Err(ScenarioError::MissingTarget);
        }
        let records = self.records();
        if records.is_empty() {
            return Err(ScenarioError::NoAssets);
        }
        Ok(records)
    }

    /// Validate, then evaluate against the inline catalogs when present, else `fallback`.
    pub fn evaluate<P>(
        &self,
        config: &EngineConfig,
        fallback: &P,
        evaluation_id: Uuid,
    ) -> Result<EngineOutput, ScenarioError>
    where
        P: CatalogProvider + ?Sized,
    {
        let records = self.validate()?;
        let output = match &self.catalogs {
            Some(catalogs) => {
                let inline = InMemoryCatalogProvider::from_json_map(catalogs)?;
                Engine::new(config, &inline).evaluate_with_id(evaluation_id, &records, &self.target)
            }
            None => Engine::new(config, fallback).evaluate_with_id(
                evaluation_id,
                &records,
                &self.target,
            ),
        };
        Ok(output)
    }
}
