use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::data::scenario::Scenario;
use crate::data::source::CatalogProvider;
use crate::engine::output::EngineOutput;
use crate::engine::router::ROUTES;
use crate::engine::weapons::{parse_loadout, WeaponToken};
use crate::error::ScenarioError;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn single(message: &'static str, field: &'static str, detail: String) -> Self {
        Self {
            status: "error",
            message,
            errors: vec![ValidationIssue {
                field,
                messages: vec![detail],
            }],
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
    #[error("{}", validation_message(.0))]
    Validation(ValidationErrorResponse),
}

fn validation_message(response: &ValidationErrorResponse) -> &'static str {
    response.message
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "engagement-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
struct RouteSummary {
    friendly: &'static str,
    enemy: &'static str,
    dataset: &'static str,
    domain: String,
}

pub fn routes_payload() -> Result<String, serde_json::Error> {
    let routes: Vec<RouteSummary> = ROUTES
        .iter()
        .map(|route| RouteSummary {
            friendly: route.friendly.as_str(),
            enemy: route.enemy.as_str(),
            dataset: route.dataset,
            domain: route.domain_label(),
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "status": "ok", "routes": routes }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadoutRequest {
    #[serde(default)]
    pub loadout: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadoutResponse {
    pub status: &'static str,
    pub loadout: String,
    pub tokens: Vec<WeaponToken>,
}

pub fn loadout_parse_payload(body: &str, config: &EngineConfig) -> Result<String, PayloadError> {
    let request: LoadoutRequest = serde_json::from_str(body)?;
    let tokens = parse_loadout(&request.loadout, config.max_quantity);
    let response = LoadoutResponse {
        status: "ok",
        loadout: request.loadout,
        tokens,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub status: &'static str,
    pub evaluation_id: Uuid,
    pub evaluated_at: String,
    pub output: EngineOutput,
}

/// Evaluate a `{assets, target, catalogs?}` body. Inline catalogs win over `fallback`.
pub fn evaluate_payload<P>(
    body: &str,
    config: &EngineConfig,
    fallback: &P,
) -> Result<String, PayloadError>
where
    P: CatalogProvider + ?Sized,
{
    let scenario: Scenario = serde_json::from_str(body)?;
    let evaluation_id = Uuid::new_v4();
    let output = scenario
        .evaluate(config, fallback, evaluation_id)
        .map_err(|err| {
            let field = match err {
                ScenarioError::MissingTarget => "target",
                ScenarioError::NoAssets => "assets",
                ScenarioError::Catalogs(_) => "catalogs",
            };
            PayloadError::Validation(ValidationErrorResponse::single(
                "invalid evaluate request",
                field,
                err.to_string(),
            ))
        })?;
    let response = EvaluateResponse {
        status: "ok",
        evaluation_id,
        evaluated_at: chrono::Utc::now().to_rfc3339(),
        output,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::InMemoryCatalogProvider;

    #[test]
    fn routes_payload_lists_every_route() {
        let payload: serde_json::Value =
            serde_json::from_str(&routes_payload().expect("payload")).expect("json");
        assert_eq!(payload["routes"].as_array().map(Vec::len), Some(ROUTES.len()));
        assert_eq!(payload["routes"][0]["domain"], "air_to_air");
    }

    #[test]
    fn evaluate_payload_maps_missing_target_to_validation() {
        let err = evaluate_payload(
            r#"{"assets": [{"callsign": "VIPER 11"}]}"#,
            &EngineConfig::default(),
            &InMemoryCatalogProvider::new(),
        )
        .expect_err("target is required");
        let PayloadError::Validation(response) = err else {
            panic!("expected validation error");
        };
        assert_eq!(response.errors[0].field, "target");
    }
}
