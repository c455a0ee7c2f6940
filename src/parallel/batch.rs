//! Parallel evaluation of independent scenarios.
//!
//! Each scenario is its own invocation with its own catalog cache, so nothing is
//! shared between tasks except the read-only config and fallback provider.

use serde::Serialize;
use uuid::Uuid;

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::data::scenario::Scenario;
use crate::data::source::CatalogProvider;
use crate::engine::output::EngineOutput;
use crate::parallel::pool::WorkerPool;

/// Outcome of one scenario in a batch. Scenario errors are reported, not fatal.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub name: Option<String>,
    pub evaluation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<EngineOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn evaluate_one<P>(index: usize, scenario: &Scenario, fallback: &P, config: &EngineConfig) -> BatchItem
where
    P: CatalogProvider + ?Sized,
{
    let evaluation_id = Uuid::new_v4();
    let (output, error) = match scenario.evaluate(config, fallback, evaluation_id) {
        Ok(output) => (Some(output), None),
        Err(err) => {
            tracing::warn!(index, %evaluation_id, error = %err, "scenario rejected");
            (None, Some(err.to_string()))
        }
    };
    BatchItem {
        index,
        name: scenario.name.clone(),
        evaluation_id,
        output,
        error,
    }
}

/// Evaluate every scenario in parallel on `pool`. Results keep input order.
pub fn evaluate_batch<P>(
    scenarios: &[Scenario],
    fallback: &P,
    config: &EngineConfig,
    pool: &WorkerPool,
) -> Result<Vec<BatchItem>, rayon::ThreadPoolBuildError>
where
    P: CatalogProvider + Sync + ?Sized,
{
    tracing::info!(scenarios = scenarios.len(), workers = pool.workers, "evaluating batch");
    pool.install(|| {
        scenarios
            .par_iter()
            .enumerate()
            .map(|(index, scenario)| evaluate_one(index, scenario, fallback, config))
            .collect()
    })
}
