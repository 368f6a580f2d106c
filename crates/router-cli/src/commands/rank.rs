//! Probe every eligible model and refresh the ranking.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use router_core::{ModelId, TierAssignment};
use router_engine::ProbeStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::app::App;
use crate::commands::tiers::tier_rows;
use crate::output;

/// Arguments for the rank command.
#[derive(Args, Debug)]
pub struct RankArgs {}

/// JSON output of a probe pass.
#[derive(Debug, Serialize)]
pub struct RankOutput {
    /// Per-model probe results.
    pub probed: Vec<ProbedModel>,
    /// Models skipped because they were in cooldown.
    pub skipped: Vec<ModelId>,
    /// Resulting tier classification.
    pub tiers: BTreeMap<ModelId, TierAssignment>,
}

/// One probed model in the JSON output.
#[derive(Debug, Serialize)]
pub struct ProbedModel {
    /// Model id.
    pub model: ModelId,
    /// `succeeded` or `exhausted`.
    pub status: &'static str,
    /// Latency for successful probes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

/// Execute the rank command.
pub async fn execute(_args: RankArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;
    let pool = app.config.credentials()?.clone();
    let client = app.client()?;
    let catalog = app.catalog(client.as_ref()).await?;
    let now = Utc::now();

    let spinner = (!json).then(|| output::spinner("Probing eligible models..."));
    let prober = app.prober(Arc::clone(&client), pool);
    let report = prober.rank_all(&catalog, now).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    app.save_stats().await?;
    app.save_cooldowns(now).await?;

    let table = app.router.tier_table(now);

    if json {
        let probed = report
            .outcomes
            .iter()
            .map(|outcome| match outcome.status {
                ProbeStatus::Succeeded { latency_ms, .. } => ProbedModel {
                    model: outcome.model.clone(),
                    status: "succeeded",
                    latency_ms: Some(latency_ms),
                },
                ProbeStatus::Exhausted => ProbedModel {
                    model: outcome.model.clone(),
                    status: "exhausted",
                    latency_ms: None,
                },
            })
            .collect();
        return output::json(&RankOutput {
            probed,
            skipped: report.skipped,
            tiers: table.assignments().clone(),
        });
    }

    let succeeded = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.status, ProbeStatus::Succeeded { .. }))
        .count();
    output::success(&format!(
        "probed {} models ({} ok, {} exhausted, {} in cooldown)",
        report.outcomes.len(),
        succeeded,
        report.outcomes.len() - succeeded,
        report.skipped.len()
    ));

    output::section("Tier Classification");
    output::table(&tier_rows(&table));
    Ok(())
}
