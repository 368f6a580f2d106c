//! Raw statistics dump.

use anyhow::Result;
use clap::Args;
use std::path::Path;
use tabled::Tabled;

use crate::app::App;
use crate::output;

/// Arguments for the stats command.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Show every raw sample instead of the aggregate metrics
    #[arg(long)]
    pub raw: bool,
}

/// One row of the aggregate metrics table.
#[derive(Debug, Tabled)]
pub struct StatsRow {
    /// Model id.
    pub model: String,
    /// Samples in the window.
    pub samples: usize,
    /// Average latency.
    pub avg_latency: String,
    /// Success rate.
    pub success_rate: String,
    /// Average token figure.
    pub avg_tokens: String,
    /// Balance score.
    pub balance: String,
}

/// Execute the stats command.
pub async fn execute(args: StatsArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;

    if json || args.raw {
        // The raw windows are the persisted shape; dump them as-is.
        return output::json(&app.stats.samples());
    }

    let rows: Vec<StatsRow> = app
        .stats
        .snapshot()
        .iter()
        .map(|(model, metrics)| StatsRow {
            model: model.to_string(),
            samples: metrics.samples,
            avg_latency: output::format_latency(metrics.avg_latency_ms),
            success_rate: output::format_rate(metrics.success_rate),
            avg_tokens: format!("{:.0}", metrics.avg_max_tokens),
            balance: if metrics.balance_score().is_finite() {
                format!("{:.1}", metrics.balance_score())
            } else {
                "-".to_string()
            },
        })
        .collect();

    output::section("Rolling Statistics");
    output::table(&rows);
    Ok(())
}
