//! Tier classification display.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use router_engine::TierTable;
use std::path::Path;
use tabled::Tabled;

use crate::app::App;
use crate::output;

/// Arguments for the tiers command.
#[derive(Args, Debug)]
pub struct TiersArgs {}

/// One row of the tier table.
#[derive(Debug, Tabled)]
pub struct TierRow {
    /// Model id.
    pub model: String,
    /// Latency tier.
    pub latency: String,
    /// Token-capacity tier.
    pub tokens: String,
    /// Balance tier.
    pub balance: String,
}

/// Build display rows from a tier table.
pub fn tier_rows(table: &TierTable) -> Vec<TierRow> {
    table
        .assignments()
        .iter()
        .map(|(model, assignment)| TierRow {
            model: model.to_string(),
            latency: assignment.latency.to_string(),
            tokens: assignment.tokens.to_string(),
            balance: assignment.balance.to_string(),
        })
        .collect()
}

/// Execute the tiers command.
pub async fn execute(_args: TiersArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;
    let now = Utc::now();
    let table = app.router.tier_table(now);

    if json {
        return output::json(table.assignments());
    }

    output::section("Tier Classification");
    if let Some(locked) = app.router.locked() {
        output::info(&format!("routing is locked to '{locked}'"));
    }
    output::table(&tier_rows(&table));
    Ok(())
}
