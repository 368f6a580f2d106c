//! Active cooldown display.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use std::path::Path;
use tabled::Tabled;

use crate::app::App;
use crate::output;

/// Arguments for the cooldowns command.
#[derive(Args, Debug)]
pub struct CooldownsArgs {}

/// One row of the cooldown table.
#[derive(Debug, Tabled)]
pub struct CooldownRow {
    /// Model id.
    pub model: String,
    /// When the cooldown lapses.
    pub expires_at: String,
    /// Time remaining.
    pub remaining: String,
}

/// Execute the cooldowns command.
pub async fn execute(_args: CooldownsArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;
    let now = Utc::now();
    let active = app.cooldowns.active(now);

    if json {
        return output::json(&active);
    }

    let rows: Vec<CooldownRow> = active
        .iter()
        .map(|(model, expires_at)| {
            let remaining = (*expires_at - now)
                .to_std()
                .map(|d| humantime::format_duration(std::time::Duration::from_secs(d.as_secs())).to_string())
                .unwrap_or_else(|_| "0s".to_string());
            CooldownRow {
                model: model.to_string(),
                expires_at: expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                remaining,
            }
        })
        .collect();

    output::section("Active Cooldowns");
    output::table(&rows);
    Ok(())
}
