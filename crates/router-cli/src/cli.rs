//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

/// Tier Router - statistics-driven routing across LLM endpoints
#[derive(Parser, Debug)]
#[command(name = "tier-router")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the persisted state records
    #[arg(short = 'd', long, env = "ROUTER_STATE_DIR", default_value = ".", global = true)]
    pub state_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every eligible model and refresh the tier ranking
    Rank(commands::rank::RankArgs),

    /// Show the current tier classification
    Tiers(commands::tiers::TiersArgs),

    /// Dump the raw rolling statistics
    Stats(commands::stats::StatsArgs),

    /// Show models currently in cooldown
    Cooldowns(commands::cooldowns::CooldownsArgs),

    /// Route a prompt to the best eligible model and invoke it
    Route(commands::route::RouteArgs),

    /// Lock routing to one model
    Lock(commands::lock::LockArgs),

    /// Clear the routing lock
    Unlock(commands::unlock::UnlockArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Rank(args) => commands::rank::execute(args, &self.state_dir, self.json).await,
            Commands::Tiers(args) => {
                commands::tiers::execute(args, &self.state_dir, self.json).await
            }
            Commands::Stats(args) => {
                commands::stats::execute(args, &self.state_dir, self.json).await
            }
            Commands::Cooldowns(args) => {
                commands::cooldowns::execute(args, &self.state_dir, self.json).await
            }
            Commands::Route(args) => {
                commands::route::execute(args, &self.state_dir, self.json).await
            }
            Commands::Lock(args) => commands::lock::execute(args, &self.state_dir, self.json).await,
            Commands::Unlock(args) => {
                commands::unlock::execute(args, &self.state_dir, self.json).await
            }
        }
    }
}
