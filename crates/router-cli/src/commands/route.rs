//! Route a prompt to the best eligible model and invoke it.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use router_core::{ProbeSample, RouterError, Tier};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::app::App;
use crate::output;

/// Arguments for the route command.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Prompt to send to the chosen model
    pub prompt: String,

    /// Preferred balance tier (S, A, B, or C)
    #[arg(short, long)]
    pub tier: Option<Tier>,
}

/// JSON output of a routed invocation.
#[derive(Debug, Serialize)]
pub struct RouteOutput {
    /// Chosen model.
    pub model: String,
    /// Invocation latency.
    pub latency_ms: f64,
    /// Token figure reported by the provider.
    pub max_tokens: u32,
    /// Generated text.
    pub response: String,
}

/// Execute the route command.
///
/// The routing decision is pure; the chosen model is then invoked with the
/// prompt under one pass of credential rotation. Exhausting the pool arms a
/// cooldown for the chosen model and surfaces the failure — no retry loop,
/// no silent fallback to another model.
pub async fn execute(args: RouteArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;
    let now = Utc::now();

    let chosen = app.router.route(now, args.tier)?;
    let pool = app.config.credentials()?;
    let client = app.client()?;

    for (attempt, credential) in pool.attempts().enumerate() {
        match client.invoke(&chosen, credential, &args.prompt).await {
            Ok(invocation) => {
                app.stats.record(
                    &chosen,
                    ProbeSample::success(invocation.latency_ms, invocation.max_tokens),
                );
                app.save_stats().await?;

                if json {
                    return output::json(&RouteOutput {
                        model: chosen.to_string(),
                        latency_ms: invocation.latency_ms,
                        max_tokens: invocation.max_tokens,
                        response: invocation.text,
                    });
                }

                output::key_value("Model", chosen.as_str());
                output::key_value("Latency", &output::format_latency(invocation.latency_ms));
                println!("\n{}", invocation.text);
                return Ok(());
            }
            Err(err) => {
                debug!(model = %chosen, attempt = attempt, error = %err, "invocation attempt failed");
            }
        }
    }

    app.cooldowns.mark_failed(&chosen, now);
    app.save_cooldowns(now).await?;
    Err(RouterError::credential_exhausted(chosen.as_str()).into())
}
