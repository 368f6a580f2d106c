//! Tier Router CLI
//!
//! Command-line interface for probing, inspecting, and routing across a
//! pool of upstream language-model endpoints.

use clap::Parser;

mod app;
mod cli;
mod commands;
mod config;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    if let Err(err) = cli.execute().await {
        output::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

/// Initialize tracing/logging based on verbosity and format.
fn init_tracing(verbose: u8, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer().with_target(verbose > 1)).init();
    }
}
