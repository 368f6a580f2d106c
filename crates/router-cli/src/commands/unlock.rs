//! Clear the routing lock.

use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::Path;

use crate::app::App;
use crate::output;

/// Arguments for the unlock command.
#[derive(Args, Debug)]
pub struct UnlockArgs {}

/// Execute the unlock command.
pub async fn execute(_args: UnlockArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;

    app.router.unlock();
    app.save_router_state().await?;

    if json {
        return output::json(&json!({"locked_model": null}));
    }
    output::success("routing unlocked");
    Ok(())
}
