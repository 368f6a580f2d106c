//! Lock routing to one model.

use anyhow::Result;
use clap::Args;
use router_core::ModelId;
use serde_json::json;
use std::path::Path;

use crate::app::App;
use crate::output;

/// Arguments for the lock command.
#[derive(Args, Debug)]
pub struct LockArgs {
    /// Model every subsequent route call must return. Not validated: the
    /// lock is an operator override.
    pub model: String,
}

/// Execute the lock command.
pub async fn execute(args: LockArgs, state_dir: &Path, json: bool) -> Result<()> {
    let app = App::load(state_dir).await?;
    let model = ModelId::from(args.model.as_str());

    app.router.lock(model.clone());
    app.save_router_state().await?;

    if json {
        return output::json(&json!({"locked_model": model}));
    }
    output::success(&format!("locked routing to '{model}'"));
    Ok(())
}
