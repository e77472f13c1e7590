//! Refresh command - re-read balance and network

use anyhow::{bail, Result};

use super::{auto_resume, get_context, print_json_outcome};
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context("refresh")?;
    auto_resume(&ctx, json).await;

    if !json && ctx.controller.session().account_address.is_none() {
        bail!("No wallet connected. Run 'satchel connect' first.");
    }

    let result = ctx.controller.refresh().await;

    if json {
        return print_json_outcome(result.map(|_| ctx.controller.snapshot()));
    }

    result?;
    println!("{}", output::session_table(&ctx.controller.snapshot()));

    Ok(())
}
