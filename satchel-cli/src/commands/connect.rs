//! Connect command - request account access from the wallet

use anyhow::Result;

use super::{get_context, print_json_outcome};
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context("connect")?;

    if !json {
        output::info("Requesting account access. Approve the request in your wallet...");
    }

    let result = ctx.controller.connect().await;

    if json {
        return print_json_outcome(result.map(|_| ctx.controller.snapshot()));
    }

    result?;
    output::success("Wallet connected");
    println!();
    println!("{}", output::session_table(&ctx.controller.snapshot()));

    Ok(())
}
