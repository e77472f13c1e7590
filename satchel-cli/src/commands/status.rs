//! Status command - show the wallet session

use anyhow::Result;
use colored::Colorize;

use super::{auto_resume, get_context};
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context("status")?;
    auto_resume(&ctx, json).await;

    let snapshot = ctx.controller.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Wallet Session".bold());
    println!();
    println!("{}", output::session_table(&snapshot));

    if let Some(provider) = ctx.controller.provider_name() {
        println!("{}", format!("Wallet: {}", provider).dimmed());
    }

    if !snapshot.state.is_busy() && snapshot.account_address.is_none() {
        println!();
        if snapshot.user_disconnected {
            println!("{}", "Disconnected by user. Run 'satchel connect' to reconnect.".dimmed());
        } else {
            println!("{}", "No wallet connected. Run 'satchel connect' to connect.".dimmed());
        }
    }

    Ok(())
}
