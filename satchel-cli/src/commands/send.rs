//! Send command - transfer ether to another address

use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use satchel_core::TransferRequest;

use super::{auto_resume, get_context, print_json_outcome};
use crate::output;

fn spinner(message: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

pub async fn run(
    to: &str,
    amount: &str,
    timeout_secs: Option<u64>,
    yes: bool,
    json: bool,
) -> Result<()> {
    let ctx = get_context("send")?;
    auto_resume(&ctx, json).await;

    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(ctx.config.confirmation_timeout);
    let request = TransferRequest::new(to, amount);

    if json {
        let result = ctx.controller.send_transfer_with_timeout(&request, timeout).await;
        return print_json_outcome(result);
    }

    let session = ctx.controller.session();
    let Some(from) = session.account_address.as_deref() else {
        bail!("No wallet connected. Run 'satchel connect' first.");
    };

    // Validate before prompting so typos fail fast
    let transfer = request.validate()?;
    ctx.controller.stage_transfer(request.clone())?;

    if !yes {
        println!();
        println!("  From:   {}", from);
        println!("  To:     {}", transfer.recipient);
        println!("  Amount: {} ETH", transfer.value.to_ether_string());
        if let Some(network) = session.network_name() {
            println!("  Network: {}", network);
        }
        println!();

        if !Confirm::new()
            .with_prompt("Send this transaction?")
            .default(false)
            .interact()?
        {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let bar = if atty::is(atty::Stream::Stdout) {
        Some(spinner("Waiting for the wallet to sign and the transaction to be mined...")?)
    } else {
        None
    };

    let result = ctx.controller.send_transfer_with_timeout(&request, timeout).await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let sent = result?;
    output::success(&format!("Transaction sent: {}", sent.transaction_hash));
    if let Some(block) = sent.block_number {
        println!("{}", format!("Mined in block {}", block).dimmed());
    }

    if let Some(balance) = ctx.controller.session().balance_ether() {
        println!("Balance: {} ETH", balance);
    }

    Ok(())
}
