//! Disconnect command - forget the session until the next connect

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context("disconnect")?;
    ctx.controller.disconnect();

    output::success("Wallet disconnected");
    println!(
        "{}",
        "The account will not be resumed automatically. Run 'satchel connect' to reconnect."
            .dimmed()
    );

    Ok(())
}
