//! Satchel CLI - a wallet session in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{connect, demo, disconnect, logs, refresh, send, status};

/// Satchel - connect a wallet, check its balance and send ether
#[derive(Parser)]
#[command(name = "satchel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wallet session, resuming the remembered account
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect to the wallet and request account access
    Connect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Disconnect and stop resuming the account automatically
    Disconnect,

    /// Send ether to another address
    Send {
        /// Recipient address (0x followed by 40 hex digits)
        to: String,
        /// Amount in ether, e.g. 0.5
        amount: String,
        /// Seconds to wait for the transaction to be mined
        #[arg(long)]
        timeout: Option<u64>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-read balance and network for the connected account
    Refresh {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json).await,
        Commands::Connect { json } => connect::run(json).await,
        Commands::Disconnect => disconnect::run(),
        Commands::Send { to, amount, timeout, yes, json } => {
            send::run(&to, &amount, timeout, yes, json).await
        }
        Commands::Refresh { json } => refresh::run(json).await,
        Commands::Demo { command } => demo::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
