//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{get_logger, get_satchel_dir, log_command};
use satchel_core::config::Config;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let satchel_dir = get_satchel_dir()?;
    std::fs::create_dir_all(&satchel_dir)?;
    log_command(&get_logger(), "demo");

    // Settings file only, so environment overrides are not written back
    let mut config = Config::load_with_env(&satchel_dir, |_| None)?;

    match command {
        Some(DemoCommands::On) => {
            config.enable_demo_mode();
            config.save(&satchel_dir)?;
            println!("{}", "Demo mode enabled".green());
            println!(
                "A built-in wallet with 10 test ETH is now available. Run 'satchel connect' to use it."
            );
            println!("{}", "Demo balances reset every time satchel starts.".dimmed());
            Ok(())
        }
        Some(DemoCommands::Off) => {
            config.disable_demo_mode();
            config.save(&satchel_dir)?;
            println!("{}", "Demo mode disabled".yellow());
            Ok(())
        }
        Some(DemoCommands::Status) | None => {
            if config.demo_mode {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
            Ok(())
        }
    }
}
