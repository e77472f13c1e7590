//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use satchel_core::{SessionSnapshot, SessionState};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn state_label(state: SessionState) -> String {
    match state {
        SessionState::Connected => "Connected".green().to_string(),
        SessionState::Disconnected => "Disconnected".yellow().to_string(),
        SessionState::Connecting => "Connecting".cyan().to_string(),
        SessionState::SendingTransaction => "Sending transaction".cyan().to_string(),
    }
}

/// Vertical key-value table describing the session
pub fn session_table(snapshot: &SessionSnapshot) -> Table {
    let mut table = create_table();
    table.add_row(vec!["State".to_string(), state_label(snapshot.state)]);

    if let Some(address) = &snapshot.account_address {
        table.add_row(vec!["Account".to_string(), address.clone()]);
    }
    if let Some(balance) = &snapshot.balance_ether {
        table.add_row(vec!["Balance".to_string(), format!("{} ETH", balance)]);
    }
    if let Some(network) = &snapshot.network_name {
        let chain = snapshot
            .chain_id
            .map(|id| format!(" (chain {})", id))
            .unwrap_or_default();
        table.add_row(vec!["Network".to_string(), format!("{}{}", network, chain)]);
    }
    if let Some(status) = &snapshot.transaction_status {
        table.add_row(vec!["Last transaction".to_string(), status.clone()]);
    }

    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
