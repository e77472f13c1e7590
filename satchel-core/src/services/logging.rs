//! Logging service - structured event logging to DuckDB
//!
//! Stores wallet session events in logs.duckdb. Privacy-safe: no account
//! addresses, balances or transfer amounts are ever logged.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;

    // Lower 16 bits carry the counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Current unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    /// Library embedded in another front-end
    Embedded,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Embedded => "embedded",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            provider: None,
            command: None,
            error_kind: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the wallet provider name (e.g. "json-rpc", "demo")
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub provider: Option<String>,
    pub command: Option<String>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

const SELECT_COLUMNS: &str = "SELECT id, timestamp, entry_point, app_version, platform, \
     event, provider, command, error_kind, error_message, error_details FROM sys_logs";

fn row_to_entry(row: &Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        platform: row.get(4)?,
        event: row.get(5)?,
        provider: row.get(6)?,
        command: row.get(7)?,
        error_kind: row.get(8)?,
        error_message: row.get(9)?,
        error_details: row.get(10)?,
    })
}

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Create a new logging service
    ///
    /// Opens or creates logs.duckdb in the satchel directory and runs
    /// any pending migrations.
    pub fn new(
        satchel_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = satchel_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        };

        service.run_migrations()?;

        Ok(service)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        let table_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM information_schema.tables WHERE table_name = 'sys_migrations'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        // Bootstrap migrations table if needed
        if !table_exists {
            if let Some((name, sql)) = LOG_MIGRATIONS.iter().find(|(n, _)| *n == "000_migrations.sql")
            {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                    [name],
                )?;
            }
        }

        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let applied: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        for (name, sql) in LOG_MIGRATIONS.iter() {
            if *name == "000_migrations.sql" {
                continue;
            }
            if !applied.iter().any(|a| a == name) {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                    [name],
                )?;
            }
        }

        Ok(())
    }

    /// Log an event
    ///
    /// entry_point, app_version and platform are filled in from the
    /// service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, provider, command, error_kind, error_message, error_details
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.provider,
                &event.command,
                &event.error_kind,
                &event.error_message,
                &event.error_details,
            ],
        )?;

        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    /// Log a CLI command execution
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;
        let entries = stmt
            .query_map([limit as i64], row_to_entry)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Most recent entries that carry an error, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE error_message IS NOT NULL ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;
        let entries = stmt
            .query_map([limit as i64], row_to_entry)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Total number of log entries
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
