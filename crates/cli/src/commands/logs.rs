//! Logs command handler.
//!
//! Prints the routing audit log.

use clap::Args;
use switchboard_agents::{AuditLog, AuditRecord};
use switchboard_core::{config::AppConfig, AppResult};

/// Show routing decisions
#[derive(Args, Debug)]
pub struct LogsCommand {
    /// Only show the most recent N records
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LogsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing logs command");

        let log = AuditLog::new(config.audit_log_path());
        let mut records = log.read_all()?;

        if let Some(limit) = self.limit {
            let skip = records.len().saturating_sub(limit);
            records.drain(..skip);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No routing decisions recorded yet.");
            return Ok(());
        }

        for record in &records {
            println!("{}", format_record(record));
        }

        Ok(())
    }
}

fn format_record(record: &AuditRecord) -> String {
    format!(
        "{}  {:?} -> [{}]  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.query,
        record.decision.agents.join(", "),
        record.decision.reasoning
    )
}
