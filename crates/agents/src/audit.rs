//! Append-only log of routing decisions.
//!
//! One JSON object per line. Each record is written with a single
//! `write_all` on a freshly opened append handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use switchboard_core::{AppError, AppResult};

use crate::types::RoutingDecision;

/// One routing decision as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub decision: RoutingDecision,
}

impl AuditRecord {
    pub fn new(query: impl Into<String>, decision: RoutingDecision) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.into(),
            decision,
        }
    }
}

/// Newline-delimited JSON audit log at a fixed path.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and its directory on first use.
    pub fn append(&self, record: &AuditRecord) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    /// All records in write order. A missing log reads as empty.
    pub fn read_all(&self) -> AppResult<Vec<AuditRecord>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut records = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(line = number + 1, "Skipping malformed audit record: {}", e)
                }
            }
        }

        Ok(records)
    }
}
