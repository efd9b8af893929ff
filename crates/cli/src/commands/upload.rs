//! Upload command handler.
//!
//! Copies a PDF into the uploads directory and builds its passage index.

use clap::Args;
use std::path::PathBuf;
use switchboard_core::{config::AppConfig, AppError, AppResult};
use switchboard_knowledge::DocumentLibrary;

/// Upload and index a PDF document
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UploadCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing upload command");

        let filename = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Not a file path: {}", self.path.display()))
            })?
            .to_string();

        // Reject before reading the file.
        DocumentLibrary::validate_upload_name(&filename)?;

        let bytes = std::fs::read(&self.path)?;
        let library = DocumentLibrary::from_config(config)?;
        let receipt = library.upload(&filename, &bytes).await?;
        let stats = library.stats(&DocumentLibrary::identity(&self.path)?)?;

        if self.json {
            let output = serde_json::json!({
                "filename": receipt.filename,
                "detail": receipt.detail,
                "index": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}: {}", receipt.filename, receipt.detail);
            println!(
                "Index '{}': {} passages, {} bytes",
                stats.identity, stats.passages_count, stats.db_size_bytes
            );
        }

        Ok(())
    }
}
