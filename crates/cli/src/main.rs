//! Switchboard CLI
//!
//! Main entry point for the switchboard command-line tool.
//! Routes questions to document, web and paper retrieval agents.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, LogsCommand, ServeCommand, UploadCommand};
use switchboard_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use tracing::Instrument;

/// Switchboard - route questions to the right retrieval agents
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(about = "Route questions to document, web and paper retrieval agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SWITCHBOARD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SWITCHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Completion provider (ollama, gemini)
    #[arg(short, long, global = true, env = "SWITCHBOARD_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SWITCHBOARD_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Ask a question
    Ask(AskCommand),

    /// Upload and index a PDF document
    Upload(UploadCommand),

    /// Show routing decisions
    Logs(LogsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Ask(_) => "ask",
            Commands::Upload(_) => "upload",
            Commands::Logs(_) => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the chosen workspace, config file and environment
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.json_logs,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.json_logs)?;

    tracing::info!("Switchboard CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_switchboard_dir()?;

    let span = tracing::info_span!("command", name = cli.command.name());
    let result = async {
        match cli.command {
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Upload(cmd) => cmd.execute(&config).await,
            Commands::Logs(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_document() {
        let cli = Cli::try_parse_from([
            "switchboard",
            "ask",
            "what does this document say?",
            "--document",
            "x.pdf",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.query, "what does this document say?");
                assert_eq!(cmd.document.as_deref(), Some("x.pdf"));
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["switchboard", "logs", "-n", "5", "--provider", "gemini"])
            .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("gemini"));
        assert_eq!(cli.command.name(), "logs");
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["switchboard", "ask"]).is_err());
    }
}
