//! Serve command handler.

use clap::Args;
use switchboard_core::{config::AppConfig, AppResult};
use switchboard_server::{serve, AppState};

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default: server.bind from config)
    #[arg(short, long, env = "SWITCHBOARD_BIND")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let state = AppState::from_config(config)?;
        serve(state, bind).await
    }
}
