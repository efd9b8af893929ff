//! Command handlers for the Switchboard CLI.

pub mod ask;
pub mod logs;
pub mod serve;
pub mod upload;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use logs::LogsCommand;
pub use serve::ServeCommand;
pub use upload::UploadCommand;
