//! Configuration management for Switchboard.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.switchboard/config.yaml` or `SWITCHBOARD_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! All persisted state (uploads, passage indexes, the audit log) lives under
//! the workspace's `.switchboard/` directory unless the config file says
//! otherwise.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Completion providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "gemini"];

/// Embedding providers the document library knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Environment variable consulted for the Gemini key when none is configured.
pub const DEFAULT_GEMINI_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .switchboard/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("ollama" or "gemini")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// API key for the completion provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Completion provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding settings for the passage index
    pub embedding: EmbeddingSettings,

    /// HTTP server settings
    pub server: ServerSettings,

    /// Where uploads, indexes and the audit log are kept
    pub storage: StorageSettings,

    /// Retrieval agent settings
    pub agents: AgentSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Gemini { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Gemini { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Request timeout in seconds, if any.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            ProviderConfig::Gemini { timeout, .. } | ProviderConfig::Ollama { timeout, .. } => {
                *timeout
            }
        }
    }
}

/// Embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// "trigram" (offline, deterministic) or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Vector dimensions
    pub dimensions: usize,

    /// Endpoint override for remote providers
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Socket address to bind
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Storage locations. Relative paths resolve against the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    #[serde(rename = "uploadsDir", default)]
    pub uploads_dir: Option<PathBuf>,

    #[serde(rename = "indexDir", default)]
    pub index_dir: Option<PathBuf>,

    #[serde(rename = "auditLog", default)]
    pub audit_log: Option<PathBuf>,
}

/// Retrieval agent settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    #[serde(rename = "webEndpoint")]
    pub web_endpoint: String,

    #[serde(rename = "paperEndpoint")]
    pub paper_endpoint: String,

    #[serde(rename = "webMaxResults")]
    pub web_max_results: usize,

    #[serde(rename = "paperMaxResults")]
    pub paper_max_results: usize,

    #[serde(rename = "documentTopK")]
    pub document_top_k: usize,

    /// Per-request timeout for the web and paper agents
    #[serde(rename = "requestTimeoutSecs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            web_endpoint: "https://api.duckduckgo.com".to_string(),
            paper_endpoint: "http://export.arxiv.org/api/query".to_string(),
            web_max_results: 5,
            paper_max_results: 3,
            document_top_k: 4,
            request_timeout_secs: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    embedding: Option<EmbeddingSettings>,
    server: Option<ServerSettings>,
    storage: Option<StorageSettings>,
    agents: Option<PartialAgentSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PartialAgentSettings {
    #[serde(rename = "webEndpoint")]
    web_endpoint: Option<String>,
    #[serde(rename = "paperEndpoint")]
    paper_endpoint: Option<String>,
    #[serde(rename = "webMaxResults")]
    web_max_results: Option<usize>,
    #[serde(rename = "paperMaxResults")]
    paper_max_results: Option<usize>,
    #[serde(rename = "documentTopK")]
    document_top_k: Option<usize>,
    #[serde(rename = "requestTimeoutSecs")]
    request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            json_logs: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            agents: AgentSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, and environment.
    ///
    /// Environment variables:
    /// - `SWITCHBOARD_WORKSPACE`: Override workspace path
    /// - `SWITCHBOARD_CONFIG`: Path to config file
    /// - `SWITCHBOARD_PROVIDER`: Completion provider
    /// - `SWITCHBOARD_MODEL`: Model identifier
    /// - `SWITCHBOARD_API_KEY`: API key
    /// - `SWITCHBOARD_BIND`: HTTP bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use switchboard_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `SWITCHBOARD_WORKSPACE` and `SWITCHBOARD_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("SWITCHBOARD_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("SWITCHBOARD_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.switchboard_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SWITCHBOARD_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("SWITCHBOARD_MODEL") {
            config.model = model;
        }

        if let Ok(bind) = std::env::var("SWITCHBOARD_BIND") {
            config.server.bind = bind;
        }

        config.api_key = std::env::var("SWITCHBOARD_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.json_logs = json;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(storage) = config_file.storage {
            result.storage = storage;
        }

        if let Some(agents) = config_file.agents {
            let current = &mut result.agents;
            if let Some(v) = agents.web_endpoint {
                current.web_endpoint = v;
            }
            if let Some(v) = agents.paper_endpoint {
                current.paper_endpoint = v;
            }
            if let Some(v) = agents.web_max_results {
                current.web_max_results = v;
            }
            if let Some(v) = agents.paper_max_results {
                current.paper_max_results = v;
            }
            if let Some(v) = agents.document_top_k {
                current.document_top_k = v;
            }
            if agents.request_timeout_secs.is_some() {
                current.request_timeout_secs = agents.request_timeout_secs;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        json_logs: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if json_logs {
            self.json_logs = true;
        }

        self
    }

    /// Get the path to the .switchboard directory.
    pub fn switchboard_dir(&self) -> PathBuf {
        self.workspace.join(".switchboard")
    }

    /// Ensure the .switchboard directory exists.
    pub fn ensure_switchboard_dir(&self) -> AppResult<()> {
        let dir = self.switchboard_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .switchboard directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Directory that receives uploaded documents.
    pub fn uploads_dir(&self) -> PathBuf {
        self.resolve(self.storage.uploads_dir.as_deref(), "uploads")
    }

    /// Root directory of the per-document passage indexes.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(self.storage.index_dir.as_deref(), "index")
    }

    /// Path of the append-only routing audit log.
    pub fn audit_log_path(&self) -> PathBuf {
        self.resolve(
            self.storage.audit_log.as_deref(),
            "logs/controller_log.jsonl",
        )
    }

    fn resolve(&self, configured: Option<&Path>, default_rel: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.workspace.join(path),
            None => self.switchboard_dir().join(default_rel),
        }
    }

    /// Get a provider configuration by name.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Endpoint override for the active provider.
    pub fn provider_endpoint(&self) -> Option<String> {
        self.get_provider_config(&self.provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Completion timeout for the active provider.
    pub fn provider_timeout(&self) -> Option<u64> {
        self.get_provider_config(&self.provider)
            .and_then(|pc| pc.timeout())
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: `SWITCHBOARD_API_KEY`, the provider's `apiKeyEnv`, then
    /// `GOOGLE_API_KEY` for Gemini.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => Some(api_key_env),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "gemini" => Some(DEFAULT_GEMINI_KEY_ENV.to_string()),
            None => None,
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "gemini" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (SWITCHBOARD_API_KEY or apiKeyEnv)"
                    .to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.agents.document_top_k, 4);
        assert!(!config.verbose);
    }

    #[test]
    fn test_default_storage_paths() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/work");

        assert_eq!(config.uploads_dir(), PathBuf::from("/work/.switchboard/uploads"));
        assert_eq!(config.index_dir(), PathBuf::from("/work/.switchboard/index"));
        assert_eq!(
            config.audit_log_path(),
            PathBuf::from("/work/.switchboard/logs/controller_log.jsonl")
        );
    }

    #[test]
    fn test_relative_storage_paths_resolve_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/work");
        config.storage.uploads_dir = Some(PathBuf::from("uploads"));
        config.storage.audit_log = Some(PathBuf::from("/var/log/routes.jsonl"));

        assert_eq!(config.uploads_dir(), PathBuf::from("/work/uploads"));
        assert_eq!(config.audit_log_path(), PathBuf::from("/var/log/routes.jsonl"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("gemini".to_string()),
            Some("gemini-2.5-flash".to_string()),
            None,
            true,
            false,
            true,
        );

        assert_eq!(overridden.provider, "gemini");
        assert_eq!(overridden.model, "gemini-2.5-flash");
        assert!(overridden.verbose);
        assert!(overridden.json_logs);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: gemini
  providers:
    gemini:
      apiKeyEnv: MY_GEMINI_KEY
      model: gemini-2.5-flash
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
server:
  bind: 0.0.0.0:9000
agents:
  paperMaxResults: 5
logging:
  level: debug
  json: true
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "gemini");
        assert_eq!(merged.model, "gemini-2.5-flash");
        assert_eq!(merged.server.bind, "0.0.0.0:9000");
        assert_eq!(merged.agents.paper_max_results, 5);
        assert_eq!(merged.agents.web_max_results, 5);
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.json_logs);
        assert!(matches!(
            merged.get_provider_config("ollama"),
            Some(ProviderConfig::Ollama { .. })
        ));
    }

    #[test]
    fn test_load_from_reads_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("switchboard.yaml");
        std::fs::write(&path, "agents:\n  documentTopK: 7\n  requestTimeoutSecs: 20\n").unwrap();

        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), Some(path.clone()))
            .unwrap();

        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.agents.document_top_k, 7);
        assert_eq!(config.agents.request_timeout_secs, Some(20));
        assert_eq!(config.agents.web_max_results, 5);
    }

    #[test]
    fn test_load_from_missing_workspace() {
        let result = AppConfig::load_from(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [unterminated").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = AppConfig::default();
        config.api_key = Some("explicit".to_string());
        assert_eq!(config.resolve_api_key("gemini"), Some("explicit".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_gemini_with_key() {
        let mut config = AppConfig::default();
        config.provider = "gemini".to_string();
        config.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "faiss".to_string();
        assert!(config.validate().is_err());
    }
}
