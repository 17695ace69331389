//! Configuration management for the aixp CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (.aixp/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. The workspace directory holds `.aixp/`, which also stores
//! local indexes when the `local` index backend is selected.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default aiXplain platform API.
pub const DEFAULT_BACKEND_URL: &str = "https://platform-api.aixplain.com";

/// Default aiXplain model execution API (indexes are run as models).
pub const DEFAULT_MODELS_URL: &str = "https://models.aixplain.com/api/v1/execute";

/// Index backends understood by the knowledge crate.
pub const KNOWN_INDEX_BACKENDS: [&str; 2] = ["aixplain", "local"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .aixp/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// aiXplain API key (`AIXPLAIN_API_KEY`)
    pub api_key: Option<String>,

    /// aiXplain platform settings
    pub aixplain: AixplainConfig,

    /// Index backend ("aixplain" or "local")
    pub index_backend: String,

    /// Chunking settings for ingestion
    pub chunking: ChunkingConfig,

    /// Maximum chunks per ingestion call
    pub ingest_batch_size: usize,

    /// Timeout for outbound HTTP calls, in seconds
    pub http_timeout_secs: u64,

    /// Slack incoming webhook for notifications
    pub slack_webhook: Option<String>,

    /// CourtListener API token
    pub courtlistener_token: Option<String>,

    /// Language for interactive prompts ("en", "ar")
    pub lang: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// aiXplain platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AixplainConfig {
    #[serde(rename = "backendUrl", default = "default_backend_url")]
    pub backend_url: String,

    #[serde(rename = "modelsUrl", default = "default_models_url")]
    pub models_url: String,

    /// LLM backing the agent
    #[serde(rename = "llmId", default)]
    pub llm_id: Option<String>,

    /// Reuse an existing agent instead of creating one
    #[serde(rename = "agentId", default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub tool: ToolConfig,

    /// Upper bound on one agent run, polling included
    #[serde(rename = "runTimeoutSecs", default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

/// Optional model tool attached to the agent.
///
/// `id` takes precedence; otherwise `function` (with optional `supplier`)
/// selects a tool by capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

/// Chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(rename = "maxLen", default = "default_max_len")]
    pub max_len: usize,

    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_models_url() -> String {
    DEFAULT_MODELS_URL.to_string()
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_max_len() -> usize {
    1000
}

fn default_overlap() -> usize {
    150
}

impl Default for AixplainConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            models_url: default_models_url(),
            llm_id: None,
            agent_id: None,
            tool: ToolConfig::default(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            overlap: default_overlap(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    aixplain: Option<AixplainConfig>,
    index: Option<IndexSection>,
    chunking: Option<ChunkingConfig>,
    ingest: Option<IngestSection>,
    http: Option<HttpSection>,
    notify: Option<NotifySection>,
    logging: Option<LoggingSection>,
    lang: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexSection {
    backend: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IngestSection {
    #[serde(rename = "batchSize")]
    batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HttpSection {
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NotifySection {
    #[serde(rename = "slackWebhook")]
    slack_webhook: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            aixplain: AixplainConfig::default(),
            index_backend: "aixplain".to_string(),
            chunking: ChunkingConfig::default(),
            ingest_batch_size: 100,
            http_timeout_secs: 30,
            slack_webhook: None,
            courtlistener_token: None,
            lang: crate::i18n::DEFAULT_LANG.to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// Read a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `AIXP_WORKSPACE`, `AIXP_CONFIG`: workspace and config file
    /// - `AIXPLAIN_API_KEY`: platform API key
    /// - `AIXPLAIN_BACKEND_URL`, `AIXPLAIN_MODELS_URL`: endpoints
    /// - `AIXPLAIN_LLM_ID`, `AIXPLAIN_AGENT_ID`: agent settings
    /// - `AIXPLAIN_TOOL_ID`, `AIXPLAIN_TOOL_FUNCTION`, `AIXPLAIN_TOOL_SUPPLIER`: agent tool
    /// - `AIXP_INDEX_BACKEND`: "aixplain" or "local"
    /// - `SLACK_WEBHOOK_URL`, `COURTLISTENER_TOKEN`
    /// - `AIXP_LANG`, `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use aixp_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like `load`, with an explicit workspace and config file taking
    /// precedence over `AIXP_WORKSPACE` and `AIXP_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_var("AIXP_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        if let Some(config_file) =
            config_file.or_else(|| env_var("AIXP_CONFIG").map(PathBuf::from))
        {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.aixp_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Some(key) = env_var("AIXPLAIN_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = env_var("AIXPLAIN_BACKEND_URL") {
            self.aixplain.backend_url = url;
        }
        if let Some(url) = env_var("AIXPLAIN_MODELS_URL") {
            self.aixplain.models_url = url;
        }
        if let Some(llm_id) = env_var("AIXPLAIN_LLM_ID") {
            self.aixplain.llm_id = Some(llm_id);
        }
        if let Some(agent_id) = env_var("AIXPLAIN_AGENT_ID") {
            self.aixplain.agent_id = Some(agent_id);
        }
        if let Some(tool_id) = env_var("AIXPLAIN_TOOL_ID") {
            self.aixplain.tool.id = Some(tool_id);
        }
        if let Some(function) = env_var("AIXPLAIN_TOOL_FUNCTION") {
            self.aixplain.tool.function = Some(function);
        }
        if let Some(supplier) = env_var("AIXPLAIN_TOOL_SUPPLIER") {
            self.aixplain.tool.supplier = Some(supplier);
        }
        if let Some(backend) = env_var("AIXP_INDEX_BACKEND") {
            self.index_backend = backend;
        }
        if let Some(webhook) = env_var("SLACK_WEBHOOK_URL") {
            self.slack_webhook = Some(webhook);
        }
        if let Some(token) = env_var("COURTLISTENER_TOKEN") {
            self.courtlistener_token = Some(token);
        }
        if let Some(lang) = env_var("AIXP_LANG") {
            self.lang = lang;
        }
        if let Some(level) = env_var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(aixplain) = config_file.aixplain {
            result.aixplain = aixplain;
        }

        if let Some(backend) = config_file.index.and_then(|i| i.backend) {
            result.index_backend = backend;
        }

        if let Some(chunking) = config_file.chunking {
            result.chunking = chunking;
        }

        if let Some(batch_size) = config_file.ingest.and_then(|i| i.batch_size) {
            result.ingest_batch_size = batch_size;
        }

        if let Some(timeout) = config_file.http.and_then(|h| h.timeout_secs) {
            result.http_timeout_secs = timeout;
        }

        if let Some(webhook) = config_file.notify.and_then(|n| n.slack_webhook) {
            result.slack_webhook = Some(webhook);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(lang) = config_file.lang {
            result.lang = lang;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        index_backend: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(backend) = index_backend {
            self.index_backend = backend;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .aixp directory.
    pub fn aixp_dir(&self) -> PathBuf {
        self.workspace.join(".aixp")
    }

    /// Directory holding local SQLite indexes.
    pub fn local_index_dir(&self) -> PathBuf {
        self.aixp_dir().join("indexes")
    }

    /// Ensure the .aixp directory exists.
    pub fn ensure_aixp_dir(&self) -> AppResult<()> {
        let dir = self.aixp_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .aixp directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Return the API key or a configuration error naming the variable.
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Config(
                "AIXPLAIN_API_KEY is not set. Export it or add it to your environment.".to_string(),
            )
        })
    }

    /// Validate configuration for the selected backend.
    pub fn validate(&self) -> AppResult<()> {
        let backend = self.index_backend.as_str();
        if !KNOWN_INDEX_BACKENDS.contains(&backend) {
            return Err(AppError::Config(format!(
                "Unknown index backend: {}. Supported: {}",
                backend,
                KNOWN_INDEX_BACKENDS.join(", ")
            )));
        }

        if self.chunking.max_len == 0 {
            return Err(AppError::Config(
                "chunking.maxLen must be greater than zero".to_string(),
            ));
        }

        if self.chunking.overlap >= self.chunking.max_len {
            return Err(AppError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.maxLen ({})",
                self.chunking.overlap, self.chunking.max_len
            )));
        }

        if self.ingest_batch_size == 0 {
            return Err(AppError::Config(
                "ingest.batchSize must be greater than zero".to_string(),
            ));
        }

        if backend == "aixplain" {
            self.require_api_key()?;
        }

        Ok(())
    }
}
