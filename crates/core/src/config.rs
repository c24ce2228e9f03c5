//! Configuration management for the guide RAG tool.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! - Built-in defaults (the values the pipelines were designed around)
//! - `guide.yaml` in the workspace (or the file named by `GUIDE_CONFIG`)
//! - Environment variables (a `.env` file is loaded first)
//! - Command-line flags
//!
//! The vector store directory is the only state shared between the
//! ingestion and query commands.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the API key for the embedding and chat services.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Default config file name, relative to the workspace.
pub const CONFIG_FILE_NAME: &str = "guide.yaml";

/// Providers understood by the embedding and LLM factories.
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["openai", "mock"];
const KNOWN_LLM_PROVIDERS: [&str; 1] = ["openai"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root; relative paths below are resolved against it
    pub workspace: PathBuf,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Vector store directory
    pub store_dir: PathBuf,

    /// Ingestion settings
    pub ingest: IngestSettings,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Chat model settings
    pub llm: LlmSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,

    /// API key for the embedding and chat services
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSettings {
    /// PDF ingested when no path is given on the command line
    pub pdf_path: PathBuf,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("openai" or "mock")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Vector dimension produced by the model
    pub dimensions: usize,

    /// Texts per embeddings request
    pub batch_size: usize,
}

/// Chat model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Service base URL (shared with the embedding provider)
    pub endpoint: String,
}

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("guide.pdf"),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            batch_size: 100,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            endpoint: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Full configuration file structure. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    store: Option<StoreSection>,
    ingest: Option<IngestSection>,
    embedding: Option<EmbeddingSection>,
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestSection {
    pdf_path: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    top_k: Option<usize>,
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
            store_dir: PathBuf::from("vector_db"),
            ingest: IngestSettings::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            retrieval: RetrievalSettings::default(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// Environment variables:
    /// - `GUIDE_WORKSPACE`: Workspace path (when `workspace` is `None`)
    /// - `GUIDE_CONFIG`: Config file path (when `config_file` is `None`)
    /// - `GUIDE_STORE`: Vector store directory
    /// - `GUIDE_MODEL`: Chat model identifier
    /// - `GUIDE_EMBEDDING_MODEL`: Embedding model identifier
    /// - `OPENAI_API_KEY`: API key
    /// - `OPENAI_BASE_URL`: Service base URL
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// A missing API key is not an error here; commands call
    /// [`AppConfig::require_api_key`] before doing any work.
    ///
    /// # Example
    /// ```no_run
    /// use guide_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Store: {:?}", config.store_path());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env file is fine; variables may come from the shell
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("Failed to load .env file: {}", e)));
            }
        }

        let workspace = workspace
            .or_else(|| std::env::var("GUIDE_WORKSPACE").ok().map(PathBuf::from));
        let config_file =
            config_file.or_else(|| std::env::var("GUIDE_CONFIG").ok().map(PathBuf::from));

        let mut config = Self::load_from(workspace, config_file)?;
        config.apply_env();
        Ok(config)
    }

    /// Build configuration from defaults and the config file only.
    ///
    /// An explicitly named config file must exist; the default
    /// `guide.yaml` is merged only when present.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if !config.workspace.is_dir() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = config.workspace.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config.merge_yaml(&path)?;
            config.config_file = Some(path);
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        // An empty file deserializes to unit, not to a struct
        if contents.trim().is_empty() {
            return Ok(());
        }

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(path) = file.store.and_then(|s| s.path) {
            self.store_dir = path;
        }

        if let Some(ingest) = file.ingest {
            if let Some(pdf_path) = ingest.pdf_path {
                self.ingest.pdf_path = pdf_path;
            }
            if let Some(size) = ingest.chunk_size {
                self.ingest.chunk_size = size;
            }
            if let Some(overlap) = ingest.chunk_overlap {
                self.ingest.chunk_overlap = overlap;
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                self.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                self.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                self.embedding.dimensions = dimensions;
            }
            if let Some(batch_size) = embedding.batch_size {
                self.embedding.batch_size = batch_size;
            }
        }

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(endpoint) = llm.endpoint {
                self.llm.endpoint = endpoint;
            }
        }

        if let Some(top_k) = file.retrieval.and_then(|r| r.top_k) {
            self.retrieval.top_k = top_k;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Environment variables override the config file.
    fn apply_env(&mut self) {
        if let Ok(store) = std::env::var("GUIDE_STORE") {
            self.store_dir = PathBuf::from(store);
        }

        if let Ok(model) = std::env::var("GUIDE_MODEL") {
            self.llm.model = model;
        }

        if let Ok(model) = std::env::var("GUIDE_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Ok(endpoint) = std::env::var(BASE_URL_ENV) {
            self.llm.endpoint = endpoint;
        }

        self.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if self.log_level.is_none() {
            self.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        store_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(store_dir) = store_dir {
            self.store_dir = store_dir;
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

    /// Resolve a path against the workspace unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Absolute path of the vector store directory.
    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store_dir)
    }

    /// Absolute path of the default PDF.
    pub fn pdf_path(&self) -> PathBuf {
        self.resolve(&self.ingest.pdf_path)
    }

    /// Return the API key, failing when it is not configured.
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Config(format!("{} not found in environment variables", API_KEY_ENV))
        })
    }

    /// Validate settings that the pipelines depend on.
    pub fn validate(&self) -> AppResult<()> {
        if self.ingest.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be greater than 0".to_string()));
        }

        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding dimensions and batchSize must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}
