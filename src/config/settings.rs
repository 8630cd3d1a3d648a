//! Configuration settings for ytsum.

use crate::error::{Result, YtsumError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub database: DatabaseSettings,
    pub models: ModelSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub chat: ChatSettings,
    pub server: ServerSettings,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Log level used when none is configured explicitly.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for downloads, transcripts and summaries.
    pub data_dir: String,
    /// Deployment environment.
    pub environment: Environment,
    /// Log level override (trace, debug, info, warn, error).
    pub log_level: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.ytsum".to_string(),
            environment: Environment::Development,
            log_level: None,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "~/.ytsum/ytsum.db".to_string(),
        }
    }
}

/// Models used by the upstream pipeline. Recorded here so every surface
/// reports the same identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: String,
    pub transcription: String,
    pub summary: String,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            transcription: "whisper-large-v3-turbo".to_string(),
            summary: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model name.
    pub model: String,
    /// Dimensions of the fallback (zero) embedding.
    pub dimensions: usize,
    /// Base URL of the NVIDIA OpenAI-compatible API.
    pub nvidia_api_base: String,
    /// Base URL of the HuggingFace inference API.
    pub huggingface_api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            nvidia_api_base: "https://integrate.api.nvidia.com/v1".to_string(),
            huggingface_api_base: "https://api-inference.huggingface.co".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Summary search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Default number of results.
    pub k: usize,
    /// Minimum cosine similarity for a hit.
    pub similarity_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 5,
            similarity_threshold: 0.2,
        }
    }
}

/// Chat history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Default number of chat turns returned per session.
    pub history_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// URL the API is reachable at from clients.
    pub public_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            public_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = get("ENVIRONMENT") {
            // Anything but production runs as development
            self.general.environment = env.parse::<Environment>().unwrap_or_else(|e| {
                warn!("{}; using development", e);
                Environment::Development
            });
        }
        if let Some(dir) = get("YTSUM_DATA_DIR") {
            self.general.data_dir = dir;
        }
        if let Some(path) = get("YTSUM_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(model) = get("VECTOR_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(provider) = get("MODEL_PROVIDER") {
            self.models.provider = provider;
        }
        if let Some(k) = get("RETRIEVAL_K") {
            self.retrieval.k = k
                .trim()
                .parse()
                .map_err(|_| YtsumError::Config(format!("RETRIEVAL_K is not a number: {}", k)))?;
        }
        if let Some(url) = get("PUBLIC_URL") {
            self.server.public_url = url;
        }

        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| YtsumError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytsum")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.general
            .log_level
            .as_deref()
            .unwrap_or_else(|| self.general.environment.default_log_level())
    }

    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir().join("downloads")
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.data_dir().join("transcripts")
    }

    pub fn summaries_dir(&self) -> PathBuf {
        self.data_dir().join("summaries")
    }

    /// Get the expanded SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.database.path)
    }

    /// All application directories, keyed by name.
    pub fn paths(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("data_dir", self.data_dir()),
            ("downloads_dir", self.downloads_dir()),
            ("transcripts_dir", self.transcripts_dir()),
            ("summaries_dir", self.summaries_dir()),
        ]
    }

    /// Create the application directories.
    pub fn initialize(&self) -> Result<()> {
        for (_, dir) in self.paths() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// API credentials. Read from the environment only and never serialized.
#[derive(Clone, Default)]
pub struct Credentials {
    pub groq_api_key: Option<String>,
    pub nvidia_api_key: Option<String>,
    pub huggingface_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials using `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            groq_api_key: get("GROQ_API_KEY"),
            nvidia_api_key: get("NVIDIA_API_KEY"),
            huggingface_token: get("HF_TOKEN").or_else(|| get("HUGGINGFACEHUB_API_TOKEN")),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("groq_api_key", &mask(&self.groq_api_key))
            .field("nvidia_api_key", &mask(&self.nvidia_api_key))
            .field("huggingface_token", &mask(&self.huggingface_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.environment, Environment::Development);
        assert_eq!(settings.log_level(), "debug");
        assert_eq!(settings.retrieval.k, 5);
        assert_eq!(settings.embedding.dimensions, 384);
        assert_eq!(settings.server.public_url, "http://localhost:8000");
        assert!(settings.downloads_dir().ends_with("downloads"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ENVIRONMENT", "production"),
            ("RETRIEVAL_K", "8"),
            ("VECTOR_EMBEDDING_MODEL", "nvidia/nv-embedqa-e5-v5"),
            ("PUBLIC_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.general.environment, Environment::Production);
        assert_eq!(settings.log_level(), "info");
        assert_eq!(settings.retrieval.k, 8);
        assert_eq!(settings.embedding.model, "nvidia/nv-embedqa-e5-v5");
        // Empty values are ignored.
        assert_eq!(settings.server.public_url, "http://localhost:8000");
    }

    #[test]
    fn test_unknown_environment_is_development() {
        let mut settings = Settings::default();
        settings.general.environment = Environment::Production;
        settings
            .apply_env(|k| (k == "ENVIRONMENT").then(|| "staging".to_string()))
            .unwrap();
        assert_eq!(settings.general.environment, Environment::Development);
        assert_eq!(settings.log_level(), "debug");
    }

    #[test]
    fn test_bad_retrieval_k() {
        let mut settings = Settings::default();
        let result = settings.apply_env(|k| (k == "RETRIEVAL_K").then(|| "many".to_string()));
        assert!(matches!(result, Err(YtsumError::Config(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.chat.history_limit = 25;
        settings.general.log_level = Some("warn".to_string());
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = toml::from_str(&content).unwrap();
        assert_eq!(loaded.chat.history_limit, 25);
        assert_eq!(loaded.log_level(), "warn");
    }

    #[test]
    fn test_credentials_masked() {
        let creds = Credentials::from_lookup(|k| (k == "NVIDIA_API_KEY").then(|| "nv-secret".to_string()));
        assert_eq!(creds.nvidia_api_key.as_deref(), Some("nv-secret"));
        assert!(creds.huggingface_token.is_none());
        assert!(!format!("{:?}", creds).contains("nv-secret"));
    }
}
