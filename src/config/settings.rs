use crate::security::MatchMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Hosted text-generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-3.5-turbo",
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }

    pub fn default_key_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LLMConfig,
    pub shell: ShellConfig,
    pub daemon: DaemonConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: Provider,
    /// Falls back to the provider's default model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Falls back to the provider's usual key variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override the provider endpoint (self-hosted OpenAI-compatible servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ShellConfig {
    pub program: String,
    /// Run confirmed commands through sudo
    pub elevate: bool,
    pub log_path: PathBuf,
    pub capture_output: bool,
    pub explain_failures: bool,
    pub denylist_mode: MatchMode,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DaemonConfig {
    pub trigger_file: PathBuf,
    pub poll_interval_ms: u64,
    /// Defaults to this executable with `once`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_program: Option<String>,
    pub launch_args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub user_agent: String,
    pub fetch_timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: None,
            api_key_env: None,
            api_key: None,
            base_url: None,
            timeout_seconds: 30,
        }
    }
}

impl LLMConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_key_env())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "bash".to_string(),
            elevate: true,
            log_path: PathBuf::from("rayi.log"),
            capture_output: false,
            explain_failures: false,
            denylist_mode: MatchMode::Substring,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            trigger_file: PathBuf::from("ray_input.txt"),
            poll_interval_ms: 1000,
            launch_program: None,
            launch_args: vec!["once".to_string()],
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            user_agent: "Mozilla/5.0".to_string(),
            fetch_timeout_seconds: 8,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("rayi"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load and validate an existing file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // May hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model().trim().is_empty() {
            return Err(ConfigError::InvalidValue("llm.model must not be empty".to_string()));
        }

        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "llm.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if let Some(ref base_url) = self.llm.base_url
            && url::Url::parse(base_url).is_err()
        {
            return Err(ConfigError::InvalidValue(format!(
                "llm.base_url is not a valid URL: {}",
                base_url
            )));
        }

        if self.shell.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "shell.program must not be empty".to_string(),
            ));
        }

        if self.daemon.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "daemon.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results == 0 {
            return Err(ConfigError::InvalidValue(
                "search.max_results must be greater than 0".to_string(),
            ));
        }

        if self.search.fetch_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "search.fetch_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get API key from environment variable or config
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(self.llm.key_env())
            && !key.is_empty()
        {
            return Some(key);
        }

        self.llm.api_key.clone()
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }
}
