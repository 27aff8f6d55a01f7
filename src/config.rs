//! Configuration loading and validation.
//!
//! Everything lives under `~/.pogovorim/`:
//! - `config.toml`: provider, trial, history, telegram and storage settings
//! - `.env`: secrets (provider API key, bot token)
//! - `logs/`: rotated JSON logs
//!
//! A missing `config.toml` means all defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::access::DEFAULT_TRIAL_DAYS;
use crate::profile::HISTORY_LIMIT;
use crate::providers::openai::{DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::reply::DEFAULT_TEMPERATURE;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion provider settings.
    pub provider: ProviderConfig,
    /// Trial window.
    pub trial: TrialConfig,
    /// Conversation history bound.
    pub history: HistoryConfig,
    /// Telegram transport.
    pub telegram: TelegramConfig,
    /// Profile persistence.
    pub storage: StorageConfig,
}

/// OpenAI-compatible chat-completions provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Response length cap in tokens.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key_env: "DEEPSEEK_API_KEY".to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 60,
        }
    }
}

/// Trial window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Trial length in days.
    pub days: u32,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_TRIAL_DAYS,
        }
    }
}

/// History settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum stored turns per participant.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: HISTORY_LIMIT,
        }
    }
}

/// Telegram-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Environment variable name holding the bot token.
    pub bot_token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "BOT_TOKEN".to_owned(),
        }
    }
}

/// Which profile store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document.
    #[default]
    Json,
    /// SQLite database.
    Sqlite,
    /// Process memory only.
    Memory,
}

/// Profile persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind.
    pub backend: StorageBackend,
    /// Store location; relative paths resolve against the runtime root.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Absolute location of the store for `paths`.
    pub fn resolve_path(&self, paths: &RuntimePaths) -> PathBuf {
        let path = match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, StorageBackend::Sqlite) => PathBuf::from("profiles.db"),
            (None, StorageBackend::Json | StorageBackend::Memory) => PathBuf::from("db.json"),
        };
        if path.is_absolute() {
            path
        } else {
            paths.root.join(path)
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the bot cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoint = url::Url::parse(&self.provider.endpoint)
            .with_context(|| format!("invalid provider endpoint {:?}", self.provider.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!(
                "provider endpoint must be http or https, got {}",
                endpoint.scheme()
            );
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            anyhow::bail!(
                "provider temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            );
        }
        if self.provider.max_tokens == 0 {
            anyhow::bail!("provider max_tokens must be positive");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider timeout_secs must be positive");
        }
        if self.history.limit == 0 {
            anyhow::bail!("history limit must be at least 1");
        }
        if self.trial.days == 0 {
            anyhow::bail!("trial days must be at least 1");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::info!(path = %path.display(), "loading config from file");
            Config::from_toml(&contents)
                .with_context(|| format!("invalid config at {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

// ---------------------------------------------------------------------------
// Runtime paths
// ---------------------------------------------------------------------------

/// Filesystem layout of a runtime root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    /// Root directory (`~/.pogovorim`).
    pub root: PathBuf,
    /// `config.toml` location.
    pub config_toml: PathBuf,
    /// `.env` location.
    pub env_file: PathBuf,
    /// Log directory.
    pub logs_dir: PathBuf,
}

impl RuntimePaths {
    /// Layout rooted at `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_toml: root.join("config.toml"),
            env_file: root.join(".env"),
            logs_dir: root.join("logs"),
            root,
        }
    }

    /// Layout for an explicit config file: the root is the file's directory.
    pub fn for_config_file(config_toml: &Path) -> Self {
        let root = config_toml
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            config_toml: config_toml.to_path_buf(),
            ..Self::under(root)
        }
    }
}

/// Resolve the default runtime root (`~/.pogovorim/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".pogovorim"))
}

/// Default runtime layout.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    Ok(RuntimePaths::under(config_dir()?))
}
