use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use confyg::{env, Confygery};
use searchica_core::EXAMPLE_QUERY;
use serde::{Deserialize, Serialize};

/// Keys accepted by `config get` and `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_base_url",
    "initial_query",
    "show_onboarding",
    "request_timeout_secs",
    "retry.max_retries",
    "retry.min_delay_ms",
];

/// Configuration for searchica.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SEARCHICA_* prefix)
/// 3. Config file (~/.config/searchica/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the search service; `/api/search` is appended to it.
    ///
    /// Can be set via:
    /// - CLI: --api-url http://host:5000
    /// - ENV: SEARCHICA_API_BASE_URL
    /// - Config: api_base_url = "..."
    pub api_base_url: String,

    /// Query issued when the interactive UI starts.
    pub initial_query: String,

    /// Show the welcome dialog when the interactive UI starts.
    pub show_onboarding: bool,

    /// Per-request timeout in seconds; `0` waits indefinitely.
    pub request_timeout_secs: u64,

    pub retry: RetrySettings,
}

/// Retry settings for transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Additional attempts after the first one; `0` disables retries.
    pub max_retries: usize,
    /// Delay before the first retry, doubled for each further one.
    pub min_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            initial_query: EXAMPLE_QUERY.to_string(),
            show_onboarding: true,
            request_timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay_ms: 200,
        }
    }
}

impl Config {
    /// Load configuration from the default config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `config_path` (if it exists) and from
    /// `SEARCHICA_*` environment variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("searchica");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        log::debug!("loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Apply a `--api-url` override.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        self
    }

    /// Look up a value by one of the [`CONFIG_KEYS`].
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api_base_url" => self.api_base_url.clone(),
            "initial_query" => self.initial_query.clone(),
            "show_onboarding" => self.show_onboarding.to_string(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "retry.max_retries" => self.retry.max_retries.to_string(),
            "retry.min_delay_ms" => self.retry.min_delay_ms.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}\n\nValid keys: {}",
        key,
        CONFIG_KEYS.join(", ")
    )
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/searchica/config.toml
/// - macOS: ~/Library/Application Support/searchica/config.toml
/// - Windows: %APPDATA%\searchica\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("searchica")
        .join("config.toml")
}

/// Default log file for the interactive UI.
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("searchica")
        .join("searchica.log")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Searchica Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SEARCHICA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Base URL of the search service. Requests go to <api_base_url>/api/search.
#
# Can also be set via:
# - CLI: searchica --api-url http://search.example.com
# - Environment: SEARCHICA_API_BASE_URL=http://search.example.com
api_base_url = "http://localhost:5000"

# Query issued when the interactive UI starts
#initial_query = "evidence of criminal activity"

# Show the welcome dialog on start (also: searchica tui --skip-intro)
show_onboarding = true

# Per-request timeout in seconds; 0 waits indefinitely
#request_timeout_secs = 30

# Retries for connection failures and timeouts
[retry]
#max_retries = 2
#min_delay_ms = 200
"#
}

/// Create the default config file at `config_path` if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

/// Set `key` to `value` in the config file at `config_path`, creating the
/// file first if needed. Comments and layout of the file are preserved.
pub fn set_value(config_path: &Path, key: &str, value: &str) -> Result<()> {
    ensure_config_file(config_path)?;

    let contents =
        std::fs::read_to_string(config_path).context("Failed to read config file")?;
    let mut doc: toml_edit::DocumentMut = contents
        .parse()
        .context("Config file is not valid TOML")?;

    let item = match key {
        "api_base_url" | "initial_query" => toml_edit::value(value),
        "show_onboarding" => toml_edit::value(
            value
                .parse::<bool>()
                .with_context(|| format!("{} expects true or false", key))?,
        ),
        "request_timeout_secs" | "retry.max_retries" | "retry.min_delay_ms" => {
            let number = value
                .parse::<u32>()
                .with_context(|| format!("{} expects a non-negative integer", key))?;
            toml_edit::value(i64::from(number))
        }
        _ => return Err(unknown_key(key)),
    };

    match key.split_once('.') {
        Some((table, field)) => doc[table][field] = item,
        None => doc[key] = item,
    }

    std::fs::write(config_path, doc.to_string()).context("Failed to write config file")?;
    Ok(())
}
