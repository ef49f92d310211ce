use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loaded from fixpls.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_completion_url")]
    pub url: String,
    /// Model name to use
    #[serde(default = "default_model")]
    pub model: String,
    /// Timeout in seconds for API requests
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: default_completion_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_completion_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

/// Repair loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Maximum executions of the wrapped command
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Files shorter than this many characters are sent whole
    #[serde(default = "default_whole_file_threshold")]
    pub whole_file_threshold: usize,
    /// Lines above and below the diagnostic line sent for larger files
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
    /// Maximum in-flight completion requests per iteration (0 = unlimited)
    #[serde(default)]
    pub max_concurrent_requests: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            whole_file_threshold: default_whole_file_threshold(),
            window_radius: default_window_radius(),
            max_concurrent_requests: 0,
        }
    }
}

fn default_max_iterations() -> usize {
    5
}

fn default_whole_file_threshold() -> usize {
    1000
}

fn default_window_radius() -> usize {
    5
}

/// Behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Refuse to run when the git working tree has uncommitted changes
    #[serde(default = "default_require_clean_tree")]
    pub require_clean_tree: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            require_clean_tree: default_require_clean_tree(),
        }
    }
}

fn default_require_clean_tree() -> bool {
    true
}

/// CLI overrides merged on top of the file configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub url: Option<String>,
    pub timeout: Option<u64>,
    pub max_iterations: Option<usize>,
    pub allow_dirty: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Try to load config from fixpls.toml in the given directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join("fixpls.toml");
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI overrides into the config
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(m) = overrides.model {
            self.completion.model = m;
        }
        if let Some(u) = overrides.url {
            self.completion.url = u;
        }
        if let Some(t) = overrides.timeout {
            self.completion.timeout_seconds = t;
        }
        if let Some(n) = overrides.max_iterations {
            self.repair.max_iterations = n;
        }
        if overrides.allow_dirty {
            self.behavior.require_clean_tree = false;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, toml::de::Error),
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}
