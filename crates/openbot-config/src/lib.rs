//! openbot-config: environment-keyed bot configuration.
//!
//! Configuration lives in a single `env.json` document holding one block per
//! environment plus a default environment name:
//!
//! ```json
//! {
//!     "env": "dev",
//!     "dev":  { "token": "...", "guild": 123456789012345678 },
//!     "prod": { "token": "...", "guild": 987654321098765432 }
//! }
//! ```
//!
//! The active environment is the last command-line argument when one is
//! given, otherwise the `env` field. A missing file or unknown environment
//! is fatal at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "env.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("environment {0:?} not defined in config")]
    UnknownEnv(String),
}

/// One environment block of `env.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvConfig {
    /// Discord bot token.
    pub token: String,
    /// Guild the bot's commands are scoped to.
    pub guild: u64,
}

/// The whole `env.json` document.
#[derive(Debug, Clone, Deserialize)]
struct EnvFile {
    /// Default environment name, used when no CLI override is given.
    env: String,
    /// Environment blocks keyed by name.
    #[serde(flatten)]
    environments: HashMap<String, EnvConfig>,
}

/// Resolved configuration for the active environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: String,
    pub token: String,
    pub guild: u64,
}

impl Settings {
    /// Path of the per-environment SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(format!("storage-{}.sqlite", self.env))
    }
}

/// Pick the active environment name: the last CLI argument wins, otherwise
/// the document's `env` field.
fn select_env(default_env: &str, env_override: Option<&str>) -> String {
    match env_override {
        Some(name) => name.to_string(),
        None => default_env.to_string(),
    }
}

/// Load configuration from the default path.
pub fn load(env_override: Option<&str>) -> Result<Settings, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    load_from(Path::new(DEFAULT_CONFIG_PATH), env_override)
}

/// Load configuration from a specific path and resolve the active
/// environment. Errors here are fatal to the caller: there is no usable
/// default for a missing token or guild.
pub fn load_from(path: &Path, env_override: Option<&str>) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: EnvFile = serde_json::from_str(&content)?;

    let env = select_env(&file.env, env_override);
    let block = file
        .environments
        .get(&env)
        .ok_or_else(|| ConfigError::UnknownEnv(env.clone()))?;

    tracing::debug!(env, guild = block.guild, "Loaded configuration");

    Ok(Settings {
        env,
        token: block.token.clone(),
        guild: block.guild,
    })
}
