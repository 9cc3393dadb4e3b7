use crate::utils::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration file. Values set here override the CLI
/// defaults; anything omitted falls back to the command line.
///
/// ```toml
/// [api]
/// base_url = "https://assets.example.com/api/v1"
/// token = "${ASSET_API_TOKEN}"
/// member_search_limit = 10
///
/// [sync]
/// verify_attempts = 3
/// verify_delay_seconds = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: Option<ApiSection>,
    pub sync: Option<SyncSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub member_search_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    pub verify_attempts: Option<u32>,
    pub verify_delay_seconds: Option<u64>,
}

impl TomlConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| SyncError::ConfigError {
            message: format!("Invalid TOML config: {}", e),
        })
    }
}

/// Replaces `${VAR}` references with the environment variable's value, so
/// tokens can be supplied via the environment instead of being written to
/// disk. Unset variables are left as-is.
fn expand_env_vars(content: &str) -> String {
    use regex::Regex;

    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    result.to_string()
}
