pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toml_config::TomlConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "syscode-sync")]
#[command(about = "Reconciles asset-management group membership against a device CSV")]
pub struct CliConfig {
    /// Device CSV with columns Name, Fully qualified domain name, SysCode
    #[arg(long)]
    pub csv_file: String,

    /// Base URL of the asset-management API, e.g. https://assets.example.com/api/v1
    #[arg(long, default_value = "")]
    pub api_base_url: String,

    /// Bearer token for the API; prefer the TOML config with ${VAR} expansion
    #[arg(long)]
    pub api_token: Option<String>,

    /// Maximum candidates fetched per asset name lookup (minimum 10, so
    /// same-named assets stay disambiguable by FQDN)
    #[arg(long, default_value = "10")]
    pub member_search_limit: usize,

    /// Attempts when verifying that a freshly created group is readable
    #[arg(long, default_value = "3")]
    pub verify_attempts: u32,

    /// Delay in seconds between verification attempts
    #[arg(long, default_value = "3")]
    pub verify_delay_seconds: u64,

    /// Optional TOML config file; values set there override CLI values
    #[arg(long)]
    pub config_file: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Overlays values from a TOML config file. Only fields present in the
    /// file are replaced.
    pub fn apply_toml(&mut self, file: &TomlConfig) {
        if let Some(api) = &file.api {
            if let Some(base_url) = &api.base_url {
                self.api_base_url = base_url.clone();
            }
            if let Some(token) = &api.token {
                self.api_token = Some(token.clone());
            }
            if let Some(limit) = api.member_search_limit {
                self.member_search_limit = limit;
            }
        }
        if let Some(sync) = &file.sync {
            if let Some(attempts) = sync.verify_attempts {
                self.verify_attempts = attempts;
            }
            if let Some(delay) = sync.verify_delay_seconds {
                self.verify_delay_seconds = delay;
            }
        }
    }
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn csv_path(&self) -> &str {
        &self.csv_file
    }

    fn member_search_limit(&self) -> usize {
        self.member_search_limit
    }

    fn verify_attempts(&self) -> u32 {
        self.verify_attempts
    }

    fn verify_delay(&self) -> Duration {
        Duration::from_secs(self.verify_delay_seconds)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("csv_file", &self.csv_file)?;
        validate_path("csv_file", &self.csv_file)?;
        validate_url("api_base_url", &self.api_base_url)?;
        validate_positive_number("member_search_limit", self.member_search_limit, 10)?;
        validate_positive_number("verify_attempts", self.verify_attempts as usize, 1)?;
        Ok(())
    }
}
