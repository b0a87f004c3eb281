//! `load_config` module: reads the static YAML config and injects secrets from the environment.
//!
//! The YAML file holds only non-sensitive settings. The access token and file
//! URL come from `FIGMA_ACCESS_TOKEN` and `FIGMA_FILE_URL`; `main` loads a
//! `.env` file into the environment before this runs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metamatch_core::storage::DEFAULT_MAX_SNAPSHOT_BYTES;
use metamatch_core::validate::{
    extract_node_id_from_url, validate_and_extract_file_id, validate_token,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::figma_client::FIGMA_API_BASE_URL;

pub const TOKEN_ENV: &str = "FIGMA_ACCESS_TOKEN";
pub const FILE_URL_ENV: &str = "FIGMA_FILE_URL";

/// Non-secret settings, as written in the YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_css_dir")]
    pub css_dir: PathBuf,
    #[serde(default)]
    pub max_snapshot_bytes: Option<usize>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_css_dir() -> PathBuf {
    PathBuf::from("css")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    FIGMA_API_BASE_URL.to_string()
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            css_dir: default_css_dir(),
            max_snapshot_bytes: None,
            request_timeout_secs: default_request_timeout_secs(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl StaticConfig {
    pub fn snapshot_limit(&self) -> usize {
        self.max_snapshot_bytes.unwrap_or(DEFAULT_MAX_SNAPSHOT_BYTES)
    }
}

/// Credentials and target file, taken from the environment.
#[derive(Clone, PartialEq)]
pub struct FigmaSettings {
    pub token: String,
    pub file_url: String,
    pub file_id: String,
    /// `node-id` query parameter of the file URL, if any.
    pub url_node_id: Option<String>,
}

impl std::fmt::Debug for FigmaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FigmaSettings")
            .field("token", &"<redacted>")
            .field("file_url", &self.file_url)
            .field("file_id", &self.file_id)
            .field("url_node_id", &self.url_node_id)
            .finish()
    }
}

/// Reads and parses the YAML file; a missing path yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<StaticConfig> {
    let Some(path_ref) = path else {
        info!("No config file given, using defaults");
        return Ok(StaticConfig::default());
    };
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let config: StaticConfig = serde_yaml::from_str(&content)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            e
        })
        .context("Failed to parse config YAML")?;

    info!(
        data_dir = %config.data_dir.display(),
        css_dir = %config.css_dir.display(),
        request_timeout_secs = config.request_timeout_secs,
        "Config loaded"
    );
    Ok(config)
}

/// Reads and validates the access token and file URL from the environment.
pub fn load_figma_settings() -> Result<FigmaSettings> {
    let token = env::var(TOKEN_ENV).ok();
    validate_token(token.as_deref())
        .map_err(|e| {
            error!(error = %e, "Invalid {TOKEN_ENV}");
            e
        })
        .with_context(|| format!("{TOKEN_ENV} is not usable"))?;

    let file_url = env::var(FILE_URL_ENV).ok();
    let file_id = validate_and_extract_file_id(file_url.as_deref())
        .map_err(|e| {
            error!(error = %e, "Invalid {FILE_URL_ENV}");
            e
        })
        .with_context(|| format!("{FILE_URL_ENV} is not usable"))?;

    let url_node_id = extract_node_id_from_url(file_url.as_deref());
    info!(file_id = %file_id, url_node_id = ?url_node_id, "Figma settings loaded from environment");

    Ok(FigmaSettings {
        token: token.unwrap_or_default(),
        file_url: file_url.unwrap_or_default(),
        file_id,
        url_node_id,
    })
}
