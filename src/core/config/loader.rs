#![allow(clippy::result_large_err)]

use super::validation::ConfigValidator;
use super::{FlowportConfig, CONFIG_FILE};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/flowport.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_workspace(workspace_path: &Path) -> Result<FlowportConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();

        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<FlowportConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: FlowportConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("FP-CONFIG-001")
        })?;

        tracing::debug!(path = %path.display(), "configuration file loaded");
        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values; unparsable values are ignored
    pub fn apply_env_overrides(config: &mut FlowportConfig) {
        if let Ok(value) = env::var("FLOWPORT_FILES_TO_DELTA_SINKS") {
            if let Ok(flag) = value.parse::<bool>() {
                config.translation.files_to_delta_sinks = Some(flag);
            }
        }

        if let Ok(scope) = env::var("FLOWPORT_SECRET_SCOPE") {
            config.translation.secret_scope = scope;
        }

        if let Ok(root) = env::var("FLOWPORT_NOTEBOOK_ROOT") {
            config.translation.notebook_root = root;
        }

        if let Ok(timezone_id) = env::var("FLOWPORT_TIMEZONE_ID") {
            config.translation.timezone_id = timezone_id;
        }

        if let Ok(value) = env::var("FLOWPORT_DEFAULT_NUM_WORKERS") {
            if let Ok(workers) = value.parse::<u32>() {
                config.translation.default_num_workers = workers;
            }
        }

        if let Ok(dir) = env::var("FLOWPORT_SOURCE_DIR") {
            config.source.export_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = env::var("FLOWPORT_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(dir);
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "FLOWPORT_FILES_TO_DELTA_SINKS - Force declarative pipelines for file copies (true/false)",
            "FLOWPORT_SECRET_SCOPE - Override the secret scope (default: flowport_credentials)",
            "FLOWPORT_NOTEBOOK_ROOT - Override the notebook folder (default: /Shared/flowport)",
            "FLOWPORT_TIMEZONE_ID - Override the schedule time zone (default: UTC)",
            "FLOWPORT_DEFAULT_NUM_WORKERS - Override the default worker count (default: 1)",
            "FLOWPORT_SOURCE_DIR - Override the factory export directory (default: .)",
            "FLOWPORT_OUTPUT_DIR - Override the output directory (default: flowport-out)",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &FlowportConfig) -> Result<(), AppError> {
        ConfigValidator::validate(config)
    }
}
