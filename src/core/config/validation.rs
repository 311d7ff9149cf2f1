#![allow(clippy::result_large_err)]

use super::FlowportConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

fn invalid(message: &str) -> AppError {
    AppError::new(ErrorCategory::ConfigurationError, message)
        .with_code("FP-CONFIG-001")
        .with_suggestion("Fix the value in flowport.toml or the FLOWPORT_* environment")
}

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &FlowportConfig) -> Result<(), AppError> {
        let translation = &config.translation;
        if translation.secret_scope.trim().is_empty() {
            return Err(invalid("translation.secret_scope cannot be empty"));
        }

        if !translation.notebook_root.starts_with('/') {
            return Err(invalid("translation.notebook_root must be an absolute workspace path"));
        }

        if translation.timezone_id.trim().is_empty() {
            return Err(invalid("translation.timezone_id cannot be empty"));
        }

        if translation.default_num_workers == 0 {
            return Err(invalid("translation.default_num_workers must be at least 1"));
        }

        if config.output.dir.as_os_str().is_empty() {
            return Err(invalid("output.dir cannot be empty"));
        }

        Ok(())
    }
}
