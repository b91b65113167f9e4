//! Compiler configuration.
//!
//! Settings are fixed for one build. [`CompilerConfig::from_env`] reads
//! overrides from the environment:
//!
//! - `ORI_CHECK_MODE`: `enforce` (default), `observe` or `ignore`
//! - `ORI_ERROR_LIMIT`: maximum number of errors reported (0 = unlimited)

use std::num::ParseIntError;

use ori_diagnostic::DiagnosticConfig;
use ori_ir::{CheckMode, CheckModeParseError};

pub const CHECK_MODE_VAR: &str = "ORI_CHECK_MODE";
pub const ERROR_LIMIT_VAR: &str = "ORI_ERROR_LIMIT";

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ORI_CHECK_MODE: {source}")]
    CheckMode {
        #[from]
        source: CheckModeParseError,
    },
    #[error("invalid ORI_ERROR_LIMIT `{value}`: {source}")]
    ErrorLimit {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    /// How `pre_check`/`post_check` are compiled.
    pub check_mode: CheckMode,
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            check_mode: CheckMode::Enforce,
            error_limit: DiagnosticConfig::default().error_limit,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_check_mode(mut self, mode: CheckMode) -> Self {
        self.check_mode = mode;
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    /// Defaults overridden by `ORI_CHECK_MODE` and `ORI_ERROR_LIMIT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`CompilerConfig::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(mode) = var(CHECK_MODE_VAR) {
            config.check_mode = mode.parse()?;
        }
        if let Some(limit) = var(ERROR_LIMIT_VAR) {
            config.error_limit = limit
                .trim()
                .parse()
                .map_err(|source| ConfigError::ErrorLimit {
                    value: limit.clone(),
                    source,
                })?;
        }
        Ok(config)
    }

    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            ..DiagnosticConfig::default()
        }
    }
}
