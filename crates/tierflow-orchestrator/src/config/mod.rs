//! Configuration for the orchestration core
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file) or, for the strategy provider, from a YAML/JSON document.

pub mod env;

use crate::error::{OrchestratorError, Result};
use std::path::Path;
use std::sync::Once;
use tierflow_constants::{DEFAULT_MAX_TOKENS, DEFAULT_STEP_TIMEOUT_MS};
use tierflow_types::StrategyFactoryConfig;
use tracing::debug;

static DOTENV: Once = Once::new();

/// Load `.env` into the process environment once. A missing file is fine.
pub fn load_dotenv() {
    DOTENV.call_once(|| match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!("No .env loaded: {}", e),
    });
}

/// Step executor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// How long to wait for a correlated `execution.result`
    pub step_timeout_ms: u64,
    /// Token budget written into every execution context
    pub default_max_tokens: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ExecutorConfig {
    /// Config with a custom timeout and default token budget
    pub fn with_timeout_ms(step_timeout_ms: u64) -> Self {
        Self {
            step_timeout_ms,
            ..Self::default()
        }
    }

    /// Read settings from the environment
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            step_timeout_ms: env::executor::step_timeout_ms(),
            default_max_tokens: env::executor::max_tokens(),
        }
    }
}

/// Loading and validation for [`StrategyFactoryConfig`]
pub trait StrategyConfigExt: Sized {
    /// Read settings from the environment
    fn from_env() -> Self;

    /// Parse a YAML document
    fn from_yaml_str(yaml: &str) -> Result<Self>;

    /// Load from a `.json`, `.yaml` or `.yml` file
    fn from_file(path: impl AsRef<Path>) -> Result<Self>;

    /// Check value ranges
    fn validate(&self) -> Result<()>;
}

impl StrategyConfigExt for StrategyFactoryConfig {
    fn from_env() -> Self {
        load_dotenv();
        StrategyFactoryConfig::new(env::strategy::default_strategy()).with_adaptation(
            env::strategy::adaptation_enabled(),
            env::strategy::learning_rate(),
        )
    }

    fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: StrategyFactoryConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: StrategyFactoryConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
            other => {
                return Err(OrchestratorError::config(format!(
                    "unsupported strategy config format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        config.validate()?;
        debug!(path = %path.display(), default = %config.default_strategy, "Loaded strategy config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(OrchestratorError::config(format!(
                "learning_rate must be within [0, 1], got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
