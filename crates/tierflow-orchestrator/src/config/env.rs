//! Environment variable configuration for tierflow services
//!
//! This module provides centralized configuration management through environment variables
//! with sensible defaults. Unparsable values fall back to the default.

use std::env;
use std::str::FromStr;
use tierflow_constants::{
    DEFAULT_EVENT_BUS_CAPACITY, DEFAULT_LEARNING_RATE, DEFAULT_MAX_TOKENS, DEFAULT_STEP_TIMEOUT_MS,
};
use tierflow_types::StrategyType;

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| T::from_str(s.trim()).ok())
}

/// Step executor configuration from environment variables
pub mod executor {
    use super::*;

    /// Get the step result timeout in milliseconds
    pub fn step_timeout_ms() -> u64 {
        parsed("TIERFLOW_STEP_TIMEOUT_MS").unwrap_or(DEFAULT_STEP_TIMEOUT_MS)
    }

    /// Get the token budget handed to the execution engine
    pub fn max_tokens() -> u32 {
        parsed("TIERFLOW_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Event bus configuration from environment variables
pub mod event_bus {
    use super::*;

    /// Get the per-topic buffer size of the in-memory bus
    pub fn capacity() -> usize {
        parsed("TIERFLOW_EVENT_BUS_CAPACITY").unwrap_or(DEFAULT_EVENT_BUS_CAPACITY)
    }
}

/// Strategy provider configuration from environment variables
pub mod strategy {
    use super::*;

    /// Get the default strategy
    pub fn default_strategy() -> StrategyType {
        env::var("TIERFLOW_DEFAULT_STRATEGY")
            .ok()
            .and_then(|s| StrategyType::from_manifest(&s))
            .unwrap_or(StrategyType::Conversational)
    }

    /// Get whether adaptive selection is enabled
    pub fn adaptation_enabled() -> bool {
        parsed("TIERFLOW_STRATEGY_ADAPTATION").unwrap_or(false)
    }

    /// Get the adaptation learning rate. Values outside `0.0..=1.0` fall
    /// back to the default.
    pub fn learning_rate() -> f64 {
        parsed("TIERFLOW_STRATEGY_LEARNING_RATE")
            .filter(|rate: &f64| (0.0..=1.0).contains(rate))
            .unwrap_or(DEFAULT_LEARNING_RATE)
    }
}
