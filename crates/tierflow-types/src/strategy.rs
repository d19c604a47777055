//! Strategy Types
//!
//! Categories of execution engine a step can be routed to, and the
//! configuration of the strategy provider.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tierflow_constants::{
    DEFAULT_LEARNING_RATE, REASON_DEFAULT_FALLBACK, REASON_MANIFEST_DECLARED,
    REASON_STEP_TYPE_HEURISTIC,
};

/// Execution strategy category
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Open-ended, dialogue driven execution
    #[strum(serialize = "conversational")]
    Conversational,
    /// Multi-step structured reasoning
    #[strum(serialize = "reasoning")]
    Reasoning,
    /// Fixed, reproducible execution without free-form generation
    #[strum(serialize = "deterministic")]
    Deterministic,
}

impl StrategyType {
    /// All strategy types
    pub fn all() -> [StrategyType; 3] {
        [
            StrategyType::Conversational,
            StrategyType::Reasoning,
            StrategyType::Deterministic,
        ]
    }

    /// Parse a manifest string, ignoring case and surrounding whitespace
    pub fn from_manifest(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Why a strategy was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// The step manifest declared a strategy
    ManifestDeclared,
    /// The step type name pointed at a strategy
    StepTypeHeuristic,
    /// Nothing matched; the configured default was used
    DefaultFallback,
}

impl SelectionReason {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionReason::ManifestDeclared => REASON_MANIFEST_DECLARED,
            SelectionReason::StepTypeHeuristic => REASON_STEP_TYPE_HEURISTIC,
            SelectionReason::DefaultFallback => REASON_DEFAULT_FALLBACK,
        }
    }
}

/// Strategy provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyFactoryConfig {
    /// Strategy used when nothing else applies
    pub default_strategy: StrategyType,
    /// Ordered alternatives if the default is unavailable (reserved)
    #[serde(default = "default_fallback_chain")]
    pub fallback_chain: Vec<StrategyType>,
    /// Enable adaptive selection (reserved)
    #[serde(default)]
    pub adaptation_enabled: bool,
    /// Adaptation learning rate (reserved)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_fallback_chain() -> Vec<StrategyType> {
    vec![StrategyType::Reasoning, StrategyType::Deterministic]
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl Default for StrategyFactoryConfig {
    fn default() -> Self {
        Self {
            default_strategy: StrategyType::Conversational,
            fallback_chain: default_fallback_chain(),
            adaptation_enabled: false,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl StrategyFactoryConfig {
    /// Create config with the given default strategy
    pub fn new(default_strategy: StrategyType) -> Self {
        Self {
            default_strategy,
            ..Self::default()
        }
    }

    /// Set fallback chain and return self for chaining
    pub fn with_fallback_chain(mut self, chain: Vec<StrategyType>) -> Self {
        self.fallback_chain = chain;
        self
    }

    /// Set adaptation parameters and return self for chaining
    pub fn with_adaptation(mut self, enabled: bool, learning_rate: f64) -> Self {
        self.adaptation_enabled = enabled;
        self.learning_rate = learning_rate;
        self
    }
}
