//! Strategy Module
//!
//! Decides which category of execution engine should handle a step,
//! replaces unsafe choices for sensitive data, and reports every decision
//! on the event channel.

use std::fmt;
use std::sync::Arc;
use tierflow_types::StrategyType;

pub mod provider;
pub mod strategies;

pub use provider::StrategyProvider;
pub use strategies::{
    ConversationalStrategy, DefaultStrategyFactory, DeterministicStrategy, ReasoningStrategy,
};

/// Free-form hints from the caller, forwarded to telemetry untouched
pub type UsageHints = serde_json::Value;

/// An execution strategy instance. How it executes is up to the engine;
/// the orchestration core only selects and caches it.
pub trait ExecutionStrategy: Send + Sync + fmt::Debug {
    /// Category this strategy belongs to
    fn strategy_type(&self) -> StrategyType;

    /// Get strategy name for logging
    fn name(&self) -> &'static str;

    /// Short human readable description
    fn description(&self) -> &'static str;
}

/// Builds strategy instances on first use
pub trait StrategyFactory: Send + Sync {
    fn create(&self, strategy_type: StrategyType) -> Arc<dyn ExecutionStrategy>;
}

impl<F> StrategyFactory for F
where
    F: Fn(StrategyType) -> Arc<dyn ExecutionStrategy> + Send + Sync,
{
    fn create(&self, strategy_type: StrategyType) -> Arc<dyn ExecutionStrategy> {
        self(strategy_type)
    }
}

/// Helper functions for strategy selection
pub mod helpers {
    use tierflow_types::{ExecutionContext, SelectionReason, StrategyType};
    use tracing::{debug, warn};

    /// Outcome of the declared-strategy and step-type rules
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StrategyDecision {
        /// Strategy string from the manifest, if any
        pub declared: Option<String>,
        /// Chosen strategy before the safety check
        pub strategy: StrategyType,
        pub reason: SelectionReason,
    }

    /// Safety replacement of a chosen strategy
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SafetyOverride {
        pub original: StrategyType,
        pub replacement: StrategyType,
    }

    /// Pick a strategy from the manifest declaration, else from the step
    /// type name, else the default. Never fails.
    pub fn select_strategy_type(
        context: &ExecutionContext,
        default_strategy: StrategyType,
    ) -> StrategyDecision {
        if let Some(declared) = context.config.declared_strategy() {
            let strategy = match StrategyType::from_manifest(declared) {
                Some(strategy) => strategy,
                None => {
                    warn!(
                        step_id = %context.step_id,
                        declared = %declared,
                        default = %default_strategy,
                        "Unknown declared strategy, using default"
                    );
                    default_strategy
                }
            };
            return StrategyDecision {
                declared: Some(declared.to_string()),
                strategy,
                reason: SelectionReason::ManifestDeclared,
            };
        }

        let (strategy, reason) = match strategy_for_step_type(&context.step_type) {
            Some(strategy) => (strategy, SelectionReason::StepTypeHeuristic),
            None => (default_strategy, SelectionReason::DefaultFallback),
        };
        debug!(
            step_id = %context.step_id,
            step_type = %context.step_type,
            strategy = %strategy,
            reason = reason.as_str(),
            "Strategy chosen without declaration"
        );
        StrategyDecision {
            declared: None,
            strategy,
            reason,
        }
    }

    /// Case-insensitive substring match on the step type name
    pub fn strategy_for_step_type(step_type: &str) -> Option<StrategyType> {
        let step_type = step_type.to_lowercase();
        if step_type.contains("deterministic") {
            Some(StrategyType::Deterministic)
        } else if step_type.contains("reasoning") {
            Some(StrategyType::Reasoning)
        } else {
            None
        }
    }

    /// Conversational strategies must not see sensitive data
    pub fn safety_override(
        strategy: StrategyType,
        context: &ExecutionContext,
    ) -> Option<SafetyOverride> {
        (strategy == StrategyType::Conversational && context.config.sensitive_data).then_some(
            SafetyOverride {
                original: strategy,
                replacement: StrategyType::Deterministic,
            },
        )
    }
}
