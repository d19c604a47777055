//! Strategy Implementations
//!
//! One type per [`StrategyType`]:
//! - Conversational strategy for open-ended dialogue
//! - Reasoning strategy for structured multi-step thinking
//! - Deterministic strategy for reproducible, fixed-procedure execution

use super::{ExecutionStrategy, StrategyFactory};
use std::sync::Arc;
use tierflow_types::StrategyType;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ConversationalStrategy;

impl ExecutionStrategy for ConversationalStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Conversational
    }

    fn name(&self) -> &'static str {
        "conversational"
    }

    fn description(&self) -> &'static str {
        "Open-ended, dialogue driven execution"
    }
}

#[derive(Debug, Default)]
pub struct ReasoningStrategy;

impl ExecutionStrategy for ReasoningStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Reasoning
    }

    fn name(&self) -> &'static str {
        "reasoning"
    }

    fn description(&self) -> &'static str {
        "Structured multi-step reasoning"
    }
}

#[derive(Debug, Default)]
pub struct DeterministicStrategy;

impl ExecutionStrategy for DeterministicStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Deterministic
    }

    fn name(&self) -> &'static str {
        "deterministic"
    }

    fn description(&self) -> &'static str {
        "Reproducible execution without free-form generation"
    }
}

/// Builds the built-in strategy for each type
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStrategyFactory;

impl StrategyFactory for DefaultStrategyFactory {
    fn create(&self, strategy_type: StrategyType) -> Arc<dyn ExecutionStrategy> {
        debug!(strategy = %strategy_type, "Constructing strategy instance");
        match strategy_type {
            StrategyType::Conversational => Arc::new(ConversationalStrategy),
            StrategyType::Reasoning => Arc::new(ReasoningStrategy),
            StrategyType::Deterministic => Arc::new(DeterministicStrategy),
        }
    }
}
