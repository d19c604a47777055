//! # tierflow-orchestrator
//!
//! Step execution orchestration core.
//!
//! This crate bridges single steps from a run orchestrator to an execution
//! engine over an event channel, and selects which execution strategy should
//! handle a step.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod execution;
pub mod strategy;

pub use config::{ExecutorConfig, StrategyConfigExt};
pub use error::{EventBusError, OrchestratorError, Result};
pub use event_bus::{EventChannel, InMemoryEventBus, Subscription};
pub use execution::{
    ContextPreparer, ExecuteStepParams, NoopStepTypeHandler, StepExecutor, StepTypeHandler,
};
pub use strategy::{ExecutionStrategy, StrategyFactory, StrategyProvider, UsageHints};

/// Re-export common types for convenience
pub use tierflow_types::{
    BusEvent, EngineResult, ExecutionContext, RunContext, StepExecutionResult, StepInfo,
    StepLocation, StepType, StrategyFactoryConfig, StrategyType, Topic, Variables,
};
