//! Constants for the tierflow ecosystem
//!
//! This crate provides centralized constants that can be used across
//! multiple crates without creating circular dependencies.

/// Topic on which the step executor publishes execution requests
pub const TOPIC_EXECUTION_REQUEST: &str = "execution.request";

/// Topic on which the execution engine publishes execution results
pub const TOPIC_EXECUTION_RESULT: &str = "execution.result";

/// Topic for strategy selection telemetry
pub const TOPIC_STRATEGY_SELECTION: &str = "strategy.selection";

/// Topic for strategy safety override notifications
pub const TOPIC_STRATEGY_SAFETY_OVERRIDE: &str = "strategy.safety_override";

/// Default time to wait for a correlated execution result (5 minutes)
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 300_000;

/// Default token budget handed to the execution engine
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default per-topic buffer of the in-memory event bus
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Default learning rate for adaptive strategy selection
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Execution tier label reported in strategy telemetry
pub const EXECUTION_TIER: &str = "tier3";

/// Reason recorded when the manifest declared the strategy
pub const REASON_MANIFEST_DECLARED: &str = "manifest_declared";

/// Reason recorded when the step type heuristic picked the strategy
pub const REASON_STEP_TYPE_HEURISTIC: &str = "step_type_heuristic";

/// Reason recorded when nothing matched and the default was used
pub const REASON_DEFAULT_FALLBACK: &str = "default_fallback";

/// Reason recorded on a safety override for sensitive data
pub const REASON_SENSITIVE_DATA_PROTECTION: &str = "sensitive_data_protection";

/// Action step: code execution tool
pub const EXECUTE_CODE: &str = "execute_code";

/// Action step: outbound API call tool
pub const CALL_API: &str = "call_api";

/// Action step: data transformation tool
pub const TRANSFORM_DATA: &str = "transform_data";

/// Decision step: condition evaluation tool
pub const EVALUATE_CONDITION: &str = "evaluate_condition";

/// Decision step: value comparison tool
pub const COMPARE_VALUES: &str = "compare_values";

/// Loop step: collection iteration tool
pub const ITERATE_COLLECTION: &str = "iterate_collection";

/// Loop step: loop condition check tool
pub const CHECK_CONDITION: &str = "check_condition";

/// Parallel step: data splitting tool
pub const SPLIT_DATA: &str = "split_data";

/// Parallel step: result merging tool
pub const MERGE_RESULTS: &str = "merge_results";

/// Subroutine step: nested routine call tool
pub const CALL_ROUTINE: &str = "call_routine";

/// Subroutine step: context hand-off tool
pub const PASS_CONTEXT: &str = "pass_context";
