//! Execution Context Preparation
//!
//! Turns step metadata plus the current run context into the immutable
//! [`ExecutionContext`] handed to the execution engine.

use super::step_executor::ExecuteStepParams;
use std::collections::HashSet;
use tierflow_types::{
    ExecutionConstraints, ExecutionContext, ExecutionMetadata, StepInfo, ToolName,
};
use tracing::debug;

/// Builds execution contexts for a fixed token budget and timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPreparer {
    max_tokens: u32,
    timeout_ms: u64,
}

impl ContextPreparer {
    /// Create a preparer
    pub fn new(max_tokens: u32, timeout_ms: u64) -> Self {
        Self {
            max_tokens,
            timeout_ms,
        }
    }

    /// Tools available to a step: declared tools first, then the defaults
    /// for its type, deduplicated in first-seen order.
    pub fn available_tools(&self, step_info: &StepInfo) -> Vec<String> {
        let declared = step_info.config.tools.iter().flatten().cloned();
        let defaults = ToolName::defaults_for(&step_info.step_type)
            .iter()
            .map(|tool| tool.as_str().to_string());

        let mut seen = HashSet::new();
        declared
            .chain(defaults)
            .filter(|tool| seen.insert(tool.clone()))
            .collect()
    }

    /// Limits for a step
    pub fn constraints(&self, step_info: &StepInfo) -> ExecutionConstraints {
        ExecutionConstraints {
            max_tokens: self.max_tokens,
            max_execution_time_ms: self.timeout_ms,
            required_outputs: step_info.required_outputs(),
        }
    }

    /// Build the execution context for one step invocation
    pub fn prepare(&self, params: &ExecuteStepParams) -> ExecutionContext {
        let step_info = &params.step_info;
        let inputs = params.context.merge_inputs(&step_info.inputs);
        let available_tools = self.available_tools(step_info);

        debug!(
            step_id = %params.step_id,
            inputs = inputs.len(),
            tools = available_tools.len(),
            "Prepared execution context"
        );

        ExecutionContext::new(params.step_id.clone(), step_info.step_type.to_string())
            .with_run(params.run_id.clone())
            .with_routine(params.location.routine_id.clone())
            .with_inputs(inputs)
            .with_tools(available_tools)
            .with_constraints(self.constraints(step_info))
            .with_config(step_info.config.clone())
            .with_metadata(ExecutionMetadata {
                run_id: params.run_id.clone(),
                location: params.location.clone(),
                step_name: step_info.name.clone(),
                step_config: step_info.config.clone(),
            })
    }
}
