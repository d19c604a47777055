use crate::context::Variables;
use crate::step::{StepConfig, StepLocation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tierflow_constants::{DEFAULT_MAX_TOKENS, DEFAULT_STEP_TIMEOUT_MS};
use uuid::Uuid;

/// Limits handed to the execution engine with every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionConstraints {
    /// Token budget for the step
    pub max_tokens: u32,
    /// Time budget in milliseconds (the executor's timeout)
    #[serde(rename = "maxExecutionTime")]
    pub max_execution_time_ms: u64,
    /// Output keys the step declares
    pub required_outputs: Vec<String>,
}

impl Default for ExecutionConstraints {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_execution_time_ms: DEFAULT_STEP_TIMEOUT_MS,
            required_outputs: Vec::new(),
        }
    }
}

/// Where a step came from, for the engine's bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    /// Owning run
    pub run_id: String,
    /// Position inside the routine
    pub location: StepLocation,
    /// Human readable step name
    pub step_name: String,
    /// Step-local configuration as declared
    pub step_config: StepConfig,
}

/// Envelope handed to the execution engine.
///
/// Built fresh for every step invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    /// Unique execution identifier
    pub execution_id: String,
    /// Step being executed
    pub step_id: String,
    /// Free-form step type, e.g. "conversation" or "deterministic_calculation"
    pub step_type: String,
    /// Owning run
    pub run_id: String,
    /// Routine the step belongs to
    pub routine_id: String,
    /// Swarm driving the run, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_id: Option<String>,
    /// User on whose behalf the run executes, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Correlation identifier for tracing across components
    pub correlation_id: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Merged step inputs
    pub inputs: Variables,
    /// Deduplicated tool names, first-seen order
    pub available_tools: Vec<String>,
    /// Execution limits
    pub constraints: ExecutionConstraints,
    /// Step-local configuration consulted for strategy selection
    pub config: StepConfig,
    /// Provenance metadata
    pub metadata: ExecutionMetadata,
}

impl ExecutionContext {
    /// Create a new execution context with fresh identifiers
    pub fn new(step_id: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            execution_id: Uuid::new_v4().to_string(),
            step_id: step_id.into(),
            step_type: step_type.into(),
            run_id: String::new(),
            routine_id: String::new(),
            swarm_id: None,
            user_id: None,
            correlation_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            inputs: Variables::new(),
            available_tools: Vec::new(),
            constraints: ExecutionConstraints::default(),
            config: StepConfig::default(),
            metadata: ExecutionMetadata::default(),
        }
    }

    /// Set run and return self for chaining
    pub fn with_run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Set routine and return self for chaining
    pub fn with_routine(mut self, routine_id: impl Into<String>) -> Self {
        self.routine_id = routine_id.into();
        self
    }

    /// Set swarm and return self for chaining
    pub fn with_swarm(mut self, swarm_id: impl Into<String>) -> Self {
        self.swarm_id = Some(swarm_id.into());
        self
    }

    /// Set user and return self for chaining
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set step config and return self for chaining
    pub fn with_config(mut self, config: StepConfig) -> Self {
        self.config = config;
        self
    }

    /// Set inputs and return self for chaining
    pub fn with_inputs(mut self, inputs: Variables) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set available tools and return self for chaining
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.available_tools = tools;
        self
    }

    /// Set constraints and return self for chaining
    pub fn with_constraints(mut self, constraints: ExecutionConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set metadata and return self for chaining
    pub fn with_metadata(mut self, metadata: ExecutionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Resource accounting reported by the execution engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResourceUsage {
    /// Credits consumed
    #[serde(default)]
    pub credits: u64,
    /// Tokens consumed, when the strategy tracks them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    /// Engine-side execution time in milliseconds
    #[serde(default, rename = "duration")]
    pub duration_ms: u64,
}

/// Result body of an `execution.result` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    /// Whether the engine considers the step successful
    pub success: bool,
    /// Produced outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Variables>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Resource accounting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_used: Option<EngineResourceUsage>,
}

impl EngineResult {
    /// Successful engine reply
    pub fn success(outputs: Variables) -> Self {
        Self {
            success: true,
            outputs: Some(outputs),
            error: None,
            resources_used: None,
        }
    }

    /// Failed engine reply
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            outputs: None,
            error: Some(error.into()),
            resources_used: None,
        }
    }

    /// Attach resource usage and return self for chaining
    pub fn with_resources(mut self, resources: EngineResourceUsage) -> Self {
        self.resources_used = Some(resources);
        self
    }
}

/// Resource accounting returned to the caller of the step executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    /// Credits consumed
    pub credits: u64,
    /// Engine-side execution time in milliseconds
    #[serde(rename = "time")]
    pub time_ms: u64,
    /// Tokens consumed, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

impl From<EngineResourceUsage> for ResourceUsage {
    fn from(usage: EngineResourceUsage) -> Self {
        Self {
            credits: usage.credits,
            time_ms: usage.duration_ms,
            tokens: usage.tokens,
        }
    }
}

/// Normalized outcome of a single step execution.
///
/// Always a plain return value, including on timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecutionResult {
    /// Whether the step succeeded
    pub success: bool,
    /// Produced outputs, present only on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Variables>,
    /// Failure description, present only on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration measured by the executor, in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Resource accounting from the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_used: Option<ResourceUsage>,
}

impl StepExecutionResult {
    /// Successful step
    pub fn succeeded(
        outputs: Variables,
        duration_ms: u64,
        resources_used: Option<ResourceUsage>,
    ) -> Self {
        Self {
            success: true,
            outputs: Some(outputs),
            error: None,
            duration_ms,
            resources_used,
        }
    }

    /// Failed step
    pub fn failed(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            outputs: None,
            error: Some(error.into()),
            duration_ms,
            resources_used: None,
        }
    }
}
