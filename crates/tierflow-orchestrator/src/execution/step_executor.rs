//! Step Executor
//!
//! Bridges a single step from the run orchestrator to the execution engine
//! over the event channel:
//!
//! 1. prepare an [`ExecutionContext`] from step metadata and run context
//! 2. register a single-shot reply slot and publish `execution.request`
//!    with a fresh request id
//! 3. wait for the dispatcher to deliver the `execution.result` carrying the
//!    same request id, or time out
//! 4. normalize the reply into a [`StepExecutionResult`]
//!
//! `execute_step` never returns an error; every failure mode becomes a
//! failed result.

use super::context::ContextPreparer;
use super::handlers::{NoopStepTypeHandler, StepTypeHandler};
use super::replies::{dispatch_results, PendingReplies};
use crate::config::ExecutorConfig;
use crate::error::{OrchestratorError, Result};
use crate::event_bus::EventChannel;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tierflow_types::{
    BusEvent, EngineResult, ExecutionContext, ExecutionRequestEvent, RunContext,
    StepExecutionResult, StepInfo, StepLocation, StepType, Topic, Variables,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Fallback message when the engine fails without saying why
const GENERIC_ENGINE_FAILURE: &str = "Step execution failed";

/// Parameters for [`StepExecutor::execute_step`]
#[derive(Debug, Clone)]
pub struct ExecuteStepParams {
    pub run_id: String,
    pub step_id: String,
    pub step_info: StepInfo,
    pub context: RunContext,
    pub location: StepLocation,
}

impl ExecuteStepParams {
    /// Create params for a step; the step id is taken from `step_info`
    pub fn new(
        run_id: impl Into<String>,
        step_info: StepInfo,
        context: RunContext,
        location: StepLocation,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            step_id: step_info.id.clone(),
            step_info,
            context,
            location,
        }
    }
}

/// Executes steps through the event channel
pub struct StepExecutor {
    bus: Arc<dyn EventChannel>,
    config: ExecutorConfig,
    preparer: ContextPreparer,
    handler: Arc<dyn StepTypeHandler>,
    pending: Arc<PendingReplies>,
    dispatcher: OnceLock<JoinHandle<()>>,
}

impl StepExecutor {
    /// Create an executor with default timeout and token budget
    pub fn new(bus: Arc<dyn EventChannel>) -> Self {
        Self::with_config(bus, ExecutorConfig::default())
    }

    /// Create an executor with explicit settings
    pub fn with_config(bus: Arc<dyn EventChannel>, config: ExecutorConfig) -> Self {
        let preparer = ContextPreparer::new(config.default_max_tokens, config.step_timeout_ms);
        Self {
            bus,
            config,
            preparer,
            handler: Arc::new(NoopStepTypeHandler),
            pending: Arc::new(PendingReplies::new()),
            dispatcher: OnceLock::new(),
        }
    }

    /// Replace the step type handlers and return self for chaining
    pub fn with_handler(mut self, handler: Arc<dyn StepTypeHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Configured result timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        self.config.step_timeout_ms
    }

    /// Context preparer used by this executor
    pub fn context_preparer(&self) -> &ContextPreparer {
        &self.preparer
    }

    /// Requests published but not yet answered or timed out
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Execute one step through the execution engine
    #[instrument(skip(self, params), fields(
        run_id = %params.run_id,
        step_id = %params.step_id,
        step_type = %params.step_info.step_type
    ))]
    pub async fn execute_step(&self, params: ExecuteStepParams) -> StepExecutionResult {
        let start_time = Instant::now();

        info!("[StepExecutor] Executing step {}", params.step_info.name);

        let outcome = self.run_step(&params).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match outcome {
            Ok(reply) => {
                info!(duration_ms = duration_ms, "[StepExecutor] ✅ Step completed");
                StepExecutionResult::succeeded(
                    reply.outputs.unwrap_or_default(),
                    duration_ms,
                    reply.resources_used.map(Into::into),
                )
            }
            Err(e) => {
                warn!(
                    duration_ms = duration_ms,
                    retryable = e.is_retryable(),
                    "[StepExecutor] ❌ Step failed: {}",
                    e
                );
                StepExecutionResult::failed(e.to_string(), duration_ms)
            }
        }
    }

    async fn run_step(&self, params: &ExecuteStepParams) -> Result<EngineResult> {
        let context = self.preparer.prepare(params);
        let reply = self.request_execution(context).await?;

        if reply.success {
            Ok(reply)
        } else {
            Err(OrchestratorError::engine_failure(
                reply
                    .error
                    .unwrap_or_else(|| GENERIC_ENGINE_FAILURE.to_string()),
            ))
        }
    }

    /// Publish the request and wait for its correlated reply.
    ///
    /// The reply slot is registered before publishing so a reply sent
    /// immediately by the engine cannot be missed.
    async fn request_execution(&self, context: ExecutionContext) -> Result<EngineResult> {
        self.ensure_dispatcher();

        let request_id = generate_request_id();
        let reply = self.pending.register(&request_id);

        debug!(request_id = %request_id, "Publishing execution request");
        let published = self
            .bus
            .publish(BusEvent::ExecutionRequest(ExecutionRequestEvent {
                request_id: request_id.clone(),
                context,
                timestamp: Utc::now(),
            }))
            .await;
        if let Err(e) = published {
            self.pending.remove(&request_id);
            return Err(e.into());
        }

        let outcome = self.wait_for_result(reply, &request_id).await;
        self.pending.remove(&request_id);
        outcome
    }

    async fn wait_for_result(
        &self,
        reply: oneshot::Receiver<EngineResult>,
        request_id: &str,
    ) -> Result<EngineResult> {
        let timeout_ms = self.config.step_timeout_ms;

        tokio::select! {
            reply = reply => {
                reply.map_err(|_| OrchestratorError::ResultChannelClosed(request_id.to_string()))
            }
            _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                warn!(request_id = %request_id, timeout_ms = timeout_ms, "Execution result timed out");
                Err(OrchestratorError::timeout(timeout_ms))
            }
        }
    }

    /// Start the result dispatcher on first use. The subscription is opened
    /// synchronously so it exists before the first request goes out.
    fn ensure_dispatcher(&self) {
        self.dispatcher.get_or_init(|| {
            let results = self.bus.subscribe(Topic::ExecutionResult);
            tokio::spawn(dispatch_results(results, Arc::clone(&self.pending)))
        });
    }

    /// Dispatch on the step type to the registered handler.
    ///
    /// Custom step types are rejected with [`OrchestratorError::UnknownStepType`].
    pub async fn execute_step_type(
        &self,
        step_info: &StepInfo,
        context: &RunContext,
    ) -> Result<Variables> {
        match &step_info.step_type {
            StepType::Action => self.handler.execute_action(step_info, context).await,
            StepType::Decision => self.handler.execute_decision(step_info, context).await,
            StepType::Loop => self.handler.execute_loop(step_info, context).await,
            StepType::Parallel => self.handler.execute_parallel(step_info, context).await,
            StepType::Subroutine => self.handler.execute_subroutine(step_info, context).await,
            StepType::Custom(name) => Err(OrchestratorError::UnknownStepType(name.clone())),
        }
    }

    /// Check that every declared output key is present. Logs and returns
    /// `false` on the first missing key.
    pub fn validate_outputs(&self, step_info: &StepInfo, outputs: &Variables) -> bool {
        let Some(expected) = &step_info.outputs else {
            return true;
        };

        for key in expected {
            if !outputs.contains_key(key) {
                warn!(
                    step_id = %step_info.id,
                    missing_output = %key,
                    "Step did not produce declared output"
                );
                return false;
            }
        }
        true
    }
}

impl Drop for StepExecutor {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.get() {
            dispatcher.abort();
        }
    }
}

/// Request id unique per call: nanosecond timestamp plus random suffix
pub fn generate_request_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{nanos}-{suffix}")
}
