//! Execution Module for Orchestrator-Engine Coordination
//!
//! This module provides the request/reply bridge that hands a single step
//! to the execution engine and waits for its correlated result.

pub mod context;
pub mod handlers;
pub mod replies;
pub mod step_executor;

pub use context::ContextPreparer;
pub use handlers::{NoopStepTypeHandler, StepTypeHandler};
pub use replies::PendingReplies;
pub use step_executor::{generate_request_id, ExecuteStepParams, StepExecutor};
