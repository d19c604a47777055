//! Step type extension points
//!
//! Local dispatch hooks, one per built-in step type. They are not how
//! steps reach the execution engine (that is
//! [`StepExecutor::execute_step`](super::StepExecutor::execute_step)); they
//! let collaborators such as a branch coordinator or a nested-run invoker
//! plug in without changing the dispatch shape.

use crate::error::Result;
use async_trait::async_trait;
use tierflow_types::{RunContext, StepInfo, Variables};

/// Handlers for each built-in step type. Every method defaults to an
/// empty output map.
#[async_trait]
pub trait StepTypeHandler: Send + Sync {
    /// Single action step
    async fn execute_action(&self, _step: &StepInfo, _context: &RunContext) -> Result<Variables> {
        Ok(Variables::new())
    }

    /// Branch selection step
    async fn execute_decision(
        &self,
        _step: &StepInfo,
        _context: &RunContext,
    ) -> Result<Variables> {
        Ok(Variables::new())
    }

    /// Repeated execution step
    async fn execute_loop(&self, _step: &StepInfo, _context: &RunContext) -> Result<Variables> {
        Ok(Variables::new())
    }

    /// Fan-out step
    async fn execute_parallel(
        &self,
        _step: &StepInfo,
        _context: &RunContext,
    ) -> Result<Variables> {
        Ok(Variables::new())
    }

    /// Nested routine step
    async fn execute_subroutine(
        &self,
        _step: &StepInfo,
        _context: &RunContext,
    ) -> Result<Variables> {
        Ok(Variables::new())
    }
}

/// Handler that produces no outputs for any step type
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStepTypeHandler;

impl StepTypeHandler for NoopStepTypeHandler {}
