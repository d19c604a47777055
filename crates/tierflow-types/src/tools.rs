//! Tool definitions with type-safe enums
//!
//! Default tools offered to the execution engine are keyed by step type.
//! Step manifests may still declare arbitrary tool names as plain strings;
//! only the built-in defaults are modelled here.

use crate::step::StepType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tierflow_constants as names;

/// Built-in tool names with type safety
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumIter,
    EnumString,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    #[strum(serialize = "execute_code")]
    ExecuteCode,

    #[strum(serialize = "call_api")]
    CallApi,

    #[strum(serialize = "transform_data")]
    TransformData,

    #[strum(serialize = "evaluate_condition")]
    EvaluateCondition,

    #[strum(serialize = "compare_values")]
    CompareValues,

    #[strum(serialize = "iterate_collection")]
    IterateCollection,

    #[strum(serialize = "check_condition")]
    CheckCondition,

    #[strum(serialize = "split_data")]
    SplitData,

    #[strum(serialize = "merge_results")]
    MergeResults,

    #[strum(serialize = "call_routine")]
    CallRoutine,

    #[strum(serialize = "pass_context")]
    PassContext,
}

impl ToolName {
    /// Default tools every step of the given type receives.
    ///
    /// Custom step types contribute nothing.
    pub fn defaults_for(step_type: &StepType) -> &'static [ToolName] {
        match step_type {
            StepType::Action => &[
                ToolName::ExecuteCode,
                ToolName::CallApi,
                ToolName::TransformData,
            ],
            StepType::Decision => &[ToolName::EvaluateCondition, ToolName::CompareValues],
            StepType::Loop => &[ToolName::IterateCollection, ToolName::CheckCondition],
            StepType::Parallel => &[ToolName::SplitData, ToolName::MergeResults],
            StepType::Subroutine => &[ToolName::CallRoutine, ToolName::PassContext],
            StepType::Custom(_) => &[],
        }
    }

    /// Wire name of the tool
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ExecuteCode => names::EXECUTE_CODE,
            ToolName::CallApi => names::CALL_API,
            ToolName::TransformData => names::TRANSFORM_DATA,
            ToolName::EvaluateCondition => names::EVALUATE_CONDITION,
            ToolName::CompareValues => names::COMPARE_VALUES,
            ToolName::IterateCollection => names::ITERATE_COLLECTION,
            ToolName::CheckCondition => names::CHECK_CONDITION,
            ToolName::SplitData => names::SPLIT_DATA,
            ToolName::MergeResults => names::MERGE_RESULTS,
            ToolName::CallRoutine => names::CALL_ROUTINE,
            ToolName::PassContext => names::PASS_CONTEXT,
        }
    }
}
