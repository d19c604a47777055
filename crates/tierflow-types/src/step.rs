//! Step Types
//!
//! Declarative description of a single unit of work handed from the
//! process orchestrator to the step executor.

use crate::context::Variables;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of step. The first five variants form the closed built-in set;
/// anything else is carried verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    Action,
    Decision,
    Loop,
    Parallel,
    Subroutine,
    Custom(String),
}

impl StepType {
    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            StepType::Action => "action",
            StepType::Decision => "decision",
            StepType::Loop => "loop",
            StepType::Parallel => "parallel",
            StepType::Subroutine => "subroutine",
            StepType::Custom(name) => name,
        }
    }

    /// Whether this is one of the built-in step types
    pub fn is_known(&self) -> bool {
        !matches!(self, StepType::Custom(_))
    }
}

impl From<&str> for StepType {
    fn from(value: &str) -> Self {
        match value {
            "action" => StepType::Action,
            "decision" => StepType::Decision,
            "loop" => StepType::Loop,
            "parallel" => StepType::Parallel,
            "subroutine" => StepType::Subroutine,
            other => StepType::Custom(other.to_string()),
        }
    }
}

impl From<String> for StepType {
    fn from(value: String) -> Self {
        StepType::from(value.as_str())
    }
}

impl From<StepType> for String {
    fn from(value: StepType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step-local configuration declared in the routine manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    /// Tools the step asks for explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    /// Declared execution strategy (free-form, mapped by the strategy provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Whether the step handles sensitive data
    #[serde(default)]
    pub sensitive_data: bool,
    /// Any other manifest keys
    #[serde(flatten)]
    pub extra: Variables,
}

impl StepConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add declared tool and return self for chaining
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.get_or_insert_with(Vec::new).push(tool.into());
        self
    }

    /// Set declared strategy and return self for chaining
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Set sensitive data flag and return self for chaining
    pub fn with_sensitive_data(mut self, sensitive: bool) -> Self {
        self.sensitive_data = sensitive;
        self
    }

    /// Add an extra manifest key and return self for chaining
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Declared strategy as written in the manifest. Only a missing or
    /// empty value counts as undeclared; whitespace is still a declaration.
    pub fn declared_strategy(&self) -> Option<&str> {
        self.strategy
            .as_deref()
            .filter(|strategy| !strategy.is_empty())
    }
}

/// Position of a step inside its routine graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepLocation {
    /// Routine the step belongs to
    pub routine_id: String,
    /// Graph node holding the step
    pub node_id: String,
    /// Nested routine, when executing inside a subroutine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subroutine_id: Option<String>,
}

impl StepLocation {
    /// Create a new location
    pub fn new(routine_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            routine_id: routine_id.into(),
            node_id: node_id.into(),
            subroutine_id: None,
        }
    }

    /// Set subroutine and return self for chaining
    pub fn with_subroutine(mut self, subroutine_id: impl Into<String>) -> Self {
        self.subroutine_id = Some(subroutine_id.into());
        self
    }
}

/// Declarative description of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    /// Unique step identifier
    pub id: String,
    /// Human readable step name
    pub name: String,
    /// Step kind
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Optional description for users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Step-declared inputs; these win over run context variables
    #[serde(default)]
    pub inputs: Variables,
    /// Output keys the step promises to produce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    /// Step-local configuration
    #[serde(default)]
    pub config: StepConfig,
}

impl StepInfo {
    /// Create a new step
    pub fn new(id: impl Into<String>, name: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            step_type,
            description: None,
            inputs: Variables::new(),
            outputs: None,
            config: StepConfig::default(),
        }
    }

    /// Set description and return self for chaining
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add input and return self for chaining
    pub fn with_input(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.inputs.insert(key.into(), value);
        self
    }

    /// Declare output keys and return self for chaining
    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = Some(outputs.into_iter().map(Into::into).collect());
        self
    }

    /// Set config and return self for chaining
    pub fn with_config(mut self, config: StepConfig) -> Self {
        self.config = config;
        self
    }

    /// Output keys, empty when the step declares none
    pub fn required_outputs(&self) -> Vec<String> {
        self.outputs.clone().unwrap_or_default()
    }
}
