//! Run Context Types
//!
//! Variable and scope data carried alongside a step. Pure data with merge
//! semantics only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered key/value mapping used for variables, inputs and outputs
pub type Variables = serde_json::Map<String, Value>;

/// A named variable scope inside a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextScope {
    /// Scope identifier
    pub id: String,
    /// Scope name
    pub name: String,
    /// Enclosing scope, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Variables visible in this scope
    #[serde(default)]
    pub variables: Variables,
}

impl ContextScope {
    /// Create a new scope
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            variables: Variables::new(),
        }
    }

    /// Set parent scope and return self for chaining
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Add variable and return self for chaining
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }
}

/// Mutable state of a run at the moment a step executes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    /// Run-wide variables
    #[serde(default)]
    pub variables: Variables,
    /// Shared scratch space, opaque to the orchestration core
    #[serde(default)]
    pub blackboard: Variables,
    /// Scopes in nesting order, outermost first
    #[serde(default)]
    pub scopes: Vec<ContextScope>,
}

impl RunContext {
    /// Create an empty run context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add global variable and return self for chaining
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    /// Push scope and return self for chaining
    pub fn with_scope(mut self, scope: ContextScope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Add blackboard entry and return self for chaining
    pub fn with_blackboard_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.blackboard.insert(key.into(), value);
        self
    }

    /// Variables visible to a step: globals first, then every scope in
    /// order. Later scopes override earlier ones.
    pub fn effective_variables(&self) -> Variables {
        let mut merged = self.variables.clone();
        for scope in &self.scopes {
            for (key, value) in &scope.variables {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Effective variables overlaid with step-declared inputs.
    /// Step inputs always win.
    pub fn merge_inputs(&self, step_inputs: &Variables) -> Variables {
        let mut merged = self.effective_variables();
        for (key, value) in step_inputs {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Look up a scope by id
    pub fn scope(&self, id: &str) -> Option<&ContextScope> {
        self.scopes.iter().find(|scope| scope.id == id)
    }
}
