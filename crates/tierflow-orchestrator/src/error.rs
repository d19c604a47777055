use thiserror::Error;

/// Errors raised by the event channel
#[derive(Debug, Error)]
pub enum EventBusError {
    /// The channel has been shut down
    #[error("Event channel closed: {0}")]
    Closed(String),
}

impl EventBusError {
    /// Create a new closed-channel error
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }
}

/// Errors that can occur while orchestrating a step
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No correlated result arrived in time
    #[error("Execution timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The execution engine reported a failure
    #[error("{0}")]
    EngineFailure(String),

    /// The result subscription ended before a reply arrived
    #[error("Result channel closed before request {0} was answered")]
    ResultChannelClosed(String),

    /// Local dispatch met a step type it does not handle
    #[error("Unknown step type: {0}")]
    UnknownStepType(String),

    /// Event channel failure
    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl OrchestratorError {
    /// Create a new timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Create a new engine failure
    pub fn engine_failure(msg: impl Into<String>) -> Self {
        Self::EngineFailure(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ResultChannelClosed(_) | Self::EventBus(_)
        )
    }
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;
