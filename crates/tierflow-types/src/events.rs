//! Event Channel Payloads
//!
//! Every message exchanged over the event channel, discriminated by topic.
//! The serialized form is `{"topic": "...", "payload": {...}}`.

use crate::execution::{EngineResult, ExecutionContext};
use crate::strategy::{SelectionReason, StrategyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tierflow_constants as names;

/// Event channel topic
#[derive(
    Debug, Clone, Copy, Display, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Topic {
    #[strum(serialize = "execution.request")]
    #[serde(rename = "execution.request")]
    ExecutionRequest,

    #[strum(serialize = "execution.result")]
    #[serde(rename = "execution.result")]
    ExecutionResult,

    #[strum(serialize = "strategy.selection")]
    #[serde(rename = "strategy.selection")]
    StrategySelection,

    #[strum(serialize = "strategy.safety_override")]
    #[serde(rename = "strategy.safety_override")]
    StrategySafetyOverride,
}

impl Topic {
    /// All topics
    pub fn all() -> [Topic; 4] {
        [
            Topic::ExecutionRequest,
            Topic::ExecutionResult,
            Topic::StrategySelection,
            Topic::StrategySafetyOverride,
        ]
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ExecutionRequest => names::TOPIC_EXECUTION_REQUEST,
            Topic::ExecutionResult => names::TOPIC_EXECUTION_RESULT,
            Topic::StrategySelection => names::TOPIC_STRATEGY_SELECTION,
            Topic::StrategySafetyOverride => names::TOPIC_STRATEGY_SAFETY_OVERRIDE,
        }
    }
}

/// Request for the execution engine to run one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequestEvent {
    pub request_id: String,
    pub context: ExecutionContext,
    pub timestamp: DateTime<Utc>,
}

/// Execution engine reply, correlated by `request_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResultEvent {
    pub request_id: String,
    pub result: EngineResult,
}

impl ExecutionResultEvent {
    /// Create a reply for the given request
    pub fn new(request_id: impl Into<String>, result: EngineResult) -> Self {
        Self {
            request_id: request_id.into(),
            result,
        }
    }
}

/// Step context summary attached to selection telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub step_type: String,
    pub tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_id: Option<String>,
}

/// Emitted on every strategy selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySelectionEvent {
    pub step_id: String,
    pub routine_id: String,
    /// Strategy string as declared in the manifest, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_strategy: Option<String>,
    /// Strategy actually returned to the caller
    pub selected_strategy: StrategyType,
    /// Set when the safety check replaced the initial choice
    #[serde(default)]
    pub safety_override_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_hints: Option<serde_json::Value>,
    pub context: SelectionContext,
    pub selection_reason: SelectionReason,
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a strategy is replaced to protect sensitive data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyOverrideEvent {
    pub step_id: String,
    pub original_strategy: StrategyType,
    pub override_strategy: StrategyType,
    pub reason: String,
}

/// Any message carried by the event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload")]
pub enum BusEvent {
    #[serde(rename = "execution.request")]
    ExecutionRequest(ExecutionRequestEvent),

    #[serde(rename = "execution.result")]
    ExecutionResult(ExecutionResultEvent),

    #[serde(rename = "strategy.selection")]
    StrategySelection(StrategySelectionEvent),

    #[serde(rename = "strategy.safety_override")]
    StrategySafetyOverride(SafetyOverrideEvent),
}

impl BusEvent {
    /// Topic this event is published on
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::ExecutionRequest(_) => Topic::ExecutionRequest,
            BusEvent::ExecutionResult(_) => Topic::ExecutionResult,
            BusEvent::StrategySelection(_) => Topic::StrategySelection,
            BusEvent::StrategySafetyOverride(_) => Topic::StrategySafetyOverride,
        }
    }

    /// Correlation id for request/reply events
    pub fn request_id(&self) -> Option<&str> {
        match self {
            BusEvent::ExecutionRequest(event) => Some(&event.request_id),
            BusEvent::ExecutionResult(event) => Some(&event.request_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_names_match_display_and_parse() {
        for topic in Topic::all() {
            assert_eq!(topic.to_string(), topic.as_str());
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
            assert_eq!(json!(topic), json!(topic.as_str()));
        }
    }

    #[test]
    fn test_result_event_wire_format() {
        let event = BusEvent::ExecutionResult(ExecutionResultEvent::new(
            "req-1",
            EngineResult::failure("engine down"),
        ));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "topic": "execution.result",
                "payload": {
                    "requestId": "req-1",
                    "result": {"success": false, "error": "engine down"}
                }
            })
        );
        assert_eq!(event.topic(), Topic::ExecutionResult);
        assert_eq!(event.request_id(), Some("req-1"));
    }

    #[test]
    fn test_safety_override_payload() {
        let event = BusEvent::StrategySafetyOverride(SafetyOverrideEvent {
            step_id: "s1".to_string(),
            original_strategy: StrategyType::Conversational,
            override_strategy: StrategyType::Deterministic,
            reason: tierflow_constants::REASON_SENSITIVE_DATA_PROTECTION.to_string(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["topic"], "strategy.safety_override");
        assert_eq!(value["payload"]["originalStrategy"], "conversational");
        assert_eq!(value["payload"]["overrideStrategy"], "deterministic");
        assert_eq!(value["payload"]["reason"], "sensitive_data_protection");
    }
}
