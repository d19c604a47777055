//! Tests for run context variable merging

use serde_json::json;
use tierflow_types::{ContextScope, RunContext, Variables};

fn inputs(value: serde_json::Value) -> Variables {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_step_inputs_win_over_scopes_and_globals() {
    let ctx = RunContext::new()
        .with_variable("a", json!(1))
        .with_scope(
            ContextScope::new("scope-1", "loop body")
                .with_variable("a", json!(2))
                .with_variable("b", json!(2)),
        );

    let merged = ctx.merge_inputs(&inputs(json!({"b": 3})));

    assert_eq!(merged, inputs(json!({"a": 2, "b": 3})));
}

#[test]
fn test_later_scopes_override_earlier_ones() {
    let ctx = RunContext::new()
        .with_variable("mode", json!("global"))
        .with_scope(ContextScope::new("outer", "outer").with_variable("mode", json!("outer")))
        .with_scope(
            ContextScope::new("inner", "inner")
                .with_parent("outer")
                .with_variable("mode", json!("inner"))
                .with_variable("depth", json!(2)),
        );

    let effective = ctx.effective_variables();

    assert_eq!(effective.get("mode"), Some(&json!("inner")));
    assert_eq!(effective.get("depth"), Some(&json!(2)));
    assert_eq!(ctx.scope("inner").and_then(|s| s.parent_id.as_deref()), Some("outer"));
}

#[test]
fn test_blackboard_is_not_merged_into_inputs() {
    let ctx = RunContext::new()
        .with_variable("user", json!("ada"))
        .with_blackboard_entry("scratch", json!({"notes": []}));

    let merged = ctx.merge_inputs(&Variables::new());

    assert_eq!(merged, inputs(json!({"user": "ada"})));
    assert!(ctx.blackboard.contains_key("scratch"));
}

#[test]
fn test_empty_context_yields_only_step_inputs() {
    let merged = RunContext::default().merge_inputs(&inputs(json!({"query": "rust"})));
    assert_eq!(merged, inputs(json!({"query": "rust"})));
}

#[test]
fn test_run_context_deserializes_with_missing_sections() {
    let ctx: RunContext = serde_json::from_value(json!({
        "variables": {"a": 1},
        "scopes": [{"id": "s", "name": "scope", "variables": {"a": 5}}]
    }))
    .unwrap();

    assert!(ctx.blackboard.is_empty());
    assert_eq!(ctx.effective_variables().get("a"), Some(&json!(5)));
}
