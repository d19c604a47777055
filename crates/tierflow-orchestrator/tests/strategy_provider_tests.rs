//! Strategy provider integration tests

mod common;

use common::init_tracing;
use rstest::rstest;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tierflow_orchestrator::strategy::{DefaultStrategyFactory, ExecutionStrategy, StrategyFactory};
use tierflow_orchestrator::{EventChannel, InMemoryEventBus, StrategyProvider, Subscription};
use tierflow_types::{
    BusEvent, ExecutionContext, SafetyOverrideEvent, SelectionReason, StepConfig,
    StrategyFactoryConfig, StrategySelectionEvent, StrategyType, Topic,
};

fn provider(bus: &Arc<InMemoryEventBus>) -> StrategyProvider {
    StrategyProvider::new(StrategyFactoryConfig::default(), bus.clone())
}

fn step_context(step_type: &str, config: StepConfig) -> ExecutionContext {
    ExecutionContext::new("step-1", step_type)
        .with_routine("routine-1")
        .with_config(config)
}

async fn next_selection(
    subscription: &mut Subscription,
) -> Result<StrategySelectionEvent, Box<dyn std::error::Error>> {
    match tokio::time::timeout(Duration::from_millis(500), subscription.recv()).await? {
        Some(BusEvent::StrategySelection(event)) => Ok(event),
        other => Err(format!("expected a strategy selection, got {other:?}").into()),
    }
}

async fn next_override(
    subscription: &mut Subscription,
) -> Result<SafetyOverrideEvent, Box<dyn std::error::Error>> {
    match tokio::time::timeout(Duration::from_millis(500), subscription.recv()).await? {
        Some(BusEvent::StrategySafetyOverride(event)) => Ok(event),
        other => Err(format!("expected a safety override, got {other:?}").into()),
    }
}

#[rstest]
#[case("action", StepConfig::new().with_strategy("reasoning"), StrategyType::Reasoning, SelectionReason::ManifestDeclared)]
#[case("action", StepConfig::new().with_strategy("  Deterministic "), StrategyType::Deterministic, SelectionReason::ManifestDeclared)]
#[case("deterministic_calculation", StepConfig::new(), StrategyType::Deterministic, SelectionReason::StepTypeHeuristic)]
#[case("Deep_Reasoning_Task", StepConfig::new(), StrategyType::Reasoning, SelectionReason::StepTypeHeuristic)]
#[case("generic_step", StepConfig::new(), StrategyType::Conversational, SelectionReason::DefaultFallback)]
#[case("generic_step", StepConfig::new().with_strategy(""), StrategyType::Conversational, SelectionReason::DefaultFallback)]
#[case("generic_step", StepConfig::new().with_strategy("   "), StrategyType::Conversational, SelectionReason::ManifestDeclared)]
#[case("deterministic_calculation", StepConfig::new().with_strategy("   "), StrategyType::Conversational, SelectionReason::ManifestDeclared)]
#[case("reasoning_step", StepConfig::new().with_strategy("conversational"), StrategyType::Conversational, SelectionReason::ManifestDeclared)]
#[tokio::test]
async fn test_strategy_selection(
    #[case] step_type: &str,
    #[case] config: StepConfig,
    #[case] expected: StrategyType,
    #[case] reason: SelectionReason,
) -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut selections = bus.subscribe(Topic::StrategySelection);
    let provider = provider(&bus);

    let strategy = provider
        .get_strategy(&step_context(step_type, config), None)
        .await;
    assert_eq!(strategy.strategy_type(), expected);

    let event = next_selection(&mut selections).await?;
    assert_eq!(event.selected_strategy, expected);
    assert_eq!(event.selection_reason, reason);
    assert!(!event.safety_override_applied);
    Ok(())
}

#[tokio::test]
async fn test_unknown_declared_strategy_uses_default() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let bus = Arc::new(InMemoryEventBus::new());
    let mut selections = bus.subscribe(Topic::StrategySelection);
    let provider = StrategyProvider::new(
        StrategyFactoryConfig::new(StrategyType::Reasoning),
        bus.clone(),
    );

    let context = step_context(
        "deterministic_calculation",
        StepConfig::new().with_strategy("telepathic"),
    );
    let strategy = provider.get_strategy(&context, None).await;
    assert_eq!(strategy.strategy_type(), StrategyType::Reasoning);

    let event = next_selection(&mut selections).await?;
    assert_eq!(event.declared_strategy.as_deref(), Some("telepathic"));
    assert_eq!(event.selected_strategy, StrategyType::Reasoning);
    assert_eq!(event.selection_reason, SelectionReason::ManifestDeclared);
    Ok(())
}

#[tokio::test]
async fn test_configured_default_strategy_is_used() {
    let bus = Arc::new(InMemoryEventBus::new());
    let provider = StrategyProvider::new(
        StrategyFactoryConfig::new(StrategyType::Deterministic),
        bus.clone(),
    );

    let strategy = provider
        .get_strategy(&step_context("generic_step", StepConfig::new()), None)
        .await;
    assert_eq!(strategy.strategy_type(), StrategyType::Deterministic);
}

#[tokio::test]
async fn test_sensitive_data_overrides_conversational() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut overrides = bus.subscribe(Topic::StrategySafetyOverride);
    let mut selections = bus.subscribe(Topic::StrategySelection);
    let provider = provider(&bus);

    let context = step_context(
        "generic_step",
        StepConfig::new()
            .with_strategy("conversational")
            .with_sensitive_data(true),
    );
    let strategy = provider.get_strategy(&context, None).await;
    assert_eq!(strategy.strategy_type(), StrategyType::Deterministic);

    let safety = next_override(&mut overrides).await?;
    assert_eq!(safety.step_id, "step-1");
    assert_eq!(safety.original_strategy, StrategyType::Conversational);
    assert_eq!(safety.override_strategy, StrategyType::Deterministic);
    assert_eq!(safety.reason, "sensitive_data_protection");

    let selection = next_selection(&mut selections).await?;
    assert_eq!(selection.selected_strategy, StrategyType::Deterministic);
    assert!(selection.safety_override_applied);
    assert_eq!(selection.selection_reason, SelectionReason::ManifestDeclared);
    Ok(())
}

#[tokio::test]
async fn test_sensitive_data_from_default_is_overridden() {
    let bus = Arc::new(InMemoryEventBus::new());
    let provider = provider(&bus);

    let context = step_context("generic_step", StepConfig::new().with_sensitive_data(true));
    let strategy = provider.get_strategy(&context, None).await;
    assert_eq!(strategy.strategy_type(), StrategyType::Deterministic);
}

#[tokio::test]
async fn test_sensitive_data_keeps_non_conversational_choice() {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut overrides = bus.subscribe(Topic::StrategySafetyOverride);
    let provider = provider(&bus);

    let context = step_context(
        "generic_step",
        StepConfig::new()
            .with_strategy("reasoning")
            .with_sensitive_data(true),
    );
    let strategy = provider.get_strategy(&context, None).await;
    assert_eq!(strategy.strategy_type(), StrategyType::Reasoning);

    let nothing = tokio::time::timeout(Duration::from_millis(50), overrides.recv()).await;
    assert!(nothing.is_err(), "no override should be published");
}

#[tokio::test]
async fn test_selection_event_payload() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut selections = bus.subscribe(Topic::StrategySelection);
    let provider = provider(&bus);

    let context = step_context("analysis", StepConfig::new())
        .with_user("user-3")
        .with_swarm("swarm-5");
    let hints = json!({"preferFast": true});
    provider.get_strategy(&context, Some(hints.clone())).await;

    let event = next_selection(&mut selections).await?;
    assert_eq!(event.step_id, "step-1");
    assert_eq!(event.routine_id, "routine-1");
    assert!(event.declared_strategy.is_none());
    assert_eq!(event.usage_hints, Some(hints));
    assert_eq!(event.context.step_type, "analysis");
    assert_eq!(event.context.tier, "tier3");
    assert_eq!(event.context.user_id.as_deref(), Some("user-3"));
    assert_eq!(event.context.swarm_id.as_deref(), Some("swarm-5"));
    Ok(())
}

#[tokio::test]
async fn test_instances_are_reused_per_type() {
    let bus = Arc::new(InMemoryEventBus::new());
    let provider = provider(&bus);

    let first = provider
        .get_strategy(&step_context("generic_step", StepConfig::new()), None)
        .await;
    let second = provider
        .get_strategy(&step_context("other_step", StepConfig::new()), None)
        .await;
    assert!(Arc::ptr_eq(&first, &second));

    let reasoning = provider
        .get_strategy(&step_context("reasoning_step", StepConfig::new()), None)
        .await;
    assert!(!Arc::ptr_eq(&first, &reasoning));
    assert_eq!(provider.cached_count(), 2);
}

#[tokio::test]
async fn test_telemetry_failure_does_not_block_selection() {
    let bus = Arc::new(InMemoryEventBus::new());
    bus.shutdown();
    let provider = provider(&bus);

    let context = step_context("generic_step", StepConfig::new().with_sensitive_data(true));
    let strategy = provider.get_strategy(&context, None).await;
    assert_eq!(strategy.strategy_type(), StrategyType::Deterministic);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_builds_one_instance(
) -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(InMemoryEventBus::new());
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let factory = move |strategy_type: StrategyType| -> Arc<dyn ExecutionStrategy> {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        DefaultStrategyFactory.create(strategy_type)
    };
    let provider = Arc::new(StrategyProvider::with_factory(
        StrategyFactoryConfig::default(),
        bus.clone(),
        Arc::new(factory),
    ));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let provider = provider.clone();
        handles.push(tokio::spawn(async move {
            provider
                .get_strategy(
                    &step_context("deterministic_calculation", StepConfig::new()),
                    None,
                )
                .await
        }));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await?);
    }

    assert_eq!(built.load(Ordering::SeqCst), 1);
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
    Ok(())
}

#[test]
fn test_adaptation_settings_are_exposed() {
    let bus = Arc::new(InMemoryEventBus::new());
    let config = StrategyFactoryConfig::new(StrategyType::Reasoning)
        .with_fallback_chain(vec![StrategyType::Deterministic])
        .with_adaptation(true, 0.25);
    let provider = StrategyProvider::new(config.clone(), bus);

    assert_eq!(provider.config(), &config);
    assert!(provider.config().adaptation_enabled);
    assert_eq!(provider.cached_count(), 0);
}
