//! Strategy Provider
//!
//! Selects the execution strategy for a step, applies the sensitive data
//! safety override, emits selection telemetry, and hands out one cached
//! instance per strategy type.

use super::helpers::{safety_override, select_strategy_type};
use super::{DefaultStrategyFactory, ExecutionStrategy, StrategyFactory, UsageHints};
use crate::event_bus::EventChannel;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tierflow_constants::{EXECUTION_TIER, REASON_SENSITIVE_DATA_PROTECTION};
use tierflow_types::{
    BusEvent, ExecutionContext, SafetyOverrideEvent, SelectionContext, StrategyFactoryConfig,
    StrategySelectionEvent, StrategyType,
};
use tracing::{debug, info, instrument, warn};

/// Chooses and caches execution strategies
pub struct StrategyProvider {
    config: StrategyFactoryConfig,
    bus: Arc<dyn EventChannel>,
    factory: Arc<dyn StrategyFactory>,
    cache: Mutex<HashMap<StrategyType, Arc<dyn ExecutionStrategy>>>,
}

impl StrategyProvider {
    /// Create a provider with the built-in strategies
    pub fn new(config: StrategyFactoryConfig, bus: Arc<dyn EventChannel>) -> Self {
        Self::with_factory(config, bus, Arc::new(DefaultStrategyFactory))
    }

    /// Create a provider with a custom strategy factory
    pub fn with_factory(
        config: StrategyFactoryConfig,
        bus: Arc<dyn EventChannel>,
        factory: Arc<dyn StrategyFactory>,
    ) -> Self {
        if config.adaptation_enabled {
            debug!(
                learning_rate = config.learning_rate,
                "Adaptive strategy selection requested; selection stays rule based"
            );
        }
        Self {
            config,
            bus,
            factory,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Provider configuration
    pub fn config(&self) -> &StrategyFactoryConfig {
        &self.config
    }

    /// Number of strategy instances built so far
    pub fn cached_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Select the strategy for a step. Never fails.
    #[instrument(skip(self, context, usage_hints), fields(
        step_id = %context.step_id,
        step_type = %context.step_type
    ))]
    pub async fn get_strategy(
        &self,
        context: &ExecutionContext,
        usage_hints: Option<UsageHints>,
    ) -> Arc<dyn ExecutionStrategy> {
        let decision = select_strategy_type(context, self.config.default_strategy);
        let mut selected = decision.strategy;

        let overridden = safety_override(decision.strategy, context);
        if let Some(safety) = overridden {
            warn!(
                original = %safety.original,
                replacement = %safety.replacement,
                "Sensitive data step, overriding strategy"
            );
            selected = safety.replacement;
            self.emit(BusEvent::StrategySafetyOverride(SafetyOverrideEvent {
                step_id: context.step_id.clone(),
                original_strategy: safety.original,
                override_strategy: safety.replacement,
                reason: REASON_SENSITIVE_DATA_PROTECTION.to_string(),
            }))
            .await;
        }

        self.emit(BusEvent::StrategySelection(StrategySelectionEvent {
            step_id: context.step_id.clone(),
            routine_id: context.routine_id.clone(),
            declared_strategy: decision.declared,
            selected_strategy: selected,
            safety_override_applied: overridden.is_some(),
            usage_hints,
            context: SelectionContext {
                step_type: context.step_type.clone(),
                tier: EXECUTION_TIER.to_string(),
                user_id: context.user_id.clone(),
                swarm_id: context.swarm_id.clone(),
            },
            selection_reason: decision.reason,
            timestamp: Utc::now(),
        }))
        .await;

        info!(
            strategy = %selected,
            reason = decision.reason.as_str(),
            "[StrategyProvider] Strategy selected"
        );

        self.instance(selected)
    }

    /// Cached instance for a type, built on first use. The lock is held
    /// across construction so only one instance per type ever exists.
    fn instance(&self, strategy_type: StrategyType) -> Arc<dyn ExecutionStrategy> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            cache
                .entry(strategy_type)
                .or_insert_with(|| self.factory.create(strategy_type)),
        )
    }

    async fn emit(&self, event: BusEvent) {
        let topic = event.topic();
        if let Err(e) = self.bus.publish(event).await {
            warn!(topic = %topic, "Failed to publish strategy telemetry: {}", e);
        }
    }
}
