//! Event Channel
//!
//! Addressable publish/subscribe bus between the step executor, the
//! execution engine and telemetry consumers.
//!
//! ```text
//! StepExecutor ── execution.request ──► Engine
//! StepExecutor ◄── execution.result ─── Engine
//! StrategyProvider ── strategy.* ─────► Telemetry
//! ```
//!
//! A [`Subscription`] sees every event published on its topic after it was
//! opened; dropping it unsubscribes. Events are never dropped for a live
//! subscriber: each one owns a bounded queue and `publish` waits while that
//! queue is full.

use crate::error::EventBusError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tierflow_constants::DEFAULT_EVENT_BUS_CAPACITY;
use tierflow_types::{BusEvent, Topic};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Publish/subscribe contract the orchestration core depends on
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Publish an event on the topic derived from its variant
    async fn publish(&self, event: BusEvent) -> Result<(), EventBusError>;

    /// Open a subscription to a topic
    fn subscribe(&self, topic: Topic) -> Subscription;
}

/// Receiving side of a topic subscription
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::Receiver<BusEvent>,
}

impl Subscription {
    /// Wrap a subscriber queue for the given topic
    pub fn new(topic: Topic, receiver: mpsc::Receiver<BusEvent>) -> Self {
        Self { topic, receiver }
    }

    /// Wait for the next event. Returns `None` once the bus has shut down
    /// and every queued event was consumed.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.receiver.recv().await
    }

    /// Stop receiving events
    pub fn unsubscribe(mut self) {
        self.receiver.close();
        debug!(topic = %self.topic, "Unsubscribed");
    }
}

type Subscribers = HashMap<Topic, Vec<mpsc::Sender<BusEvent>>>;

/// In-process event bus with one bounded queue per subscriber
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    capacity: usize,
    closed: Arc<AtomicBool>,
}

impl InMemoryEventBus {
    /// Create a bus with the default per-subscriber capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_BUS_CAPACITY)
    }

    /// Create a bus queueing up to `capacity` events per subscriber before
    /// publishers wait
    pub fn with_capacity(capacity: usize) -> Self {
        let subscribers = Topic::all()
            .into_iter()
            .map(|topic| (topic, Vec::new()))
            .collect();
        Self {
            subscribers: Arc::new(Mutex::new(subscribers)),
            capacity: capacity.max(1),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a bus sized from `TIERFLOW_EVENT_BUS_CAPACITY`
    pub fn from_env() -> Self {
        crate::config::load_dotenv();
        Self::with_capacity(crate::config::env::event_bus::capacity())
    }

    /// Refuse further publishes and end every subscription once its queue
    /// is drained. Shared by every clone of this bus.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.lock().values_mut().for_each(Vec::clear);
        debug!("Event bus shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions on a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let mut subscribers = self.lock();
        let senders = subscribers.entry(topic).or_default();
        senders.retain(|sender| !sender.is_closed());
        senders.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventChannel for InMemoryEventBus {
    async fn publish(&self, event: BusEvent) -> Result<(), EventBusError> {
        let topic = event.topic();
        if self.is_closed() {
            return Err(EventBusError::closed(format!(
                "cannot publish on {}",
                topic.as_str()
            )));
        }

        // Snapshot so the lock is not held across sends
        let senders: Vec<_> = self.lock().get(&topic).cloned().unwrap_or_default();

        let mut delivered = 0;
        let mut stale = false;
        for sender in senders {
            match sender.send(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => stale = true,
            }
        }

        if stale {
            if let Some(senders) = self.lock().get_mut(&topic) {
                senders.retain(|sender| !sender.is_closed());
            }
        }

        if delivered == 0 {
            debug!(topic = %topic, "Event published with no subscribers");
        } else {
            trace!(topic = %topic, receivers = delivered, "Event published");
        }
        Ok(())
    }

    fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        if !self.is_closed() {
            self.lock().entry(topic).or_default().push(sender);
        }
        Subscription::new(topic, receiver)
    }
}
