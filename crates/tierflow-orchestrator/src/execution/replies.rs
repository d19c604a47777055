//! Pending reply registry
//!
//! One dispatcher task per executor drains the `execution.result` topic and
//! completes the single-shot channel registered under the matching request
//! id. Waiters never see each other's results.

use crate::event_bus::Subscription;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tierflow_types::{BusEvent, EngineResult};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Reply senders keyed by request id
#[derive(Debug, Default)]
pub struct PendingReplies {
    waiters: Mutex<HashMap<String, oneshot::Sender<EngineResult>>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter. Must happen before the request is published.
    pub fn register(&self, request_id: &str) -> oneshot::Receiver<EngineResult> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(request_id.to_string(), tx);
        rx
    }

    /// Hand a result to its waiter. Unknown or expired ids are a no-op.
    pub fn complete(&self, request_id: &str, result: EngineResult) -> bool {
        match self.lock().remove(request_id) {
            Some(tx) => tx.send(result).is_ok(),
            None => {
                trace!(request_id = %request_id, "No waiter for result");
                false
            }
        }
    }

    /// Forget a waiter, e.g. after its timeout fired
    pub fn remove(&self, request_id: &str) {
        self.lock().remove(request_id);
    }

    /// Drop every waiter so each one observes a closed channel
    pub fn fail_all(&self) {
        let dropped = {
            let mut waiters = self.lock();
            let count = waiters.len();
            waiters.clear();
            count
        };
        if dropped > 0 {
            debug!(dropped = dropped, "Abandoned pending replies");
        }
    }

    /// Number of requests still waiting for a result
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<EngineResult>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Route every result on `results` to its waiter until the bus shuts down
pub async fn dispatch_results(mut results: Subscription, pending: Arc<PendingReplies>) {
    while let Some(event) = results.recv().await {
        if let BusEvent::ExecutionResult(reply) = event {
            pending.complete(&reply.request_id, reply.result);
        }
    }
    debug!("Result stream closed");
    pending.fail_all();
}
