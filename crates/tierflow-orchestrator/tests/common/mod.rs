//! Shared helpers for orchestrator integration tests

#![allow(dead_code)]

use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tierflow_orchestrator::{EventChannel, InMemoryEventBus};
use tierflow_types::{
    BusEvent, EngineResult, ExecutionRequestEvent, ExecutionResultEvent, RunContext, StepInfo,
    StepLocation, StepType, Topic, Variables,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Initialize tracing with appropriate filters for tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tierflow_orchestrator=warn".into()),
        )
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged at
/// warn level or above
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}

/// Fake execution engine: answers every request with whatever `respond`
/// returns. `None` means the request is dropped on the floor.
///
/// The request subscription is opened before the task is spawned, so the
/// engine is listening as soon as this returns.
pub fn spawn_engine<F>(bus: Arc<InMemoryEventBus>, respond: F) -> JoinHandle<()>
where
    F: Fn(&ExecutionRequestEvent) -> Option<EngineResult> + Send + 'static,
{
    let mut requests = bus.subscribe(Topic::ExecutionRequest);
    tokio::spawn(async move {
        while let Some(event) = requests.recv().await {
            let BusEvent::ExecutionRequest(request) = event else {
                continue;
            };
            if let Some(result) = respond(&request) {
                let reply = ExecutionResultEvent::new(request.request_id.clone(), result);
                let _ = bus.publish(BusEvent::ExecutionResult(reply)).await;
            }
        }
    })
}

/// Engine that succeeds and forwards every request to `captured`
pub fn spawn_capturing_engine(
    bus: Arc<InMemoryEventBus>,
) -> (JoinHandle<()>, mpsc::UnboundedReceiver<ExecutionRequestEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = spawn_engine(bus, move |request| {
        let _ = tx.send(request.clone());
        Some(EngineResult::success(Variables::new()))
    });
    (handle, rx)
}

pub fn outputs(value: serde_json::Value) -> Variables {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn action_step(id: &str) -> StepInfo {
    StepInfo::new(id, format!("Step {id}"), StepType::Action)
}

pub fn location() -> StepLocation {
    StepLocation::new("routine-1", "node-1")
}

pub fn run_context() -> RunContext {
    RunContext::new().with_variable("run_var", json!("from-run"))
}
