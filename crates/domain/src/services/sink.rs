//! Event sink abstraction for downstream notification fan-out.
//!
//! The engine publishes domain events; delivery (push, email, chat
//! narration) happens elsewhere. A failed publish must never roll back the
//! detection that produced the event.

use tokio::sync::Mutex;
use tracing::info;

use crate::error::EngineError;
use crate::models::DomainEvent;

/// Downstream consumer of domain events.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one domain event. Delivery is at-least-once; consumers
    /// dedupe on event content.
    async fn publish(&self, event: DomainEvent) -> Result<(), EngineError>;
}

/// Sink that logs events instead of delivering them.
///
/// Used by the backfill binary when no downstream fan-out is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogEventSink;

#[async_trait::async_trait]
impl EventSink for LogEventSink {
    async fn publish(&self, event: DomainEvent) -> Result<(), EngineError> {
        info!(
            device_id = %event.device_id,
            event_type = event.event_type.as_str(),
            severity = event.severity.as_str(),
            title = %event.title,
            "domain event"
        );
        Ok(())
    }
}

/// Mock sink for development and testing.
///
/// Records published events so tests can assert on them.
#[derive(Debug, Default)]
pub struct MockEventSink {
    events: Mutex<Vec<DomainEvent>>,
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockEventSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock sink that simulates publish failures.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            simulate_failure: true,
        }
    }

    /// Snapshot of everything published so far.
    pub async fn published(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EventSink for MockEventSink {
    async fn publish(&self, event: DomainEvent) -> Result<(), EngineError> {
        if self.simulate_failure {
            return Err(EngineError::EventSink("simulated failure".into()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}
