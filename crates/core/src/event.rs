//! Change-notification bus.
//!
//! Delivery is synchronous and in registration order. A failing subscriber
//! is logged and skipped; later subscribers still receive the event.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Names of the notifications published by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    /// The inline completion provider must be re-resolved.
    InlineCompletionProviderUpdated,
    /// The set of configured providers changed.
    ModelProvidersUpdated,
}

impl EventName {
    /// Wire name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineCompletionProviderUpdated => "inlineCompletionProviderUpdated",
            Self::ModelProvidersUpdated => "modelProvidersUpdated",
        }
    }
}

/// Event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Unix timestamp in milliseconds.
    pub updated_at: i64,
}

/// A published notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: EventName,
    pub payload: Payload,
}

impl Event {
    /// An event of `name` stamped with the current time.
    pub fn now(name: EventName) -> Self {
        Self {
            name,
            payload: Payload {
                updated_at: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Publish point for [`Event`]s.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<(EventName, Handler)>>,
}

impl EventBus {
    /// Create a bus without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events named `name`.
    pub fn subscribe<F>(&self, name: EventName, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribers.lock().push((name, Arc::new(handler)));
    }

    /// Deliver `event` to its subscribers. Returns how many handled it
    /// without error.
    pub fn publish(&self, event: Event) -> usize {
        // Snapshot so handlers may subscribe or publish re-entrantly.
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .iter()
            .filter(|(name, _)| *name == event.name)
            .map(|(_, handler)| handler.clone())
            .collect();

        tracing::debug!(
            "publishing {} to {} subscribers",
            event.name.as_str(),
            handlers.len()
        );
        let mut delivered = 0;
        for handler in handlers {
            match handler(&event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("subscriber of {} failed: {e:#}", event.name.as_str()),
            }
        }
        delivered
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        self.subscribers.lock().clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}
