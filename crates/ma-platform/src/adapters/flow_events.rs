use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use ma_core::ports::{FlowEventPort, FlowLifecycleEvent};

/// Logs lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct TracingFlowEvents;

#[async_trait]
impl FlowEventPort for TracingFlowEvents {
    async fn emit(&self, event: FlowLifecycleEvent) {
        match event {
            FlowLifecycleEvent::Started { session_id } => {
                info!(session_id = %session_id, "flow started");
            }
            FlowLifecycleEvent::Completed { session_id } => {
                info!(session_id = %session_id, "flow completed");
            }
            FlowLifecycleEvent::Analytics {
                session_id,
                name,
                path,
            } => {
                info!(session_id = %session_id, name = %name, path = ?path, "analytics event");
            }
        }
    }
}

/// Forwards lifecycle events to an in-process channel.
pub struct ChannelFlowEvents {
    sender: mpsc::UnboundedSender<FlowLifecycleEvent>,
}

impl ChannelFlowEvents {
    pub fn new(sender: mpsc::UnboundedSender<FlowLifecycleEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl FlowEventPort for ChannelFlowEvents {
    async fn emit(&self, event: FlowLifecycleEvent) {
        if let Err(err) = self.sender.send(event) {
            warn!(event = ?err.0, "lifecycle receiver dropped, event discarded");
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingFlowEvents {
    events: Mutex<Vec<FlowLifecycleEvent>>,
}

impl RecordingFlowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FlowLifecycleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FlowEventPort for RecordingFlowEvents {
    async fn emit(&self, event: FlowLifecycleEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
