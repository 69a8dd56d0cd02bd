use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::FlowSessionId;

/// Signals the flow sends to its host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowLifecycleEvent {
    Started { session_id: FlowSessionId },
    Completed { session_id: FlowSessionId },
    /// Analytics payload with a name and a component path.
    Analytics {
        session_id: FlowSessionId,
        name: String,
        path: Vec<String>,
    },
}

#[async_trait]
pub trait FlowEventPort: Send + Sync {
    async fn emit(&self, event: FlowLifecycleEvent);
}
