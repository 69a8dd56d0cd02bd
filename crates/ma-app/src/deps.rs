use std::sync::Arc;

use ma_core::config::FlowConfig;
use ma_core::ports::{AuthServicePort, FlowEventPort, NotificationPort};

/// Ports and configuration the flow is built from.
#[derive(Clone)]
pub struct AccountFlowDeps {
    pub auth: Arc<dyn AuthServicePort>,
    pub notifications: Arc<dyn NotificationPort>,
    pub lifecycle: Arc<dyn FlowEventPort>,
    pub config: Arc<FlowConfig>,
}

impl AccountFlowDeps {
    pub fn new(
        auth: Arc<dyn AuthServicePort>,
        notifications: Arc<dyn NotificationPort>,
        lifecycle: Arc<dyn FlowEventPort>,
        config: FlowConfig,
    ) -> Self {
        Self {
            auth,
            notifications,
            lifecycle,
            config: Arc::new(config),
        }
    }
}
