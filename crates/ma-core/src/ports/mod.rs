//! Port interfaces for the application layer
//!
//! Ports define the contract between the flow orchestration (use cases) and
//! the collaborators that live outside it: the authentication service, the
//! notification surface and the host page.

pub mod auth_service;
pub mod errors;
pub mod flow_events;
pub mod notification;

pub use auth_service::{AuthServicePort, PasswordChangeConfig};
pub use errors::AuthServiceError;
pub use flow_events::{FlowEventPort, FlowLifecycleEvent};
pub use notification::NotificationPort;
