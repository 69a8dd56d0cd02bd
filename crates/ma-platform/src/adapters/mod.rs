//! # Adapters
//!
//! - `auth` - In-memory auth service seeded from a JSON fixture
//! - `notification` - Notification sinks (tracing, recording)
//! - `flow_events` - Lifecycle emitters (tracing, channel, recording)

pub mod auth;
pub mod flow_events;
pub mod notification;

pub use auth::{AuthFixture, InMemoryAuthService};
pub use flow_events::{ChannelFlowEvents, RecordingFlowEvents, TracingFlowEvents};
pub use notification::{RecordingNotifications, TracingNotificationSink};
