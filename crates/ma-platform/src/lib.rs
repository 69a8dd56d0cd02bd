//! # ma-platform
//!
//! Adapter implementations of the `ma-core` ports.
//!
//! This crate contains the in-memory authentication service used by the
//! console host and the tests, plus notification and lifecycle adapters
//! backed by `tracing`, channels or in-memory recorders.

pub mod adapters;

pub use adapters::{
    AuthFixture, ChannelFlowEvents, InMemoryAuthService, RecordingFlowEvents,
    RecordingNotifications, TracingFlowEvents, TracingNotificationSink,
};
