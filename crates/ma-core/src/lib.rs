//! # ma-core
//!
//! Core domain models and flow state machines for the edit-account flow.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod account;
pub mod config;
pub mod designation;
pub mod flow;
pub mod ids;
pub mod notification;
pub mod ports;
pub mod tunnel;

// Re-export commonly used types at the crate root
pub use account::{AuthRecord, AuthUser, HcpValidationStatus, ProfileUpdate, Section};
pub use config::FlowConfig;
pub use designation::DesignationTable;
pub use flow::{StepEvent, StepName, StepState, StepStateMachine};
pub use ids::FlowSessionId;
pub use notification::{Notification, NotificationKind};
pub use tunnel::{FieldHandle, FieldKind, FieldMetadata, FieldValue, FormTunnel, FormValue};
