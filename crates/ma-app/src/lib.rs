//! Edit-account flow orchestration layer
//!
//! This crate contains the section view-models, the step controller and the
//! update orchestrator that drive the flow against the `ma-core` ports.

pub mod context;
pub mod deps;
pub mod error;
pub mod events;
pub mod fields;
pub mod orchestrator;
pub mod overview;
pub mod sections;
pub mod step_controller;
pub mod validation;

pub use context::FlowContext;
pub use deps::AccountFlowDeps;
pub use error::FlowError;
pub use events::{FlowBus, FlowMessage};
pub use orchestrator::AccountFlow;
pub use overview::AccountOverview;
pub use step_controller::StepController;
