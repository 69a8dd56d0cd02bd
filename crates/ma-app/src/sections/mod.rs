//! Section view-models for the three editable steps.
//!
//! A section owns its field widgets, mounts them into the flow registry and
//! reacts to step-shown notifications. Sections never call the auth service;
//! they signal upward with [`FlowMessage`]s and the orchestrator does the rest.

pub mod password;
pub mod personal;
pub mod professional;

pub use password::PasswordSection;
pub use personal::PersonalSection;
pub use professional::ProfessionalSection;

use ma_core::account::AuthRecord;
use ma_core::config::FlowConfig;
use ma_core::flow::StepName;
use ma_core::tunnel::FieldValue;

use crate::context::FlowContext;
use crate::events::FlowMessage;
use crate::validation::FieldError;

/// What a section is seeded from when its step is shown.
#[derive(Debug, Clone, Copy)]
pub struct SectionSeed<'a> {
    pub record: &'a AuthRecord,
    /// Display flag for the email-permission checkbox.
    pub email_permission_subscribed: bool,
    /// Current `hcpValidationStatus` variable.
    pub hcp_validated: bool,
}

pub trait SectionViewModel: Send + Sync {
    fn step(&self) -> StepName;

    /// Register every widget of this section in the flow registry.
    fn mount(&self, ctx: &FlowContext);

    fn unmount(&self, ctx: &FlowContext);

    /// Populate the widgets for display.
    fn on_step_shown(&self, seed: SectionSeed<'_>);

    /// Apply a user edit; returns the signals it raises.
    fn on_field_input(&self, field: &str, value: FieldValue) -> Vec<FlowMessage>;

    /// Local validation run before the step may complete.
    fn validate(&self, config: &FlowConfig) -> Result<(), Vec<FieldError>>;

    /// Reset local state and produce the `Cancelled` signal.
    fn cancel(&self) -> FlowMessage;

    /// Field focused when the step is shown with `focus_first_field`.
    fn focus_target(&self) -> &str;
}
