use ma_core::flow::StepName;
use thiserror::Error;

use crate::validation::FieldError;

/// Errors returned to the host by the flow.
///
/// Update failures are not errors here: they are turned into notifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// No signed-in user at flow start; the flow has been closed.
    #[error("no authenticated user; flow closed")]
    NoAuthenticatedUser,

    #[error("flow is closed")]
    Closed,

    #[error("step {step} has {} invalid field(s)", .errors.len())]
    Validation {
        step: StepName,
        errors: Vec<FieldError>,
    },

    #[error("a submission for {0} is already in flight")]
    SubmissionInFlight(StepName),

    #[error("the action button of {0} is disabled")]
    ActionDisabled(StepName),

    /// The professional step is closed to validated HCPs.
    #[error("step {0} is locked for a validated HCP")]
    Locked(StepName),

    #[error("step {0} has no editable section")]
    NotEditable(StepName),
}
