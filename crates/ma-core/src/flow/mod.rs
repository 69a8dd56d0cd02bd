//! Flow domain module.
//!
//! Step declarations, the step-navigation state machine and the per-section
//! submission state machine.

pub mod state_machine;
pub mod step;
pub mod submission;

pub use state_machine::{StepAction, StepEvent, StepState, StepStateMachine};
pub use step::{Step, StepName};
pub use submission::{
    SubmissionAction, SubmissionEvent, SubmissionState, SubmissionStateMachine,
};
