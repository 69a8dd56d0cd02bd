//! Per-section submission state machine.
//!
//! `Idle → Submitting → (Succeeded | Failed) → Idle`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionEvent {
    /// The step completed and its values were gathered.
    Submit,
    /// The external update resolved.
    Resolved,
    /// The external update rejected.
    Rejected,
    /// Feedback was shown; ready for the next submission.
    Settle,
}

/// Side-effects the orchestrator executes, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionAction {
    /// Snapshot variables, set `disableActionButton` and the step loading flag.
    BeginLoading,
    InvokeUpdate,
    /// A submission for this section is already in flight.
    RejectReentrant,
    Reconcile,
    NotifySuccess,
    /// Restore the pre-submission variable snapshot.
    RollBack,
    NotifyFailure,
    EndLoading,
}

pub struct SubmissionStateMachine;

impl SubmissionStateMachine {
    pub fn transition(
        state: SubmissionState,
        event: SubmissionEvent,
    ) -> (SubmissionState, Vec<SubmissionAction>) {
        use SubmissionAction::*;

        match (state, event) {
            (SubmissionState::Submitting, SubmissionEvent::Submit) => {
                (SubmissionState::Submitting, vec![RejectReentrant])
            }
            (_, SubmissionEvent::Submit) => {
                (SubmissionState::Submitting, vec![BeginLoading, InvokeUpdate])
            }
            (SubmissionState::Submitting, SubmissionEvent::Resolved) => (
                SubmissionState::Succeeded,
                vec![Reconcile, NotifySuccess, EndLoading],
            ),
            (SubmissionState::Submitting, SubmissionEvent::Rejected) => (
                SubmissionState::Failed,
                vec![RollBack, NotifyFailure, EndLoading],
            ),
            (SubmissionState::Succeeded | SubmissionState::Failed, SubmissionEvent::Settle) => {
                (SubmissionState::Idle, Vec::new())
            }
            (state, _event) => (state, Vec::new()),
        }
    }
}
