//! Step navigation state machine.
//!
//! Defines a pure state transition function for the edit-account flow.

use serde::{Deserialize, Serialize};

use super::step::StepName;

/// Navigation state of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    /// Exactly one step is current.
    Active { current: StepName },
    /// The host asked to close, or no user was signed in.
    Closed,
}

impl StepState {
    pub fn initial() -> Self {
        Self::Active {
            current: StepName::Account,
        }
    }

    pub fn current(&self) -> Option<StepName> {
        match self {
            Self::Active { current } => Some(*current),
            Self::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl Default for StepState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Events that drive navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepEvent {
    /// Unconditional transition to `step`.
    GoTo {
        step: StepName,
        focus_first_field: bool,
    },
    /// Remove any pending banner without changing step.
    ClearNotifications,
    Close,
}

/// Side-effects produced by navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    /// Tell the destination section it is being shown.
    EmitStepShown {
        step: StepName,
        focus_first_field: bool,
    },
    ClearNotifications,
    EmitFlowCompleted,
}

/// Pure step state machine.
pub struct StepStateMachine;

impl StepStateMachine {
    pub fn transition(state: StepState, event: StepEvent) -> (StepState, Vec<StepAction>) {
        match (state, event) {
            (
                StepState::Active { .. },
                StepEvent::GoTo {
                    step,
                    focus_first_field,
                },
            ) => (
                StepState::Active { current: step },
                vec![StepAction::EmitStepShown {
                    step,
                    focus_first_field,
                }],
            ),
            (state @ StepState::Active { .. }, StepEvent::ClearNotifications) => {
                (state, vec![StepAction::ClearNotifications])
            }
            (StepState::Active { .. }, StepEvent::Close) => {
                (StepState::Closed, vec![StepAction::EmitFlowCompleted])
            }
            (StepState::Closed, _event) => (StepState::Closed, Vec::new()),
        }
    }
}
