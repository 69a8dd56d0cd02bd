//! Step controller: owns the step declarations and drives navigation through
//! [`StepStateMachine`].

use ma_core::flow::{Step, StepAction, StepEvent, StepName, StepState, StepStateMachine};
use tracing::info;

pub struct StepController {
    state: StepState,
    steps: Vec<Step>,
}

impl StepController {
    pub fn new() -> Self {
        Self {
            state: StepState::initial(),
            steps: Step::declarations(),
        }
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    /// Currently active step; `None` once closed.
    pub fn current(&self) -> Option<StepName> {
        self.state.current()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Feed `event` to the state machine and return the actions to execute.
    pub fn apply(&mut self, event: StepEvent) -> Vec<StepAction> {
        let from = self.state.clone();
        let event_name = format!("{:?}", event);
        let (next, actions) = StepStateMachine::transition(from.clone(), event);
        info!(from = ?from, to = ?next, event = %event_name, "step state transition");
        self.state = next;
        actions
    }

    pub fn step(&self, name: StepName) -> Option<&Step> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn set_loading(&mut self, name: StepName, loading: bool) {
        if let Some(step) = self.steps.iter_mut().find(|step| step.name == name) {
            step.loading = loading;
        }
    }

    pub fn is_loading(&self, name: StepName) -> bool {
        self.step(name).map(|step| step.loading).unwrap_or(false)
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}
