//! Typed messages exchanged inside one flow.
//!
//! Host interactions and the upward signals raised by sections share one
//! vocabulary. The orchestrator is the single consumer.

use ma_core::flow::StepName;
use ma_core::tunnel::FieldValue;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMessage {
    // Host interactions
    /// "Edit" clicked on the overview, or any other navigation request.
    GoToStep {
        step: StepName,
        focus_first_field: bool,
    },
    /// The user changed a field on the current step.
    FieldValueChanged { field: String, value: FieldValue },
    /// The user pressed the step's primary action.
    SaveRequested { step: StepName },
    /// The user pressed the step's cancel link.
    CancelRequested { step: StepName },
    /// License input finished its own validity check.
    LicenseValidity { is_valid: bool },
    CloseRequested,

    // Upward signals from sections and the step controller
    StepShown {
        step: StepName,
        focus_first_field: bool,
    },
    /// Local validation passed; gather values and submit.
    StepCompleted { step: StepName },
    Cancelled { step: StepName },
    EmailPermissionChanged { subscribed: bool },
    UnlockForEditing,
}

impl FlowMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GoToStep { .. } => "goToStep",
            Self::FieldValueChanged { .. } => "fieldValueChanged",
            Self::SaveRequested { .. } => "saveRequested",
            Self::CancelRequested { .. } => "cancelRequested",
            Self::LicenseValidity { .. } => "isValidLicense",
            Self::CloseRequested => "closeFlow",
            Self::StepShown { .. } => "stepShown",
            Self::StepCompleted { .. } => "progressStep",
            Self::Cancelled { .. } => "cancelled",
            Self::EmailPermissionChanged { .. } => "emailPermissionEvent",
            Self::UnlockForEditing => "unlockForEditing",
        }
    }
}

pub type FlowMessageSender = mpsc::UnboundedSender<FlowMessage>;
pub type FlowMessageReceiver = mpsc::UnboundedReceiver<FlowMessage>;

/// Flow-owned message bus.
///
/// Hosts keep a sender; the receiving end is handed to `AccountFlow::run`.
pub struct FlowBus {
    sender: FlowMessageSender,
    receiver: FlowMessageReceiver,
}

impl FlowBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> FlowMessageSender {
        self.sender.clone()
    }

    pub fn split(self) -> (FlowMessageSender, FlowMessageReceiver) {
        (self.sender, self.receiver)
    }
}

impl Default for FlowBus {
    fn default() -> Self {
        Self::new()
    }
}
