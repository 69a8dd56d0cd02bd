//! Edit-account flow orchestrator.
//!
//! This module coordinates the step controller, the section view-models and
//! the per-section submission state machine, and executes their side effects
//! against the auth, notification and lifecycle ports.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, info_span, warn, Instrument};

use ma_core::account::{
    AuthRecord, ChangePasswordRequest, PersonalUpdate, ProfessionalUpdate, ProfileUpdate, Section,
};
use ma_core::flow::{
    StepAction, StepEvent, StepName, SubmissionAction, SubmissionEvent, SubmissionState,
    SubmissionStateMachine,
};
use ma_core::notification::Notification;
use ma_core::ports::{AuthServiceError, FlowLifecycleEvent};
use ma_core::tunnel::{
    FieldValue, FormVariables, DISABLE_ACTION_BUTTON, HCP_VALIDATION_STATUS,
};

use crate::context::FlowContext;
use crate::deps::AccountFlowDeps;
use crate::error::FlowError;
use crate::events::{FlowMessage, FlowMessageReceiver};
use crate::overview::AccountOverview;
use crate::sections::password::{NEW_PASSWORD, OLD_PASSWORD};
use crate::sections::personal::{EMAIL, FAMILY_NAME, GIVEN_NAME};
use crate::sections::professional::{
    CITY, DESIGNATION_NAME, DESIGNATION_SPECIALTY, LICENSE, POSTAL_CODE, STATE, STREET,
};
use crate::sections::{
    PasswordSection, PersonalSection, ProfessionalSection, SectionSeed, SectionViewModel,
};
use crate::step_controller::StepController;

const ANALYTICS_PASSWORD_ATTEMPT: &str = "MyAccountFlowInitiated";
const ANALYTICS_PATH: &str = "AccountFlow";

/// Variables a submission writes and puts back on failure.
const SUBMISSION_VARIABLES: &[&str] = &[DISABLE_ACTION_BUTTON];

/// Values gathered from the registry for one submission.
enum SubmissionRequest {
    Profile(ProfileUpdate),
    Password(ChangePasswordRequest),
}

/// Working state of one pass through the submission machine.
struct SubmissionRun {
    section: Section,
    step: StepName,
    request: SubmissionRequest,
    snapshot: FormVariables,
    /// `Some(record)` for profile updates, `None` for password changes.
    outcome: Option<Result<Option<AuthRecord>, AuthServiceError>>,
    became_validated: bool,
}

/// Orchestrator that drives the edit-account flow and its side effects.
pub struct AccountFlow {
    deps: AccountFlowDeps,
    context: FlowContext,
    controller: Mutex<StepController>,
    submissions: Mutex<HashMap<Section, SubmissionState>>,
    /// Display flag behind the overview's "marketing emails" line.
    email_permission_subscribed: AtomicBool,

    personal: PersonalSection,
    professional: ProfessionalSection,
    password: PasswordSection,
}

impl AccountFlow {
    pub fn new(deps: AccountFlowDeps) -> Self {
        Self::with_context(deps, FlowContext::new())
    }

    /// Build the flow on an existing context.
    ///
    /// Sections register their fields when their step is shown and drop them
    /// when the flow moves to another step.
    pub fn with_context(deps: AccountFlowDeps, context: FlowContext) -> Self {
        let professional = ProfessionalSection::new(deps.config.designations.clone());
        Self {
            deps,
            context,
            controller: Mutex::new(StepController::new()),
            submissions: Mutex::new(HashMap::new()),
            email_permission_subscribed: AtomicBool::new(false),
            personal: PersonalSection::new(),
            professional,
            password: PasswordSection::new(),
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn personal(&self) -> &PersonalSection {
        &self.personal
    }

    pub fn professional(&self) -> &ProfessionalSection {
        &self.professional
    }

    pub fn password(&self) -> &PasswordSection {
        &self.password
    }

    pub fn current_step(&self) -> Option<StepName> {
        self.controller().current()
    }

    pub fn is_closed(&self) -> bool {
        self.controller().is_closed()
    }

    pub fn is_loading(&self, step: StepName) -> bool {
        self.controller().is_loading(step)
    }

    pub fn submission_state(&self, section: Section) -> SubmissionState {
        self.submissions()
            .get(&section)
            .copied()
            .unwrap_or_default()
    }

    pub fn email_permission_subscribed(&self) -> bool {
        self.email_permission_subscribed.load(Ordering::SeqCst)
    }

    /// Overview of the cached record; `None` before start or after close.
    pub fn overview(&self) -> Option<AccountOverview> {
        self.context
            .cached_record()
            .map(|record| AccountOverview::project(&record, self.email_permission_subscribed()))
    }

    /// Load the signed-in user and prepare the overview.
    ///
    /// Without a user the flow is closed and `NoAuthenticatedUser` returned.
    pub async fn start(&self) -> Result<(), FlowError> {
        let span = info_span!(
            "usecase.account_flow.start",
            session_id = %self.context.session_id()
        );
        async {
            self.deps
                .lifecycle
                .emit(FlowLifecycleEvent::Started {
                    session_id: self.context.session_id().clone(),
                })
                .await;

            let Some(user) = self.deps.auth.current_user().await else {
                warn!("no authenticated user, closing account flow");
                self.close().await;
                return Err(FlowError::NoAuthenticatedUser);
            };

            let record = &user.auth_record;
            let status = record.hcp_validation.status.clone();
            self.email_permission_subscribed
                .store(record.email_permission.subscribed, Ordering::SeqCst);
            self.context
                .set_variable(HCP_VALIDATION_STATUS, record.is_validated_hcp());
            info!(user_id = %user.user_id, hcp_status = %status, "account flow started");
            self.context.set_cached_user(Some(user));

            if status == ma_core::HcpValidationStatus::Pending {
                self.notify(Notification::error(
                    self.deps.config.messages.not_validated.clone(),
                ))
                .await;
            }
            self.context.set_variable(DISABLE_ACTION_BUTTON, false);
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn go_to(&self, step: StepName, focus_first_field: bool) -> Result<(), FlowError> {
        self.dispatch(FlowMessage::GoToStep {
            step,
            focus_first_field,
        })
        .await
    }

    pub async fn input(&self, field: &str, value: FieldValue) -> Result<(), FlowError> {
        self.dispatch(FlowMessage::FieldValueChanged {
            field: field.to_string(),
            value,
        })
        .await
    }

    pub async fn save(&self, step: StepName) -> Result<(), FlowError> {
        self.dispatch(FlowMessage::SaveRequested { step }).await
    }

    pub async fn cancel(&self, step: StepName) -> Result<(), FlowError> {
        self.dispatch(FlowMessage::CancelRequested { step }).await
    }

    pub async fn close(&self) {
        let actions = self.controller().apply(StepEvent::Close);
        self.execute_step_actions(actions).await;
        self.context.teardown();
    }

    /// Process messages from the bus one at a time until the flow closes or
    /// every sender is dropped.
    pub async fn run(&self, mut receiver: FlowMessageReceiver) {
        while let Some(message) = receiver.recv().await {
            let name = message.name();
            if let Err(err) = self.dispatch(message).await {
                warn!(message = name, error = %err, "flow message rejected");
            }
            if self.is_closed() {
                debug!("account flow closed, message loop exiting");
                break;
            }
        }
    }

    /// Handle `message` and every follow-up signal it raises, in order.
    pub async fn dispatch(&self, message: FlowMessage) -> Result<(), FlowError> {
        let span = info_span!(
            "usecase.account_flow.dispatch",
            session_id = %self.context.session_id(),
            message = message.name()
        );
        async {
            let mut pending = VecDeque::from([message]);
            while let Some(message) = pending.pop_front() {
                debug!(message = ?message, "account flow handling message");
                let follow_ups = self.handle(message).await?;
                pending.extend(follow_ups);
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn handle(&self, message: FlowMessage) -> Result<Vec<FlowMessage>, FlowError> {
        if self.is_closed() {
            return match message {
                FlowMessage::CloseRequested => Ok(Vec::new()),
                _ => Err(FlowError::Closed),
            };
        }

        match message {
            FlowMessage::GoToStep {
                step,
                focus_first_field,
            } => {
                if step == StepName::EditProfessional && self.context.flag(HCP_VALIDATION_STATUS) {
                    return Err(FlowError::Locked(step));
                }
                let previous = self.current_step();
                let actions = self.controller().apply(StepEvent::GoTo {
                    step,
                    focus_first_field,
                });
                if let Some(left) = previous.filter(|&left| left != step) {
                    self.tear_down_step(left);
                }
                Ok(self.execute_step_actions(actions).await)
            }
            FlowMessage::StepShown {
                step,
                focus_first_field,
            } => {
                self.on_step_shown(step, focus_first_field);
                Ok(Vec::new())
            }
            FlowMessage::FieldValueChanged { field, value } => {
                let Some(section) = self.current_step().and_then(|step| self.section(step))
                else {
                    debug!(field = %field, "field input outside an edit step ignored");
                    return Ok(Vec::new());
                };
                Ok(section.on_field_input(&field, value))
            }
            FlowMessage::SaveRequested { step } => self.on_save_requested(step).map(|()| {
                vec![FlowMessage::StepCompleted { step }]
            }),
            FlowMessage::StepCompleted { step } => {
                self.on_save_requested(step)?;
                let section = step.section().ok_or(FlowError::NotEditable(step))?;
                self.submit(section).await?;
                Ok(Vec::new())
            }
            FlowMessage::CancelRequested { step } => {
                let section = self.section(step).ok_or(FlowError::NotEditable(step))?;
                Ok(vec![section.cancel()])
            }
            FlowMessage::Cancelled { step } => {
                debug!(step = %step, "section cancelled");
                let subscribed = self
                    .context
                    .cached_record()
                    .map(|record| record.email_permission.subscribed)
                    .unwrap_or(false);
                self.email_permission_subscribed
                    .store(subscribed, Ordering::SeqCst);
                self.context.set_variable(DISABLE_ACTION_BUTTON, false);
                Ok(vec![FlowMessage::GoToStep {
                    step: StepName::Account,
                    focus_first_field: false,
                }])
            }
            FlowMessage::EmailPermissionChanged { subscribed } => {
                self.email_permission_subscribed
                    .store(subscribed, Ordering::SeqCst);
                Ok(Vec::new())
            }
            FlowMessage::UnlockForEditing => {
                self.context.set_variable(DISABLE_ACTION_BUTTON, false);
                let actions = self.controller().apply(StepEvent::ClearNotifications);
                Ok(self.execute_step_actions(actions).await)
            }
            FlowMessage::LicenseValidity { is_valid } => {
                if !is_valid {
                    self.notify(Notification::error(
                        self.deps.config.messages.not_validated.clone(),
                    ))
                    .await;
                }
                Ok(Vec::new())
            }
            FlowMessage::CloseRequested => {
                self.close().await;
                Ok(Vec::new())
            }
        }
    }

    async fn execute_step_actions(&self, actions: Vec<StepAction>) -> Vec<FlowMessage> {
        let mut follow_ups = Vec::new();
        for action in actions {
            debug!(?action, "account flow executing step action");
            match action {
                StepAction::EmitStepShown {
                    step,
                    focus_first_field,
                } => follow_ups.push(FlowMessage::StepShown {
                    step,
                    focus_first_field,
                }),
                StepAction::ClearNotifications => self.deps.notifications.clear().await,
                StepAction::EmitFlowCompleted => {
                    info!("account flow completed");
                    self.deps
                        .lifecycle
                        .emit(FlowLifecycleEvent::Completed {
                            session_id: self.context.session_id().clone(),
                        })
                        .await;
                }
            }
        }
        follow_ups
    }

    /// Drop the registrations of the step being left.
    fn tear_down_step(&self, step: StepName) {
        if let Some(section) = self.section(step) {
            section.unmount(&self.context);
            debug!(step = %step, "step torn down");
        }
    }

    fn on_step_shown(&self, step: StepName, focus_first_field: bool) {
        let Some(section) = self.section(step) else {
            return;
        };
        section.mount(&self.context);
        let Some(record) = self.context.cached_record() else {
            warn!(step = %step, "step shown without a cached account");
            return;
        };
        section.on_step_shown(SectionSeed {
            record: &record,
            email_permission_subscribed: self.email_permission_subscribed(),
            hcp_validated: self.context.flag(HCP_VALIDATION_STATUS),
        });
        if focus_first_field {
            debug!(step = %step, field = section.focus_target(), "focusing first field");
        }
    }

    /// Gate a save request: in-flight, disabled button and local validation.
    fn on_save_requested(&self, step: StepName) -> Result<(), FlowError> {
        let section = self.section(step).ok_or(FlowError::NotEditable(step))?;
        let key = step.section().ok_or(FlowError::NotEditable(step))?;

        if self.submission_state(key) == SubmissionState::Submitting {
            return Err(FlowError::SubmissionInFlight(step));
        }
        if self.context.flag(DISABLE_ACTION_BUTTON) {
            return Err(FlowError::ActionDisabled(step));
        }
        section
            .validate(&self.deps.config)
            .map_err(|errors| {
                debug!(step = %step, invalid = errors.len(), "step validation failed");
                FlowError::Validation { step, errors }
            })
    }

    async fn submit(&self, section: Section) -> Result<(), FlowError> {
        let step = StepName::for_section(section);
        let span = info_span!("usecase.account_flow.submit", step = %step);
        async {
            let mut run = SubmissionRun {
                section,
                step,
                request: self.gather(section),
                snapshot: FormVariables::new(),
                outcome: None,
                became_validated: false,
            };

            let mut pending_events = vec![SubmissionEvent::Submit];
            while let Some(event) = pending_events.pop() {
                let (from, next, actions) = {
                    let mut submissions = self.submissions();
                    let from = submissions.get(&section).copied().unwrap_or_default();
                    let (next, actions) = SubmissionStateMachine::transition(from, event);
                    submissions.insert(section, next);
                    (from, next, actions)
                };
                info!(from = ?from, to = ?next, event = ?event, "submission state transition");
                let follow_up_events = self.execute_submission_actions(&mut run, actions).await?;
                pending_events.extend(follow_up_events);
            }

            if section == Section::Password {
                self.deps
                    .lifecycle
                    .emit(FlowLifecycleEvent::Analytics {
                        session_id: self.context.session_id().clone(),
                        name: ANALYTICS_PASSWORD_ATTEMPT.to_string(),
                        path: vec![ANALYTICS_PATH.to_string()],
                    })
                    .await;
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn execute_submission_actions(
        &self,
        run: &mut SubmissionRun,
        actions: Vec<SubmissionAction>,
    ) -> Result<Vec<SubmissionEvent>, FlowError> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, step = %run.step, "submission executing action");
            match action {
                SubmissionAction::RejectReentrant => {
                    warn!(step = %run.step, "submission already in flight");
                    return Err(FlowError::SubmissionInFlight(run.step));
                }
                SubmissionAction::BeginLoading => {
                    run.snapshot = self.context.variables();
                    self.context.set_variable(DISABLE_ACTION_BUTTON, true);
                    self.controller().set_loading(run.step, true);
                }
                SubmissionAction::InvokeUpdate => {
                    let outcome = match &run.request {
                        SubmissionRequest::Profile(update) => {
                            self.deps.auth.update_profile(update).await.map(Some)
                        }
                        SubmissionRequest::Password(request) => self
                            .deps
                            .auth
                            .change_password(request, &self.deps.config.password)
                            .await
                            .map(|()| None),
                    };
                    follow_up_events.push(match outcome {
                        Ok(_) => SubmissionEvent::Resolved,
                        Err(_) => SubmissionEvent::Rejected,
                    });
                    run.outcome = Some(outcome);
                }
                SubmissionAction::Reconcile => {
                    if let Some(Ok(Some(record))) = run.outcome.take() {
                        run.became_validated = self.reconcile(run.section, record).await;
                    }
                }
                SubmissionAction::NotifySuccess => {
                    let messages = &self.deps.config.messages;
                    let message = match run.section {
                        Section::Password => messages.password_updated.clone(),
                        _ => messages.profile_saved(run.became_validated),
                    };
                    info!(
                        step = %run.step,
                        became_validated = run.became_validated,
                        "submission succeeded"
                    );
                    self.notify(Notification::success(message)).await;
                    if run.section == Section::Password {
                        self.password.clear();
                    }
                }
                SubmissionAction::RollBack => {
                    self.context
                        .restore_variables(SUBMISSION_VARIABLES, &run.snapshot);
                }
                SubmissionAction::NotifyFailure => {
                    let message = match run.outcome.take() {
                        Some(Err(err)) => {
                            error!(step = %run.step, error = %err, "submission failed");
                            self.deps.auth.error_message(&err)
                        }
                        _ => None,
                    }
                    .unwrap_or_else(|| self.deps.config.messages.generic_error.clone());
                    self.notify(Notification::error(message)).await;
                }
                SubmissionAction::EndLoading => {
                    self.controller().set_loading(run.step, false);
                    follow_up_events.push(SubmissionEvent::Settle);
                }
            }
        }

        Ok(follow_up_events)
    }

    /// Merge `returned` into the cached user and push it to the service.
    ///
    /// Returns whether the user has just become a validated HCP.
    async fn reconcile(&self, section: Section, returned: AuthRecord) -> bool {
        let Some(mut user) = self.context.cached_user() else {
            warn!("update resolved without a cached account");
            return false;
        };
        let previous = user.auth_record.hcp_validation.status.clone();
        user.auth_record.merge_section(section, &returned);

        let record = &user.auth_record;
        self.context
            .set_variable(HCP_VALIDATION_STATUS, record.is_validated_hcp());
        self.email_permission_subscribed
            .store(record.email_permission.subscribed, Ordering::SeqCst);
        let became_validated = record
            .hcp_validation
            .status
            .became_validated_from(&previous);
        debug!(
            from = %previous,
            to = %record.hcp_validation.status,
            became_validated,
            "account reconciled"
        );

        self.context.set_cached_user(Some(user.clone()));
        self.deps.auth.set_user(user).await;
        became_validated
    }

    fn gather(&self, section: Section) -> SubmissionRequest {
        let ctx = &self.context;
        match section {
            Section::Personal => SubmissionRequest::Profile(ProfileUpdate::Personal(PersonalUpdate {
                given_name: ctx.get_value(GIVEN_NAME),
                family_name: ctx.get_value(FAMILY_NAME),
                email: ctx.get_value(EMAIL),
                email_permission_subscribed: self.email_permission_subscribed().to_string(),
            })),
            Section::Professional => {
                let designation_name = ctx.get_value(DESIGNATION_NAME);
                let (license_number, issuing_authority) =
                    if self.deps.config.designations.requires_license(&designation_name) {
                        self.license_details()
                    } else {
                        (String::new(), String::new())
                    };
                SubmissionRequest::Profile(ProfileUpdate::Professional(ProfessionalUpdate {
                    designation_name,
                    designation_specialty: ctx.get_value(DESIGNATION_SPECIALTY),
                    mailing_address_street_name1: ctx.get_value(STREET),
                    mailing_address_municipality: ctx.get_value(CITY),
                    mailing_address_administrative_area: ctx.get_value(STATE),
                    mailing_address_postal_code: ctx.get_value(POSTAL_CODE),
                    license_number,
                    issuing_authority,
                }))
            }
            Section::Password => SubmissionRequest::Password(ChangePasswordRequest {
                current_password: ctx.get_value(OLD_PASSWORD),
                new_password: ctx.get_value(NEW_PASSWORD),
            }),
        }
    }

    /// License number and type as held by the `hcpId` field itself.
    fn license_details(&self) -> (String, String) {
        let current = self
            .context
            .with_tunnel(|tunnel| tunnel.get(LICENSE).map(|reg| reg.accessor.current()));
        match current {
            Some(FieldValue::License {
                number,
                issuing_authority,
            }) => (number, issuing_authority),
            Some(other) => (other.as_text(), String::new()),
            None => (String::new(), String::new()),
        }
    }

    async fn notify(&self, notification: Notification) {
        self.deps.notifications.notify(notification).await;
    }

    fn section(&self, step: StepName) -> Option<&dyn SectionViewModel> {
        match step {
            StepName::Account => None,
            StepName::EditPersonal => Some(&self.personal),
            StepName::EditProfessional => Some(&self.professional),
            StepName::EditPassword => Some(&self.password),
        }
    }

    fn controller(&self) -> MutexGuard<'_, StepController> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn submissions(&self) -> MutexGuard<'_, HashMap<Section, SubmissionState>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
