use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::Notify;

use ma_app::{AccountFlow, AccountFlowDeps, FlowBus, FlowError, FlowMessage};
use ma_core::account::{
    AuthRecord, AuthUser, ChangePasswordRequest, Designation, EmailPermission, HcpValidation,
    HcpValidationStatus, License, MailingAddress, ProfileUpdate, Section,
};
use ma_core::config::{FlowConfig, FlowMessages};
use ma_core::flow::{StepName, SubmissionState};
use ma_core::notification::Notification;
use ma_core::ports::{
    AuthServiceError, AuthServicePort, FlowLifecycleEvent, PasswordChangeConfig,
};
use ma_core::tunnel::{FieldValue, DISABLE_ACTION_BUTTON, HCP_VALIDATION_STATUS};
use ma_platform::{AuthFixture, InMemoryAuthService, RecordingFlowEvents, RecordingNotifications};

mock! {
    pub Auth {}

    #[async_trait]
    impl AuthServicePort for Auth {
        async fn current_user(&self) -> Option<AuthUser>;
        async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthRecord, AuthServiceError>;
        async fn change_password(
            &self,
            request: &ChangePasswordRequest,
            config: &PasswordChangeConfig,
        ) -> Result<(), AuthServiceError>;
        async fn set_user(&self, user: AuthUser);
    }
}

struct Harness {
    flow: Arc<AccountFlow>,
    notifications: Arc<RecordingNotifications>,
    lifecycle: Arc<RecordingFlowEvents>,
}

fn harness(auth: Arc<dyn AuthServicePort>) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();

    let notifications = Arc::new(RecordingNotifications::new());
    let lifecycle = Arc::new(RecordingFlowEvents::new());
    let deps = AccountFlowDeps::new(
        auth,
        notifications.clone(),
        lifecycle.clone(),
        FlowConfig::default(),
    );
    Harness {
        flow: Arc::new(AccountFlow::new(deps)),
        notifications,
        lifecycle,
    }
}

fn physician(status: HcpValidationStatus) -> AuthUser {
    AuthUser::new(
        "user-1",
        AuthRecord {
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            email_permission: EmailPermission { subscribed: true },
            designation: Designation {
                name: "Physician".into(),
                specialty: "Cardiology".into(),
            },
            license: License {
                number: "12345".into(),
                issuing_authority: "IL".into(),
            },
            mailing_address: MailingAddress {
                street_name1: "1 Main St".into(),
                municipality: "Springfield".into(),
                administrative_area: "IL".into(),
                postal_code: "62701".into(),
            },
            hcp_validation: HcpValidation { status },
        },
    )
}

fn mock_with_user(user: AuthUser) -> MockAuth {
    let mut auth = MockAuth::new();
    auth.expect_current_user()
        .returning(move || Some(user.clone()));
    auth
}

fn messages() -> FlowMessages {
    FlowMessages::default()
}

#[tokio::test]
async fn hcp_flag_is_false_only_for_unvalidated_statuses() {
    let cases = [
        (HcpValidationStatus::NotValidated, false),
        (HcpValidationStatus::Pending, false),
        (HcpValidationStatus::Validated, true),
        (HcpValidationStatus::Other("manual".into()), true),
    ];
    for (status, expected) in cases {
        let h = harness(Arc::new(mock_with_user(physician(status.clone()))));
        h.flow.start().await.expect("start");
        assert_eq!(
            h.flow.context().flag(HCP_VALIDATION_STATUS),
            expected,
            "status {status}"
        );
        assert!(!h.flow.context().flag(DISABLE_ACTION_BUTTON));
    }
}

#[tokio::test]
async fn last_registration_wins_in_flow_registry() {
    let h = harness(Arc::new(mock_with_user(physician(
        HcpValidationStatus::NotValidated,
    ))));
    h.flow.start().await.expect("start");
    h.flow
        .go_to(StepName::EditPersonal, true)
        .await
        .expect("go to personal");
    assert_eq!(h.flow.context().get_value("givenName"), "Ada");

    let replacement = ma_app::fields::FormField::text("givenName", "Replacement");
    replacement.set_text("Replaced");
    assert!(replacement.mount(h.flow.context()));
    assert_eq!(h.flow.context().get_value("givenName"), "Replaced");
}

#[tokio::test]
async fn failed_update_restores_snapshot() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::NotValidated));
    auth.expect_update_profile().times(1).returning(|_| {
        Err(AuthServiceError::Rejected {
            code: Some("E500".into()),
            message: None,
        })
    });
    auth.expect_set_user().never();
    let h = harness(Arc::new(auth));

    h.flow.start().await.expect("start");
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow
        .input("givenName", FieldValue::Text("Augusta".into()))
        .await
        .unwrap();

    let variables_before = h.flow.context().variables();
    let cached_before = h.flow.context().cached_user();

    h.flow.save(StepName::EditPersonal).await.expect("failure is not an error");

    assert_eq!(h.flow.context().variables(), variables_before);
    assert_eq!(h.flow.context().cached_user(), cached_before);
    assert!(!h.flow.context().flag(DISABLE_ACTION_BUTTON));
    assert!(!h.flow.is_loading(StepName::EditPersonal));
    assert_eq!(
        h.flow.submission_state(Section::Personal),
        SubmissionState::Idle
    );
    assert_eq!(
        h.notifications.last(),
        Some(Notification::error(messages().generic_error))
    );
}

#[tokio::test]
async fn service_message_is_preferred_over_generic_text() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::NotValidated));
    auth.expect_update_profile()
        .returning(|_| Err(AuthServiceError::rejected("Email already in use.")));
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow.save(StepName::EditPersonal).await.unwrap();

    assert_eq!(
        h.notifications.last(),
        Some(Notification::error("Email already in use."))
    );
}

#[tokio::test]
async fn becoming_validated_adds_access_message() {
    let user = physician(HcpValidationStatus::Pending);
    let mut returned = user.auth_record.clone();
    returned.hcp_validation.status = HcpValidationStatus::Validated;

    let mut auth = mock_with_user(user);
    auth.expect_update_profile()
        .times(1)
        .returning(move |_| Ok(returned.clone()));
    auth.expect_set_user()
        .withf(|user: &AuthUser| user.auth_record.is_validated_hcp())
        .times(1)
        .returning(|_| ());
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    // pending users are told their license is not verified yet
    assert_eq!(
        h.notifications.last(),
        Some(Notification::error(messages().not_validated))
    );

    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();
    h.flow.save(StepName::EditProfessional).await.unwrap();

    assert_eq!(
        h.notifications.last(),
        Some(Notification::success(messages().profile_saved(true)))
    );
    assert!(h.flow.context().flag(HCP_VALIDATION_STATUS));
    let overview = h.flow.overview().expect("overview");
    assert!(!overview.can_edit_professional);
}

#[tokio::test]
async fn pending_again_only_reports_saved() {
    let user = physician(HcpValidationStatus::Pending);
    let returned = user.auth_record.clone();

    let mut auth = mock_with_user(user);
    auth.expect_update_profile()
        .returning(move |_| Ok(returned.clone()));
    auth.expect_set_user().returning(|_| ());
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();
    h.flow.save(StepName::EditProfessional).await.unwrap();

    assert_eq!(
        h.notifications.last(),
        Some(Notification::success("Your changes have been saved."))
    );
    assert!(!h.flow.context().flag(HCP_VALIDATION_STATUS));
}

#[tokio::test]
async fn personal_cancel_clears_shadows_and_keeps_summary() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::NotValidated));
    auth.expect_update_profile().never();
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    let overview_before = h.flow.overview().expect("overview");
    let cached_before = h.flow.context().cached_user();

    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow
        .input("givenName", FieldValue::Text("Changed".into()))
        .await
        .unwrap();
    h.flow
        .input("marketing_consent", FieldValue::Toggle(false))
        .await
        .unwrap();
    assert_eq!(
        h.flow.overview().expect("overview").marketing_emails,
        "No"
    );

    h.flow.cancel(StepName::EditPersonal).await.unwrap();

    assert_eq!(h.flow.current_step(), Some(StepName::Account));
    assert!(!h.flow.personal().has_shadow_values());
    assert_eq!(h.flow.context().cached_user(), cached_before);
    assert_eq!(h.flow.overview(), Some(overview_before));
    assert!(!h.flow.context().flag(DISABLE_ACTION_BUTTON));

    // re-entering seeds from the cache again
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    assert_eq!(h.flow.context().get_value("givenName"), "Ada");
}

#[tokio::test]
async fn student_designation_disables_and_blanks_license() {
    let user = physician(HcpValidationStatus::NotValidated);
    let mut returned = user.auth_record.clone();
    returned.designation.name = "Student".into();
    returned.license = License::default();

    let mut auth = mock_with_user(user);
    auth.expect_update_profile()
        .withf(|update: &ProfileUpdate| match update {
            ProfileUpdate::Professional(p) => {
                p.designation_name == "Student"
                    && p.license_number.is_empty()
                    && p.issuing_authority.is_empty()
            }
            ProfileUpdate::Personal(_) => false,
        })
        .times(1)
        .returning(move |_| Ok(returned.clone()));
    auth.expect_set_user().returning(|_| ());
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();
    assert!(!h.flow.professional().license_disabled());
    assert!(h.flow.professional().show_cancel_link());

    h.flow
        .input("designation_name", FieldValue::Selection("Student".into()))
        .await
        .unwrap();
    assert!(h.flow.professional().license_disabled());

    h.flow.save(StepName::EditProfessional).await.unwrap();
    let overview = h.flow.overview().unwrap();
    assert_eq!(overview.designation, "Student");
    assert_eq!(overview.state_license_number, "-");
}

#[tokio::test]
async fn physician_sends_license_from_field() {
    let user = physician(HcpValidationStatus::NotValidated);
    let returned = user.auth_record.clone();

    let mut auth = mock_with_user(user);
    auth.expect_update_profile()
        .withf(|update: &ProfileUpdate| match update {
            ProfileUpdate::Professional(p) => {
                p.license_number == "AB1234563" && p.issuing_authority == "DEA"
            }
            ProfileUpdate::Personal(_) => false,
        })
        .times(1)
        .returning(move |_| Ok(returned.clone()));
    auth.expect_set_user().returning(|_| ());
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();
    h.flow
        .input(
            "hcpId",
            FieldValue::License {
                number: "AB1234563".into(),
                issuing_authority: "DEA".into(),
            },
        )
        .await
        .unwrap();
    h.flow.save(StepName::EditProfessional).await.unwrap();
}

#[tokio::test]
async fn invalid_fields_block_the_update() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::NotValidated));
    auth.expect_update_profile().never();
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();
    h.flow
        .input("mailingAddress_postalCode", FieldValue::Text("ABCDE".into()))
        .await
        .unwrap();

    match h.flow.save(StepName::EditProfessional).await {
        Err(FlowError::Validation { step, errors }) => {
            assert_eq!(step, StepName::EditProfessional);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "mailingAddress_postalCode");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(!h.flow.is_loading(StepName::EditProfessional));
}

#[tokio::test]
async fn password_rejection_without_message_uses_generic_text() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::Validated));
    auth.expect_change_password()
        .withf(|request: &ChangePasswordRequest, config: &PasswordChangeConfig| {
            request.current_password == "old-secret"
                && request.new_password == "new-secret-1"
                && config.form_name == "newPasswordFormProfile"
        })
        .times(1)
        .returning(|_, _| {
            Err(AuthServiceError::Rejected {
                code: Some("E1".into()),
                message: None,
            })
        });
    let h = harness(Arc::new(auth));

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPassword, true).await.unwrap();
    h.flow
        .input("oldPassword", FieldValue::Secret("old-secret".into()))
        .await
        .unwrap();
    h.flow
        .input("newPassword", FieldValue::Secret("new-secret-1".into()))
        .await
        .unwrap();
    h.flow.save(StepName::EditPassword).await.unwrap();

    assert_eq!(
        h.notifications.last(),
        Some(Notification::error(messages().generic_error))
    );
    assert_eq!(h.flow.context().get_value("oldPassword"), "old-secret");
    assert_eq!(h.flow.context().get_value("newPassword"), "new-secret-1");
    assert!(!h.flow.is_loading(StepName::EditPassword));
    assert!(!h.flow.context().flag(DISABLE_ACTION_BUTTON));

    let analytics: Vec<_> = h
        .lifecycle
        .events()
        .into_iter()
        .filter_map(|event| match event {
            FlowLifecycleEvent::Analytics { name, path, .. } => Some((name, path)),
            _ => None,
        })
        .collect();
    assert_eq!(
        analytics,
        vec![(
            "MyAccountFlowInitiated".to_string(),
            vec!["AccountFlow".to_string()]
        )]
    );
}

#[tokio::test]
async fn password_change_clears_inputs_on_success() {
    let service = Arc::new(InMemoryAuthService::from(AuthFixture {
        user: Some(physician(HcpValidationStatus::Validated)),
        password: Some("old-secret".into()),
        ..Default::default()
    }));
    let h = harness(service);

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPassword, true).await.unwrap();
    h.flow
        .input("oldPassword", FieldValue::Secret("old-secret".into()))
        .await
        .unwrap();
    h.flow
        .input("newPassword", FieldValue::Secret("new-secret-1".into()))
        .await
        .unwrap();
    h.flow.save(StepName::EditPassword).await.unwrap();

    assert_eq!(
        h.notifications.last(),
        Some(Notification::success("Your password has been updated."))
    );
    assert!(h.flow.password().is_blank());
    assert_eq!(h.flow.current_step(), Some(StepName::EditPassword));
}

#[tokio::test]
async fn action_stays_disabled_until_next_edit() {
    let service = Arc::new(InMemoryAuthService::new(Some(physician(
        HcpValidationStatus::NotValidated,
    ))));
    let h = harness(service.clone());

    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow
        .input("email", FieldValue::Text("ada@lovelace.dev".into()))
        .await
        .unwrap();
    h.flow.save(StepName::EditPersonal).await.unwrap();

    assert_eq!(
        service.user().unwrap().auth_record.email,
        "ada@lovelace.dev"
    );
    assert_eq!(
        h.flow.save(StepName::EditPersonal).await,
        Err(FlowError::ActionDisabled(StepName::EditPersonal))
    );

    h.flow
        .input("email", FieldValue::Text("ada@analytical.engine".into()))
        .await
        .unwrap();
    assert!(h.notifications.clear_count() >= 2);
    h.flow.save(StepName::EditPersonal).await.unwrap();
}

#[tokio::test]
async fn license_check_failure_shows_not_validated_message() {
    let h = harness(Arc::new(mock_with_user(physician(
        HcpValidationStatus::NotValidated,
    ))));
    h.flow.start().await.unwrap();
    assert!(h.notifications.notifications().is_empty());

    h.flow
        .dispatch(FlowMessage::LicenseValidity { is_valid: true })
        .await
        .unwrap();
    assert!(h.notifications.notifications().is_empty());

    h.flow
        .dispatch(FlowMessage::LicenseValidity { is_valid: false })
        .await
        .unwrap();
    assert_eq!(
        h.notifications.last(),
        Some(Notification::error(messages().not_validated))
    );
}

struct GatedAuth {
    user: AuthUser,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AuthServicePort for GatedAuth {
    async fn current_user(&self) -> Option<AuthUser> {
        Some(self.user.clone())
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<AuthRecord, AuthServiceError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.user.auth_record.clone())
    }

    async fn change_password(
        &self,
        _request: &ChangePasswordRequest,
        _config: &PasswordChangeConfig,
    ) -> Result<(), AuthServiceError> {
        Ok(())
    }

    async fn set_user(&self, _user: AuthUser) {}
}

#[tokio::test]
async fn second_save_while_in_flight_is_rejected() {
    let auth = Arc::new(GatedAuth {
        user: physician(HcpValidationStatus::NotValidated),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let h = harness(auth.clone());
    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();

    let flow = h.flow.clone();
    let first = tokio::spawn(async move { flow.save(StepName::EditPersonal).await });

    auth.entered.notified().await;
    assert!(h.flow.is_loading(StepName::EditPersonal));
    assert_eq!(
        h.flow.save(StepName::EditPersonal).await,
        Err(FlowError::SubmissionInFlight(StepName::EditPersonal))
    );

    auth.release.notify_one();
    first.await.expect("join").expect("first save");
    assert_eq!(
        h.notifications.last(),
        Some(Notification::success("Your changes have been saved."))
    );
    assert!(!h.flow.is_loading(StepName::EditPersonal));
}

/// Holds professional updates until released, then rejects them; personal
/// updates resolve at once with a validated record.
struct SplitAuth {
    user: AuthUser,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AuthServicePort for SplitAuth {
    async fn current_user(&self) -> Option<AuthUser> {
        Some(self.user.clone())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthRecord, AuthServiceError> {
        match update {
            ProfileUpdate::Professional(_) => {
                self.entered.notify_one();
                self.release.notified().await;
                Err(AuthServiceError::rejected("License lookup unavailable."))
            }
            ProfileUpdate::Personal(_) => {
                let mut record = self.user.auth_record.clone();
                record.hcp_validation.status = HcpValidationStatus::Validated;
                Ok(record)
            }
        }
    }

    async fn change_password(
        &self,
        _request: &ChangePasswordRequest,
        _config: &PasswordChangeConfig,
    ) -> Result<(), AuthServiceError> {
        Ok(())
    }

    async fn set_user(&self, _user: AuthUser) {}
}

#[tokio::test]
async fn failed_update_keeps_variables_written_by_other_sections() {
    let auth = Arc::new(SplitAuth {
        user: physician(HcpValidationStatus::NotValidated),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let h = harness(auth.clone());
    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditProfessional, true).await.unwrap();

    let flow = h.flow.clone();
    let professional = tokio::spawn(async move { flow.save(StepName::EditProfessional).await });
    auth.entered.notified().await;

    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow
        .input("givenName", FieldValue::Text("Augusta".into()))
        .await
        .unwrap();
    h.flow.save(StepName::EditPersonal).await.unwrap();
    assert!(h.flow.context().flag(HCP_VALIDATION_STATUS));

    auth.release.notify_one();
    professional.await.expect("join").expect("failure is not an error");

    let cached = h.flow.context().cached_record().expect("cached record");
    assert!(cached.is_validated_hcp());
    assert!(h.flow.context().flag(HCP_VALIDATION_STATUS));
    assert!(!h.flow.context().flag(DISABLE_ACTION_BUTTON));
    assert_eq!(
        h.notifications.last(),
        Some(Notification::error("License lookup unavailable."))
    );
}

#[tokio::test]
async fn step_completed_from_the_bus_is_validated() {
    let mut auth = mock_with_user(physician(HcpValidationStatus::NotValidated));
    auth.expect_update_profile().never();
    let h = harness(Arc::new(auth));
    h.flow.start().await.unwrap();
    h.flow.go_to(StepName::EditPersonal, true).await.unwrap();
    h.flow
        .input("email", FieldValue::Text("not-an-email".into()))
        .await
        .unwrap();

    let (sender, receiver) = FlowBus::new().split();
    sender
        .send(FlowMessage::StepCompleted {
            step: StepName::EditPersonal,
        })
        .unwrap();
    sender.send(FlowMessage::CloseRequested).unwrap();
    h.flow.run(receiver).await;

    assert!(h.flow.is_closed());
    assert!(h.notifications.notifications().is_empty());
}

#[tokio::test]
async fn bus_drives_flow_until_close() {
    let h = harness(Arc::new(mock_with_user(physician(
        HcpValidationStatus::NotValidated,
    ))));
    h.flow.start().await.unwrap();

    let (sender, receiver) = FlowBus::new().split();
    sender
        .send(FlowMessage::GoToStep {
            step: StepName::EditPersonal,
            focus_first_field: true,
        })
        .unwrap();
    // rejected messages are logged and the loop keeps going
    sender
        .send(FlowMessage::SaveRequested {
            step: StepName::Account,
        })
        .unwrap();
    sender.send(FlowMessage::CloseRequested).unwrap();
    sender
        .send(FlowMessage::GoToStep {
            step: StepName::EditPassword,
            focus_first_field: false,
        })
        .unwrap();

    h.flow.run(receiver).await;

    assert!(h.flow.is_closed());
    let events = h.lifecycle.events();
    assert!(matches!(events.first(), Some(FlowLifecycleEvent::Started { .. })));
    assert!(matches!(events.last(), Some(FlowLifecycleEvent::Completed { .. })));
}

#[tokio::test]
async fn start_without_user_reports_and_closes() {
    let mut auth = MockAuth::new();
    auth.expect_current_user().returning(|| None);
    let h = harness(Arc::new(auth));

    assert_eq!(h.flow.start().await, Err(FlowError::NoAuthenticatedUser));
    assert!(h.flow.is_closed());
    assert_eq!(h.lifecycle.events().len(), 2);
}
