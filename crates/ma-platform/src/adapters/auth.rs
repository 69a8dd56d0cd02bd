//! In-memory authentication service.
//!
//! Seeded from a JSON fixture. `update_profile` computes the returned record
//! from the service's cached user without storing it; the flow pushes the
//! merged user back through `set_user`, as a real client expects.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use ma_core::account::{
    AuthRecord, AuthUser, ChangePasswordRequest, HcpValidationStatus, ProfileUpdate,
};
use ma_core::ports::{AuthServiceError, AuthServicePort, PasswordChangeConfig};

const INVALID_PASSWORD_CODE: &str = "INVALID_PASSWORD";
const INVALID_PASSWORD_MESSAGE: &str = "The current password you entered is incorrect.";

/// On-disk fixture format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthFixture {
    pub user: Option<AuthUser>,
    /// Current password; `None` accepts any current password.
    pub password: Option<String>,
    /// Mark the user validated when a professional update carries a license.
    pub validate_licenses: bool,
}

#[derive(Debug)]
struct ServiceState {
    user: Option<AuthUser>,
    password: Option<String>,
}

pub struct InMemoryAuthService {
    state: Mutex<ServiceState>,
    failures: Mutex<VecDeque<AuthServiceError>>,
    validate_licenses: bool,
}

impl InMemoryAuthService {
    pub fn new(user: Option<AuthUser>) -> Self {
        Self::from(AuthFixture {
            user,
            ..Default::default()
        })
    }

    /// Load a fixture file.
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read auth fixture: {}", path.display()))?;
        let fixture: AuthFixture = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse auth fixture: {}", path.display()))?;
        info!(
            path = %path.display(),
            has_user = fixture.user.is_some(),
            "auth fixture loaded"
        );
        Ok(Self::from(fixture))
    }

    /// Make the next update or password change fail with `error`.
    pub fn fail_next(&self, error: AuthServiceError) {
        self.failures().push_back(error);
    }

    /// The service's cached identity.
    pub fn user(&self) -> Option<AuthUser> {
        self.state().user.clone()
    }

    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn failures(&self) -> MutexGuard<'_, VecDeque<AuthServiceError>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scripted_failure(&self) -> Result<(), AuthServiceError> {
        match self.failures().pop_front() {
            Some(err) => {
                debug!(error = %err, "returning scripted auth failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn apply(&self, mut record: AuthRecord, update: &ProfileUpdate) -> AuthRecord {
        match update {
            ProfileUpdate::Personal(personal) => {
                record.given_name = personal.given_name.clone();
                record.family_name = personal.family_name.clone();
                record.email = personal.email.clone();
                record.email_permission.subscribed = personal.email_permission_subscribed == "true";
            }
            ProfileUpdate::Professional(professional) => {
                record.designation.name = professional.designation_name.clone();
                record.designation.specialty = professional.designation_specialty.clone();
                record.mailing_address.street_name1 =
                    professional.mailing_address_street_name1.clone();
                record.mailing_address.municipality =
                    professional.mailing_address_municipality.clone();
                record.mailing_address.administrative_area =
                    professional.mailing_address_administrative_area.clone();
                record.mailing_address.postal_code =
                    professional.mailing_address_postal_code.clone();
                record.license.number = professional.license_number.clone();
                record.license.issuing_authority = professional.issuing_authority.clone();

                if self.validate_licenses
                    && !professional.license_number.is_empty()
                    && record.hcp_validation.status.is_unvalidated()
                {
                    record.hcp_validation.status = HcpValidationStatus::Validated;
                }
            }
        }
        record
    }
}

impl From<AuthFixture> for InMemoryAuthService {
    fn from(fixture: AuthFixture) -> Self {
        Self {
            state: Mutex::new(ServiceState {
                user: fixture.user,
                password: fixture.password,
            }),
            failures: Mutex::new(VecDeque::new()),
            validate_licenses: fixture.validate_licenses,
        }
    }
}

#[async_trait]
impl AuthServicePort for InMemoryAuthService {
    async fn current_user(&self) -> Option<AuthUser> {
        self.user()
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthRecord, AuthServiceError> {
        self.scripted_failure()?;
        let record = self
            .user()
            .map(|user| user.auth_record)
            .ok_or(AuthServiceError::Unauthenticated)?;
        debug!(section = ?update.section(), "applying profile update");
        Ok(self.apply(record, update))
    }

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
        config: &PasswordChangeConfig,
    ) -> Result<(), AuthServiceError> {
        self.scripted_failure()?;
        let mut state = self.state();
        if state.user.is_none() {
            return Err(AuthServiceError::Unauthenticated);
        }
        if config.requires_existing_password {
            if let Some(current) = &state.password {
                if *current != request.current_password {
                    warn!(form = %config.form_name, "password change rejected");
                    return Err(AuthServiceError::Rejected {
                        code: Some(INVALID_PASSWORD_CODE.to_string()),
                        message: Some(INVALID_PASSWORD_MESSAGE.to_string()),
                    });
                }
            }
        }
        state.password = Some(request.new_password.clone());
        info!(form = %config.form_name, "password changed");
        Ok(())
    }

    async fn set_user(&self, user: AuthUser) {
        debug!(user_id = %user.user_id, "cached user replaced");
        self.state().user = Some(user);
    }
}
