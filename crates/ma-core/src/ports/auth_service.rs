//! Authentication/profile service port
//!
//! Implemented by the platform layer (network client, in-memory fixture).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::{AuthRecord, AuthUser, ChangePasswordRequest, ProfileUpdate};
use crate::ports::errors::AuthServiceError;

/// Form metadata forwarded with a password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordChangeConfig {
    pub password_field_name: String,
    pub requires_existing_password: bool,
    pub old_password_field_name: String,
    pub form_name: String,
}

impl Default for PasswordChangeConfig {
    fn default() -> Self {
        Self {
            password_field_name: "newpassword".to_string(),
            requires_existing_password: true,
            old_password_field_name: "oldpassword".to_string(),
            form_name: "newPasswordFormProfile".to_string(),
        }
    }
}

#[async_trait]
pub trait AuthServicePort: Send + Sync {
    /// Signed-in user, if any.
    async fn current_user(&self) -> Option<AuthUser>;

    /// Apply a partial update and return the authoritative record.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthRecord, AuthServiceError>;

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
        config: &PasswordChangeConfig,
    ) -> Result<(), AuthServiceError>;

    /// Replace the service's own cached identity.
    async fn set_user(&self, user: AuthUser);

    /// Best-effort user-facing message for `error`.
    fn error_message(&self, error: &AuthServiceError) -> Option<String> {
        error.user_message()
    }
}

#[cfg(test)]
mockall::mock! {
    pub AuthService {}

    #[async_trait]
    impl AuthServicePort for AuthService {
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
