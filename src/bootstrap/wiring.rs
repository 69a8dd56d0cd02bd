//! # Dependency Wiring
//!
//! Builds the concrete adapters and hands them to [`AccountFlow`].
//!
//! ## Responsibilities
//!
//! - Seed the in-memory auth service from the fixture, or from a demo user
//! - Pick the notification sink and lifecycle event sink
//! - Assemble [`AccountFlowDeps`]
//!
//! Business logic does not live here.

use std::sync::Arc;

use ma_app::{AccountFlow, AccountFlowDeps};
use ma_core::account::{
    AuthRecord, AuthUser, Designation, EmailPermission, HcpValidation, License, MailingAddress,
};
use ma_core::config::FlowConfig;
use ma_core::ports::{AuthServicePort, FlowEventPort, NotificationPort};
use ma_core::HcpValidationStatus;
use ma_platform::{AuthFixture, InMemoryAuthService, TracingFlowEvents};
use thiserror::Error;
use tracing::info;

use crate::console::ConsoleNotificationSink;

/// Errors raised while assembling the flow.
#[derive(Debug, Error)]
pub enum WiringError {
    #[error("Auth service initialization failed: {0}")]
    AuthServiceInit(String),
}

/// Result type for wiring operations.
pub type WiringResult<T> = Result<T, WiringError>;

/// Build the flow from configuration.
pub fn build_flow(config: FlowConfig) -> WiringResult<Arc<AccountFlow>> {
    let auth: Arc<dyn AuthServicePort> = Arc::new(build_auth_service(&config)?);
    let notifications: Arc<dyn NotificationPort> = Arc::new(ConsoleNotificationSink::new());
    let lifecycle: Arc<dyn FlowEventPort> = Arc::new(TracingFlowEvents);

    let deps = AccountFlowDeps::new(auth, notifications, lifecycle, config);
    let flow = Arc::new(AccountFlow::new(deps));
    info!(session = %flow.context().session_id(), "account flow wired");

    Ok(flow)
}

fn build_auth_service(config: &FlowConfig) -> WiringResult<InMemoryAuthService> {
    match &config.fixture_path {
        Some(path) => InMemoryAuthService::from_fixture(path)
            .map_err(|e| WiringError::AuthServiceInit(format!("{e:#}"))),
        None => {
            info!("no auth fixture configured, using the demo user");
            Ok(InMemoryAuthService::from(AuthFixture {
                user: Some(demo_user()),
                password: None,
                validate_licenses: true,
            }))
        }
    }
}

/// Signed-in user used when no fixture is configured.
pub fn demo_user() -> AuthUser {
    AuthUser::new(
        "demo-user",
        AuthRecord {
            given_name: "Jordan".to_string(),
            family_name: "Reyes".to_string(),
            email: "jordan.reyes@example.com".to_string(),
            email_permission: EmailPermission { subscribed: true },
            designation: Designation {
                name: "Nurse Practitioner".to_string(),
                specialty: "Family Medicine".to_string(),
            },
            license: License::default(),
            mailing_address: MailingAddress {
                street_name1: "200 Lake Shore Dr".to_string(),
                municipality: "Chicago".to_string(),
                administrative_area: "IL".to_string(),
                postal_code: "60601".to_string(),
            },
            hcp_validation: HcpValidation {
                status: HcpValidationStatus::NotValidated,
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_build_flow_with_demo_user_starts() {
        let flow = build_flow(FlowConfig::default()).unwrap();
        flow.start().await.unwrap();

        let overview = flow.overview().unwrap();
        assert_eq!(overview.full_name, "Jordan Reyes");
        assert!(!flow.is_closed());
    }

    #[test]
    fn test_build_flow_reports_missing_fixture() {
        let config = FlowConfig {
            fixture_path: Some("/nonexistent/user.json".into()),
            ..FlowConfig::default()
        };
        let err = build_flow(config).err().unwrap();
        assert!(err.to_string().contains("Failed to read auth fixture"));
    }

    #[tokio::test]
    async fn test_build_flow_from_fixture_without_user_closes() {
        let mut fixture = NamedTempFile::new().unwrap();
        fixture.write_all(br#"{"user": null}"#).unwrap();
        let config = FlowConfig {
            fixture_path: Some(fixture.path().to_path_buf()),
            ..FlowConfig::default()
        };

        let flow = build_flow(config).unwrap();
        assert!(flow.start().await.is_err());
        assert!(flow.is_closed());
    }
}
