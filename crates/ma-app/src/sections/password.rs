use std::sync::Arc;

use ma_core::config::FlowConfig;
use ma_core::flow::StepName;
use ma_core::tunnel::{FieldHandle, FieldValue};
use tracing::debug;

use super::{SectionSeed, SectionViewModel};
use crate::context::FlowContext;
use crate::events::FlowMessage;
use crate::fields::FormField;
use crate::validation::{FieldError, Validator};

pub const OLD_PASSWORD: &str = "oldPassword";
pub const NEW_PASSWORD: &str = "newPassword";

/// Current and new password inputs. Nothing is seeded from the record.
pub struct PasswordSection {
    old_password: Arc<FormField>,
    new_password: Arc<FormField>,
}

impl PasswordSection {
    pub fn new() -> Self {
        Self {
            old_password: FormField::password(OLD_PASSWORD, "Current password"),
            new_password: FormField::password(NEW_PASSWORD, "New password"),
        }
    }

    /// Blank both inputs.
    pub fn clear(&self) {
        self.old_password.clear();
        self.new_password.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.old_password.current().is_empty() && self.new_password.current().is_empty()
    }
}

impl Default for PasswordSection {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionViewModel for PasswordSection {
    fn step(&self) -> StepName {
        StepName::EditPassword
    }

    fn mount(&self, ctx: &FlowContext) {
        self.old_password.mount(ctx);
        self.new_password.mount(ctx);
    }

    fn unmount(&self, ctx: &FlowContext) {
        self.old_password.unmount(ctx);
        self.new_password.unmount(ctx);
    }

    fn on_step_shown(&self, _seed: SectionSeed<'_>) {}

    fn on_field_input(&self, field: &str, value: FieldValue) -> Vec<FlowMessage> {
        let widget = match field {
            OLD_PASSWORD => &self.old_password,
            NEW_PASSWORD => &self.new_password,
            other => {
                debug!(field = other, "input for unknown password field ignored");
                return Vec::new();
            }
        };
        widget.set_text(&value.as_text());
        vec![FlowMessage::UnlockForEditing]
    }

    fn validate(&self, config: &FlowConfig) -> Result<(), Vec<FieldError>> {
        let new_password = self.new_password.value();
        let mut validator = Validator::new();
        if config.password.requires_existing_password {
            validator.required(
                OLD_PASSWORD,
                &self.old_password.value(),
                "Please enter your current password.",
            );
        }
        validator.min_length(
            NEW_PASSWORD,
            &new_password,
            config.password_min_length.max(1),
            &format!(
                "Your new password must be at least {} characters long.",
                config.password_min_length
            ),
        );
        validator.finish()
    }

    fn cancel(&self) -> FlowMessage {
        self.clear();
        FlowMessage::Cancelled { step: self.step() }
    }

    fn focus_target(&self) -> &str {
        OLD_PASSWORD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_blanks_both_inputs() {
        let section = PasswordSection::new();
        section.on_field_input(OLD_PASSWORD, FieldValue::Secret("old-secret".into()));
        section.on_field_input(NEW_PASSWORD, FieldValue::Secret("new-secret".into()));
        assert!(!section.is_blank());

        section.clear();
        assert!(section.is_blank());
    }

    #[test]
    fn short_password_is_rejected() {
        let section = PasswordSection::new();
        section.on_field_input(OLD_PASSWORD, FieldValue::Secret("old-secret".into()));
        section.on_field_input(NEW_PASSWORD, FieldValue::Secret("short".into()));
        let errors = section.validate(&FlowConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, NEW_PASSWORD);
    }

    #[test]
    fn current_password_optional_when_not_required() {
        let section = PasswordSection::new();
        section.on_field_input(NEW_PASSWORD, FieldValue::Secret("long-enough".into()));
        let mut config = FlowConfig::default();
        config.password.requires_existing_password = false;
        assert!(section.validate(&config).is_ok());
        assert!(section.validate(&FlowConfig::default()).is_err());
    }
}
