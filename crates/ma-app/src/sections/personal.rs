use std::sync::{Arc, Mutex, PoisonError};

use ma_core::config::FlowConfig;
use ma_core::flow::StepName;
use ma_core::tunnel::{FieldHandle, FieldValue};
use tracing::debug;

use super::{SectionSeed, SectionViewModel};
use crate::context::FlowContext;
use crate::events::FlowMessage;
use crate::fields::FormField;
use crate::validation::{FieldError, Validator};

pub const GIVEN_NAME: &str = "givenName";
pub const FAMILY_NAME: &str = "familyName";
pub const EMAIL: &str = "email";
pub const MARKETING_CONSENT: &str = "marketing_consent";

/// Locally held copies of the editable personal fields.
///
/// `None` (or an empty string) means "not yet seeded".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Shadow {
    given_name: Option<String>,
    family_name: Option<String>,
    email: Option<String>,
}

fn seed_slot(slot: &mut Option<String>, from: &str) {
    if slot.as_deref().map_or(true, str::is_empty) {
        *slot = Some(from.to_string());
    }
}

/// Name, email and marketing consent.
///
/// Shadows are seeded only once per edit session: values typed on an earlier
/// visit survive leaving and re-entering the step until cancel clears them.
pub struct PersonalSection {
    given_name: Arc<FormField>,
    family_name: Arc<FormField>,
    email: Arc<FormField>,
    marketing_consent: Arc<FormField>,
    shadow: Mutex<Shadow>,
}

impl PersonalSection {
    pub fn new() -> Self {
        Self {
            given_name: FormField::text(GIVEN_NAME, "First name"),
            family_name: FormField::text(FAMILY_NAME, "Last name"),
            email: FormField::email(EMAIL, "Work email address"),
            marketing_consent: FormField::checkbox(
                MARKETING_CONSENT,
                "I would like to receive professional marketing emails",
            ),
            shadow: Mutex::new(Shadow::default()),
        }
    }

    fn widgets(&self) -> [&Arc<FormField>; 4] {
        [
            &self.given_name,
            &self.family_name,
            &self.email,
            &self.marketing_consent,
        ]
    }

    fn shadow(&self) -> std::sync::MutexGuard<'_, Shadow> {
        self.shadow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether any shadow slot holds a value.
    pub fn has_shadow_values(&self) -> bool {
        let shadow = self.shadow();
        shadow.given_name.is_some() || shadow.family_name.is_some() || shadow.email.is_some()
    }

    /// Name fields are locked once the HCP is validated.
    pub fn names_disabled(&self) -> bool {
        self.given_name.is_disabled()
    }
}

impl Default for PersonalSection {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionViewModel for PersonalSection {
    fn step(&self) -> StepName {
        StepName::EditPersonal
    }

    fn mount(&self, ctx: &FlowContext) {
        for widget in self.widgets() {
            widget.mount(ctx);
        }
    }

    fn unmount(&self, ctx: &FlowContext) {
        for widget in self.widgets() {
            widget.unmount(ctx);
        }
    }

    fn on_step_shown(&self, seed: SectionSeed<'_>) {
        let shadow = {
            let mut shadow = self.shadow();
            seed_slot(&mut shadow.given_name, &seed.record.given_name);
            seed_slot(&mut shadow.family_name, &seed.record.family_name);
            seed_slot(&mut shadow.email, &seed.record.email);
            shadow.clone()
        };

        self.given_name
            .set_text(shadow.given_name.as_deref().unwrap_or_default());
        self.family_name
            .set_text(shadow.family_name.as_deref().unwrap_or_default());
        self.email.set_text(shadow.email.as_deref().unwrap_or_default());
        self.marketing_consent
            .set_value(FieldValue::Toggle(seed.email_permission_subscribed));

        self.given_name.set_disabled(seed.hcp_validated);
        self.family_name.set_disabled(seed.hcp_validated);
        debug!(hcp_validated = seed.hcp_validated, "personal section populated");
    }

    fn on_field_input(&self, field: &str, value: FieldValue) -> Vec<FlowMessage> {
        match field {
            MARKETING_CONSENT => {
                let subscribed = matches!(value, FieldValue::Toggle(true));
                self.marketing_consent.set_value(FieldValue::Toggle(subscribed));
                vec![
                    FlowMessage::EmailPermissionChanged { subscribed },
                    FlowMessage::UnlockForEditing,
                ]
            }
            GIVEN_NAME | FAMILY_NAME | EMAIL => {
                let text = value.as_text();
                let mut shadow = self.shadow();
                let (widget, slot) = match field {
                    GIVEN_NAME => (&self.given_name, &mut shadow.given_name),
                    FAMILY_NAME => (&self.family_name, &mut shadow.family_name),
                    _ => (&self.email, &mut shadow.email),
                };
                if widget.is_disabled() {
                    debug!(field, "input ignored on disabled field");
                    return Vec::new();
                }
                widget.set_text(&text);
                *slot = Some(text);
                vec![FlowMessage::UnlockForEditing]
            }
            other => {
                debug!(field = other, "input for unknown personal field ignored");
                Vec::new()
            }
        }
    }

    fn validate(&self, _config: &FlowConfig) -> Result<(), Vec<FieldError>> {
        let given_name = self.given_name.value();
        let family_name = self.family_name.value();
        let email = self.email.value();

        let mut validator = Validator::new();
        validator
            .required(GIVEN_NAME, &given_name, "Please enter your First Name.")
            .required(FAMILY_NAME, &family_name, "Please enter your Last Name.")
            .required(EMAIL, &email, "Please enter your email address.");
        if !given_name.trim().is_empty() {
            validator.name(GIVEN_NAME, &given_name, "Please enter a valid First Name.");
        }
        if !family_name.trim().is_empty() {
            validator.name(FAMILY_NAME, &family_name, "Please enter a valid Last Name.");
        }
        if !email.trim().is_empty() {
            validator.email(EMAIL, &email, "Please enter a valid email address.");
        }
        validator.finish()
    }

    fn cancel(&self) -> FlowMessage {
        *self.shadow() = Shadow::default();
        for widget in self.widgets() {
            widget.clear();
        }
        FlowMessage::Cancelled { step: self.step() }
    }

    fn focus_target(&self) -> &str {
        GIVEN_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ma_core::account::AuthRecord;

    fn record(given: &str) -> AuthRecord {
        AuthRecord {
            given_name: given.into(),
            family_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        }
    }

    fn seed(record: &AuthRecord, hcp_validated: bool) -> SectionSeed<'_> {
        SectionSeed {
            record,
            email_permission_subscribed: true,
            hcp_validated,
        }
    }

    #[test]
    fn typed_values_survive_a_second_visit() {
        let section = PersonalSection::new();
        let first = record("Ada");
        section.on_step_shown(seed(&first, false));
        section.on_field_input(GIVEN_NAME, FieldValue::Text("Augusta".into()));

        let changed = record("Someone Else");
        section.on_step_shown(seed(&changed, false));
        assert_eq!(section.given_name.value(), "Augusta");
        assert_eq!(section.family_name.value(), "Lovelace");
    }

    #[test]
    fn empty_shadow_is_reseeded() {
        let section = PersonalSection::new();
        section.on_step_shown(seed(&record("Ada"), false));
        section.on_field_input(GIVEN_NAME, FieldValue::Text(String::new()));

        section.on_step_shown(seed(&record("Grace"), false));
        assert_eq!(section.given_name.value(), "Grace");
    }

    #[test]
    fn validated_hcp_disables_names_only() {
        let section = PersonalSection::new();
        section.on_step_shown(seed(&record("Ada"), true));
        assert!(section.names_disabled());
        assert!(section.family_name.is_disabled());
        assert!(!section.email.is_disabled());
        assert!(section
            .on_field_input(GIVEN_NAME, FieldValue::Text("X".into()))
            .is_empty());
    }

    #[test]
    fn checkbox_raises_permission_change_and_unlock() {
        let section = PersonalSection::new();
        let signals = section.on_field_input(MARKETING_CONSENT, FieldValue::Toggle(false));
        assert_eq!(
            signals,
            vec![
                FlowMessage::EmailPermissionChanged { subscribed: false },
                FlowMessage::UnlockForEditing
            ]
        );
    }

    #[test]
    fn cancel_resets_shadows_and_widgets() {
        let section = PersonalSection::new();
        section.on_step_shown(seed(&record("Ada"), false));
        assert!(section.has_shadow_values());

        let signal = section.cancel();
        assert_eq!(
            signal,
            FlowMessage::Cancelled {
                step: StepName::EditPersonal
            }
        );
        assert!(!section.has_shadow_values());
        assert_eq!(section.given_name.value(), "");
    }

    #[test]
    fn validation_reports_each_bad_field() {
        let section = PersonalSection::new();
        section.on_field_input(GIVEN_NAME, FieldValue::Text("R2D2".into()));
        section.on_field_input(EMAIL, FieldValue::Text("not-an-email".into()));
        let errors = section.validate(&FlowConfig::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec![FAMILY_NAME, GIVEN_NAME, EMAIL]);
    }
}
