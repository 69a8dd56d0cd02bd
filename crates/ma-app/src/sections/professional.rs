use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ma_core::account::AuthRecord;
use ma_core::config::FlowConfig;
use ma_core::designation::DesignationTable;
use ma_core::flow::StepName;
use ma_core::tunnel::{FieldHandle, FieldValue};
use tracing::debug;

use super::{SectionSeed, SectionViewModel};
use crate::context::FlowContext;
use crate::events::FlowMessage;
use crate::fields::FormField;
use crate::validation::{FieldError, Validator};

pub const DESIGNATION_NAME: &str = "designation_name";
pub const DESIGNATION_SPECIALTY: &str = "designation_specialty";
pub const LICENSE: &str = "hcpId";
pub const STREET: &str = "mailingAddress_streetName1";
pub const CITY: &str = "mailingAddress_municipality";
pub const STATE: &str = "mailingAddress_administrativeArea";
pub const POSTAL_CODE: &str = "mailingAddress_postalCode";

/// Designation, specialty, license and office address.
///
/// Unlike the personal section this one re-seeds from the cached record
/// every time its step is shown, discarding unsaved edits.
pub struct ProfessionalSection {
    designations: DesignationTable,
    designation_name: Arc<FormField>,
    designation_specialty: Arc<FormField>,
    license: Arc<FormField>,
    street: Arc<FormField>,
    city: Arc<FormField>,
    state: Arc<FormField>,
    postal_code: Arc<FormField>,
    show_cancel_link: AtomicBool,
}

impl ProfessionalSection {
    pub fn new(designations: DesignationTable) -> Self {
        Self {
            designations,
            designation_name: FormField::select(DESIGNATION_NAME, "Professional designation"),
            designation_specialty: FormField::select(DESIGNATION_SPECIALTY, "Specialty"),
            license: FormField::license(LICENSE, "License"),
            street: FormField::text(STREET, "Office Street Address"),
            city: FormField::text(CITY, "City"),
            state: FormField::select(STATE, "State"),
            postal_code: FormField::text(POSTAL_CODE, "Zip Code"),
            show_cancel_link: AtomicBool::new(true),
        }
    }

    fn widgets(&self) -> [&Arc<FormField>; 7] {
        [
            &self.designation_name,
            &self.designation_specialty,
            &self.license,
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
        ]
    }

    /// Enable the license input iff `designation` requires one.
    fn apply_license_requirement(&self, designation: &str) {
        let required = self.designations.requires_license(designation);
        self.license.set_disabled(!required);
        debug!(designation, license_required = required, "license enablement updated");
    }

    fn populate(&self, record: &AuthRecord) {
        self.designation_name
            .set_value(FieldValue::Selection(record.designation.name.clone()));
        self.designation_specialty
            .set_value(FieldValue::Selection(record.designation.specialty.clone()));
        self.license.set_value(FieldValue::License {
            number: record.license.number.clone(),
            issuing_authority: record.license.issuing_authority.clone(),
        });
        self.street
            .set_value(FieldValue::Text(record.mailing_address.street_name1.clone()));
        self.city
            .set_value(FieldValue::Text(record.mailing_address.municipality.clone()));
        self.state.set_value(FieldValue::Selection(
            record.mailing_address.administrative_area.clone(),
        ));
        self.postal_code
            .set_value(FieldValue::Text(record.mailing_address.postal_code.clone()));
    }

    pub fn license_disabled(&self) -> bool {
        self.license.is_disabled()
    }

    /// The cancel link is offered only while the HCP is not validated.
    ///
    /// Display only: a `CancelRequested` is always honored, since the step
    /// has no back button and a user validated by the last save must still
    /// be able to leave it.
    pub fn show_cancel_link(&self) -> bool {
        self.show_cancel_link.load(Ordering::SeqCst)
    }
}

impl SectionViewModel for ProfessionalSection {
    fn step(&self) -> StepName {
        StepName::EditProfessional
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
        self.populate(seed.record);
        self.apply_license_requirement(&seed.record.designation.name);
        self.show_cancel_link
            .store(!seed.hcp_validated, Ordering::SeqCst);
    }

    fn on_field_input(&self, field: &str, value: FieldValue) -> Vec<FlowMessage> {
        let widget = match field {
            DESIGNATION_NAME => &self.designation_name,
            DESIGNATION_SPECIALTY => &self.designation_specialty,
            LICENSE => &self.license,
            STREET => &self.street,
            CITY => &self.city,
            STATE => &self.state,
            POSTAL_CODE => &self.postal_code,
            other => {
                debug!(field = other, "input for unknown professional field ignored");
                return Vec::new();
            }
        };
        if widget.is_disabled() {
            debug!(field, "input ignored on disabled field");
            return Vec::new();
        }

        match value {
            FieldValue::License { .. } if field == LICENSE => widget.set_value(value),
            other => widget.set_text(&other.as_text()),
        }
        if field == DESIGNATION_NAME {
            self.apply_license_requirement(&widget.value());
        }
        vec![FlowMessage::UnlockForEditing]
    }

    fn validate(&self, _config: &FlowConfig) -> Result<(), Vec<FieldError>> {
        let designation = self.designation_name.value();
        let mut validator = Validator::new();
        validator
            .required(
                DESIGNATION_NAME,
                &designation,
                "Please select your professional designation.",
            )
            .required(
                DESIGNATION_SPECIALTY,
                &self.designation_specialty.value(),
                "Please select your specialty.",
            )
            .single_line(
                STREET,
                &self.street.value(),
                "Please enter a valid Office street address.",
            )
            .single_line(CITY, &self.city.value(), "Please enter a valid city.")
            .required(STATE, &self.state.value(), "Please select your state.")
            .zip_code(
                POSTAL_CODE,
                &self.postal_code.value(),
                "Please enter a valid zip code.",
            );

        if self.designations.requires_license(&designation) {
            if let FieldValue::License {
                number,
                issuing_authority,
            } = self.license.current()
            {
                validator
                    .required(LICENSE, &number, "Please enter your license number.")
                    .required(
                        LICENSE,
                        &issuing_authority,
                        "Please select the license issuing authority.",
                    );
            }
        }
        validator.finish()
    }

    fn cancel(&self) -> FlowMessage {
        for widget in self.widgets() {
            widget.clear();
        }
        FlowMessage::Cancelled { step: self.step() }
    }

    fn focus_target(&self) -> &str {
        DESIGNATION_NAME
    }
}
