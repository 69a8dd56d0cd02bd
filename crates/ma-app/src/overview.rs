//! Read-only account overview shown on the `account` step.

use ma_core::account::AuthRecord;
use serde::Serialize;

const EMPTY: &str = "-";
const DEA: &str = "DEA";

/// Display projection of the cached record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOverview {
    pub email: String,
    pub full_name: String,
    /// "Yes" or "No".
    pub marketing_emails: String,
    pub designation: String,
    pub specialty: String,
    pub dea_number: String,
    pub state_license_number: String,
    pub license_state: String,
    pub address_lines: Vec<String>,
    /// Professional information is editable only while unvalidated. The flow
    /// refuses to open the professional step otherwise.
    pub can_edit_professional: bool,
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        EMPTY.to_string()
    } else {
        value.to_string()
    }
}

impl AccountOverview {
    /// Project `record`, using `subscribed` as the current email-permission
    /// display flag.
    pub fn project(record: &AuthRecord, subscribed: bool) -> Self {
        let is_dea = record.license.issuing_authority == DEA;
        let number = &record.license.number;
        let address = &record.mailing_address;

        Self {
            email: record.email.clone(),
            full_name: record.full_name(),
            marketing_emails: if subscribed { "Yes" } else { "No" }.to_string(),
            designation: record.designation.name.clone(),
            specialty: record.designation.specialty.clone(),
            dea_number: if is_dea { or_dash(number) } else { or_dash("") },
            state_license_number: if is_dea { or_dash("") } else { or_dash(number) },
            license_state: if is_dea {
                or_dash("")
            } else {
                or_dash(&record.license.issuing_authority)
            },
            address_lines: vec![
                address.street_name1.clone(),
                address.municipality.clone(),
                address.postal_code.clone(),
                address.administrative_area.clone(),
            ],
            can_edit_professional: !record.is_validated_hcp(),
        }
    }

    /// Plain-text rendering for console hosts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[Personal]\n");
        out.push_str(&format!("  Registered email address: {}\n", self.email));
        out.push_str(&format!("  Name: {}\n", self.full_name));
        out.push_str(&format!("  Marketing emails: {}\n", self.marketing_emails));
        out.push_str(if self.can_edit_professional {
            "[Professional]\n"
        } else {
            "[Professional] (verified, read-only)\n"
        });
        out.push_str(&format!("  Designation: {}\n", self.designation));
        out.push_str(&format!("  Specialty: {}\n", self.specialty));
        out.push_str(&format!("  DEA Number: {}\n", self.dea_number));
        out.push_str(&format!("  SLN: {}\n", self.state_license_number));
        out.push_str(&format!("  License State: {}\n", self.license_state));
        out.push_str("  Office Address:\n");
        for line in &self.address_lines {
            out.push_str(&format!("    {}\n", line));
        }
        out.push_str("[Password]\n  \u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\n");
        out
    }
}
