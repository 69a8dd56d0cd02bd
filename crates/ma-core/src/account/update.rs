use serde::{Deserialize, Serialize};

use super::record::Section;

/// Partial record sent to the profile update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileUpdate {
    Personal(PersonalUpdate),
    Professional(ProfessionalUpdate),
}

impl ProfileUpdate {
    pub fn section(&self) -> Section {
        match self {
            Self::Personal(_) => Section::Personal,
            Self::Professional(_) => Section::Professional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalUpdate {
    #[serde(rename = "givenName")]
    pub given_name: String,
    #[serde(rename = "familyName")]
    pub family_name: String,
    pub email: String,
    /// `"true"` or `"false"`.
    #[serde(rename = "emailPermission_subscribed")]
    pub email_permission_subscribed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfessionalUpdate {
    pub designation_name: String,
    pub designation_specialty: String,
    #[serde(rename = "mailingAddress_streetName1")]
    pub mailing_address_street_name1: String,
    #[serde(rename = "mailingAddress_municipality")]
    pub mailing_address_municipality: String,
    #[serde(rename = "mailingAddress_administrativeArea")]
    pub mailing_address_administrative_area: String,
    #[serde(rename = "mailingAddress_postalCode")]
    pub mailing_address_postal_code: String,
    /// Empty when the designation does not require a license.
    pub license_number: String,
    /// Empty when the designation does not require a license.
    pub issuing_authority: String,
}

/// Current and new password pair gathered from the password step.
#[derive(Clone, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}
