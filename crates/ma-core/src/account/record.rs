use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::status::HcpValidationStatus;

/// Editable sections of the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Personal,
    Professional,
    Password,
}

/// The authoritative account record for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthRecord {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub email_permission: EmailPermission,
    pub designation: Designation,
    pub license: License,
    pub mailing_address: MailingAddress,
    pub hcp_validation: HcpValidation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailPermission {
    /// Carried as `"true"` / `"false"` on the wire.
    #[serde(with = "string_flag")]
    pub subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Designation {
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct License {
    pub number: String,
    pub issuing_authority: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailingAddress {
    pub street_name1: String,
    pub municipality: String,
    pub administrative_area: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HcpValidation {
    pub status: HcpValidationStatus,
}

impl AuthRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    pub fn is_validated_hcp(&self) -> bool {
        self.hcp_validation.status.is_validated()
    }

    /// Overwrite the fields owned by `section` with those of `returned`.
    ///
    /// The validation status is always taken from `returned`; fields of other
    /// sections are left as they are.
    pub fn merge_section(&mut self, section: Section, returned: &AuthRecord) {
        match section {
            Section::Personal => {
                self.given_name = returned.given_name.clone();
                self.family_name = returned.family_name.clone();
                self.email = returned.email.clone();
                self.email_permission = returned.email_permission.clone();
            }
            Section::Professional => {
                self.designation = returned.designation.clone();
                self.license = returned.license.clone();
                self.mailing_address = returned.mailing_address.clone();
            }
            Section::Password => {}
        }
        self.hcp_validation = returned.hcp_validation.clone();
    }
}

/// Signed-in user as cached by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub user_id: String,
    pub auth_record: AuthRecord,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>, auth_record: AuthRecord) -> Self {
        Self {
            user_id: user_id.into(),
            auth_record,
        }
    }
}

pub(crate) mod string_flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(value) => value,
            Flag::Text(text) => text == "true",
        })
    }
}
