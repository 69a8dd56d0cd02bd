use serde::{Deserialize, Serialize};

/// HCP (healthcare professional) license validation status.
///
/// Wire values are `notvalidated`, `pending` and `validated`. Unknown values
/// are preserved verbatim and count as validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HcpValidationStatus {
    #[default]
    NotValidated,
    Pending,
    Validated,
    Other(String),
}

impl HcpValidationStatus {
    pub const NOT_VALIDATED: &'static str = "notvalidated";
    pub const PENDING: &'static str = "pending";
    pub const VALIDATED: &'static str = "validated";

    pub fn as_str(&self) -> &str {
        match self {
            Self::NotValidated => Self::NOT_VALIDATED,
            Self::Pending => Self::PENDING,
            Self::Validated => Self::VALIDATED,
            Self::Other(raw) => raw,
        }
    }

    /// True unless the status is `notvalidated` or `pending`.
    pub fn is_validated(&self) -> bool {
        !self.is_unvalidated()
    }

    pub fn is_unvalidated(&self) -> bool {
        matches!(self, Self::NotValidated | Self::Pending)
    }

    /// Whether moving from `previous` to `self` means the user has just
    /// become a validated HCP.
    pub fn became_validated_from(&self, previous: &HcpValidationStatus) -> bool {
        previous.is_unvalidated() && self.is_validated()
    }
}

impl From<String> for HcpValidationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            Self::NOT_VALIDATED => Self::NotValidated,
            Self::PENDING => Self::Pending,
            Self::VALIDATED => Self::Validated,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for HcpValidationStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<HcpValidationStatus> for String {
    fn from(status: HcpValidationStatus) -> Self {
        match status {
            HcpValidationStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for HcpValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
